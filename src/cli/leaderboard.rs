//! Leaderboard command for Stride.

use serde::Serialize;

use crate::config::Config;
use crate::core::ProgressStore;
use crate::leaderboard::{self, Entry};
use crate::storage::ProgressStorage;

/// Options for the leaderboard command.
#[derive(Debug, Clone, Default)]
pub struct LeaderboardOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the leaderboard command.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardOutput {
    /// Whether the command succeeded.
    pub success: bool,
    /// The learner's position.
    pub rank: usize,
    pub entries: Vec<Entry>,
}

/// The leaderboard command implementation.
pub struct LeaderboardCommand<'a, S: ProgressStorage> {
    store: &'a ProgressStore<S>,
    config: Config,
}

impl<'a, S: ProgressStorage> LeaderboardCommand<'a, S> {
    /// Create a new leaderboard command.
    pub fn new(store: &'a ProgressStore<S>, config: Config) -> Self {
        Self { store, config }
    }

    /// Run the leaderboard command.
    pub fn run(&self, _options: &LeaderboardOptions) -> LeaderboardOutput {
        let entries = leaderboard::ranking(
            self.store.snapshot().xp,
            self.config.leaderboard.show_rivals,
        );
        LeaderboardOutput {
            success: true,
            rank: leaderboard::learner_rank(&entries).unwrap_or(entries.len()),
            entries,
        }
    }

    /// Format output based on options.
    pub fn format_output(
        &self,
        output: &LeaderboardOutput,
        options: &LeaderboardOptions,
    ) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    /// Format output as human-readable text.
    fn format_human_readable(&self, output: &LeaderboardOutput) -> String {
        let mut text = String::from("Community Leaderboard\n\n");
        for entry in &output.entries {
            let marker = if entry.is_learner { ">" } else { " " };
            text.push_str(&format!(
                "{}{:>2}. {} {:<16} {:>6} XP\n",
                marker, entry.rank, entry.icon, entry.name, entry.xp
            ));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Curriculum;
    use crate::storage::MemoryProgressStore;
    use chrono::NaiveDate;

    fn store() -> ProgressStore<MemoryProgressStore> {
        ProgressStore::load(
            MemoryProgressStore::new(),
            Curriculum::default(),
            NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
        )
    }

    #[test]
    fn test_leaderboard_ranks_learner() {
        let store = store();
        store.complete_project("p1-calc", 700).unwrap();
        let cmd = LeaderboardCommand::new(&store, Config::default());
        let options = LeaderboardOptions::default();

        let output = cmd.run(&options);

        assert_eq!(output.rank, 4);
        let text = cmd.format_output(&output, &options);
        assert!(text.contains("> 4. 👤 You"));
        assert!(text.contains("Erick Wambura"));
    }

    #[test]
    fn test_leaderboard_without_rivals() {
        let store = store();
        let mut config = Config::default();
        config.leaderboard.show_rivals = false;

        let output = LeaderboardCommand::new(&store, config).run(&LeaderboardOptions::default());

        assert_eq!(output.rank, 1);
        assert_eq!(output.entries.len(), 1);
    }
}
