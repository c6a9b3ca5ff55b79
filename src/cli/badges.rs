//! Badges command for Stride.
//!
//! Lists the badge catalog with the learner's earned badges marked.

use serde::Serialize;

use crate::core::{ProgressStore, BADGES};
use crate::storage::ProgressStorage;

/// Options for the badges command.
#[derive(Debug, Clone, Default)]
pub struct BadgesOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// One catalog row.
#[derive(Debug, Clone, Serialize)]
pub struct BadgeRow {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub earned: bool,
}

/// Output format for the badges command.
#[derive(Debug, Clone, Serialize)]
pub struct BadgesOutput {
    /// Whether the command succeeded.
    pub success: bool,
    pub earned: usize,
    pub total: usize,
    pub badges: Vec<BadgeRow>,
}

/// The badges command implementation.
pub struct BadgesCommand<'a, S: ProgressStorage> {
    store: &'a ProgressStore<S>,
}

impl<'a, S: ProgressStorage> BadgesCommand<'a, S> {
    /// Create a new badges command.
    pub fn new(store: &'a ProgressStore<S>) -> Self {
        Self { store }
    }

    /// Run the badges command.
    pub fn run(&self, _options: &BadgesOptions) -> BadgesOutput {
        let progress = self.store.snapshot();
        let badges: Vec<BadgeRow> = BADGES
            .iter()
            .map(|b| BadgeRow {
                id: b.id,
                name: b.name,
                description: b.description,
                icon: b.icon,
                earned: progress.has_badge(b.id),
            })
            .collect();

        BadgesOutput {
            success: true,
            earned: badges.iter().filter(|b| b.earned).count(),
            total: badges.len(),
            badges,
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &BadgesOutput, options: &BadgesOptions) -> String {
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
    fn format_human_readable(&self, output: &BadgesOutput) -> String {
        let mut text = format!("Badges ({}/{} earned)\n\n", output.earned, output.total);
        for badge in &output.badges {
            let mark = if badge.earned { "x" } else { " " };
            text.push_str(&format!(
                "[{}] {} {}: {}\n",
                mark, badge.icon, badge.name, badge.description
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
    fn test_badges_none_earned() {
        let store = store();
        let output = BadgesCommand::new(&store).run(&BadgesOptions::default());

        assert_eq!(output.total, 5);
        assert_eq!(output.earned, 0);
        assert_eq!(output.badges[0].id, "b1-initiate");
    }

    #[test]
    fn test_badges_marks_earned() {
        let store = store();
        store.complete_lesson("l1-hello", 50).unwrap();
        store.complete_lesson("l2-vars", 50).unwrap();
        let cmd = BadgesCommand::new(&store);
        let options = BadgesOptions::default();

        let output = cmd.run(&options);

        assert_eq!(output.earned, 2);
        let text = cmd.format_output(&output, &options);
        assert!(text.starts_with("Badges (2/5 earned)"));
        assert!(text.contains("[x] 🌱 Mara Initiate"));
        assert!(text.contains("[x] 🦁 Serengeti Scripter"));
        assert!(text.contains("[ ] 🔥 Musoma Momentum"));
    }
}
