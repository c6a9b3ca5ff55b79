//! Reset command for Stride.
//!
//! Wipes progress back to defaults. Requires explicit confirmation.

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::ProgressStore;
use crate::storage::ProgressStorage;

/// Options for the reset command.
#[derive(Debug, Clone, Default)]
pub struct ResetOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Confirm the irreversible wipe.
    pub yes: bool,
}

/// Output format for the reset command.
#[derive(Debug, Clone, Serialize)]
pub struct ResetOutput {
    /// Whether progress was reset.
    pub success: bool,
    /// XP discarded by the reset.
    pub xp_discarded: u64,
    /// Error message if reset failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The reset command implementation.
pub struct ResetCommand<'a, S: ProgressStorage> {
    store: &'a ProgressStore<S>,
}

impl<'a, S: ProgressStorage> ResetCommand<'a, S> {
    /// Create a new reset command.
    pub fn new(store: &'a ProgressStore<S>) -> Self {
        Self { store }
    }

    /// Run the reset command.
    pub fn run(&self, today: NaiveDate, options: &ResetOptions) -> ResetOutput {
        if !options.yes {
            return ResetOutput {
                success: false,
                xp_discarded: 0,
                error: Some("Refusing to reset without --yes".to_string()),
            };
        }

        let xp_discarded = self.store.snapshot().xp;
        match self.store.reset(today) {
            Ok(_) => ResetOutput {
                success: true,
                xp_discarded,
                error: None,
            },
            Err(e) => ResetOutput {
                success: false,
                xp_discarded,
                error: Some(format!("Reset not saved: {}", e)),
            },
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ResetOutput, options: &ResetOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else if output.success {
            format!("Progress reset ({} XP discarded).\n", output.xp_discarded)
        } else {
            format!(
                "Reset failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Curriculum, Progress};
    use crate::storage::MemoryProgressStore;
    use std::sync::Arc;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    #[test]
    fn test_reset_requires_confirmation() {
        let store = ProgressStore::load(MemoryProgressStore::new(), Curriculum::default(), day());
        store.complete_lesson("l1-hello", 50).unwrap();

        let output = ResetCommand::new(&store).run(day(), &ResetOptions::default());

        assert!(!output.success);
        assert_eq!(store.snapshot().xp, 50);
    }

    #[test]
    fn test_reset_confirmed() {
        let storage = Arc::new(MemoryProgressStore::new());
        let store = ProgressStore::load(Arc::clone(&storage), Curriculum::default(), day());
        store.complete_lesson("l1-hello", 50).unwrap();
        let cmd = ResetCommand::new(&store);
        let options = ResetOptions {
            yes: true,
            ..ResetOptions::default()
        };

        let output = cmd.run(day(), &options);

        assert!(output.success);
        assert_eq!(output.xp_discarded, 50);
        let defaults = Progress::new(day(), &Curriculum::default());
        assert_eq!(store.snapshot(), defaults);
        assert_eq!(storage.load().unwrap(), Some(defaults));
        assert_eq!(
            cmd.format_output(&output, &options),
            "Progress reset (50 XP discarded).\n"
        );
    }
}
