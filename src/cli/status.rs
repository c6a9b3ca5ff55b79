//! Status command for Stride.
//!
//! Shows XP, level, streak and completion counts for the learner.

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::{xp, ProgressStore};
use crate::storage::ProgressStorage;

/// Options for the status command.
#[derive(Debug, Clone, Default)]
pub struct StatusOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the status command.
#[derive(Debug, Clone, Serialize)]
pub struct StatusOutput {
    /// Whether the command succeeded.
    pub success: bool,
    pub xp: u64,
    pub level: u64,
    /// Fraction of the current level earned, 0.0 to 1.0.
    pub level_progress: f64,
    pub xp_to_next_level: u64,
    pub streak: u32,
    pub last_login_date: NaiveDate,
    pub code_attempts: u64,
    pub lessons_completed: usize,
    pub lessons_total: usize,
    pub projects_completed: usize,
    pub projects_total: usize,
    pub badges_earned: usize,
    /// Badge unlocked at session start, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_badge: Option<String>,
}

/// The status command implementation.
pub struct StatusCommand<'a, S: ProgressStorage> {
    store: &'a ProgressStore<S>,
}

impl<'a, S: ProgressStorage> StatusCommand<'a, S> {
    /// Create a new status command.
    pub fn new(store: &'a ProgressStore<S>) -> Self {
        Self { store }
    }

    /// Run the status command.
    pub fn run(&self, _options: &StatusOptions) -> StatusOutput {
        let progress = self.store.snapshot();
        let curriculum = self.store.curriculum();

        StatusOutput {
            success: true,
            xp: progress.xp,
            level: progress.level(),
            level_progress: progress.level_progress(),
            xp_to_next_level: xp::xp_to_next_level(progress.xp),
            streak: progress.streak,
            last_login_date: progress.last_login_date,
            code_attempts: progress.code_attempts,
            lessons_completed: progress.completed_lessons.len(),
            lessons_total: curriculum.lesson_count(),
            projects_completed: progress.completed_projects.len(),
            projects_total: curriculum.projects.len(),
            badges_earned: progress.badges.len(),
            new_badge: self.store.acknowledge_badge(),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &StatusOutput, options: &StatusOptions) -> String {
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
    fn format_human_readable(&self, output: &StatusOutput) -> String {
        let mut text = String::new();

        if let Some(badge) = &output.new_badge {
            text.push_str(&format!("Badge unlocked: {}\n\n", badge));
        }

        text.push_str(&format!(
            "Level {} ({} XP, {} to next level)\n",
            output.level, output.xp, output.xp_to_next_level
        ));
        text.push_str(&format!("  {}\n", progress_bar(output.level_progress, 20)));
        text.push_str(&format!(
            "Streak: {} day{}\n",
            output.streak,
            if output.streak == 1 { "" } else { "s" }
        ));
        text.push_str(&format!(
            "Lessons: {}/{}  Projects: {}/{}\n",
            output.lessons_completed,
            output.lessons_total,
            output.projects_completed,
            output.projects_total
        ));
        text.push_str(&format!(
            "Code runs: {}  Badges: {}\n",
            output.code_attempts, output.badges_earned
        ));

        text
    }
}

/// Render a fraction as a fixed-width bar.
fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        fraction * 100.0
    )
}
