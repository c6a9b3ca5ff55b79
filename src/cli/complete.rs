//! Completion commands for Stride.
//!
//! Records a finished lesson or project, awarding the configured XP. A lesson
//! is only recorded once its quiz is answered correctly and its mini-task, if
//! checked, has passed. Projects are normally completed through `submit`,
//! which grades them first.

use serde::Serialize;

use crate::config::Config;
use crate::core::{Badge, ProgressStore, Transition};
use crate::error::Result;
use crate::services::CheckResult;
use crate::storage::ProgressStorage;

/// Options for the completion commands.
#[derive(Debug, Clone, Default)]
pub struct CompleteOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// What is being completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionKind {
    Lesson,
    Project,
}

/// Output format for the completion commands.
#[derive(Debug, Clone, Serialize)]
pub struct CompleteOutput {
    /// Whether the completion was recorded.
    pub success: bool,
    pub kind: CompletionKind,
    pub id: String,
    /// XP added by this call (0 when already completed).
    pub xp_awarded: u64,
    /// XP total afterwards.
    pub xp_total: u64,
    /// Whether the item had been completed before.
    pub already_completed: bool,
    /// Badges unlocked by this call.
    pub unlocked: Vec<&'static Badge>,
    /// Mini-task verdict the lesson was gated on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<CheckResult>,
    /// Error message if the completion failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CompleteOutput {
    fn failure(kind: CompletionKind, id: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            kind,
            id: id.to_string(),
            xp_awarded: 0,
            xp_total: 0,
            already_completed: false,
            unlocked: Vec::new(),
            task: None,
            error: Some(error.into()),
        }
    }
}

/// The completion command implementation.
pub struct CompleteCommand<'a, S: ProgressStorage> {
    store: &'a ProgressStore<S>,
    config: Config,
}

impl<'a, S: ProgressStorage> CompleteCommand<'a, S> {
    /// Create a new completion command.
    pub fn new(store: &'a ProgressStore<S>, config: Config) -> Self {
        Self { store, config }
    }

    /// Record a finished lesson.
    ///
    /// `answers` holds one quiz option index per question; `task` is the
    /// mini-task verdict when the learner's code was checked.
    pub fn run_lesson(
        &self,
        lesson_id: &str,
        answers: &[usize],
        task: Option<CheckResult>,
        _options: &CompleteOptions,
    ) -> CompleteOutput {
        let kind = CompletionKind::Lesson;
        let Some(lesson) = self.store.curriculum().lesson(lesson_id) else {
            return CompleteOutput::failure(
                kind,
                lesson_id,
                format!("Unknown lesson: {}", lesson_id),
            );
        };

        let output = match lesson.completion_gate(answers, task.as_ref().map(|t| t.correct)) {
            Ok(()) => {
                let award = self.config.rewards.xp_per_lesson;
                self.record(kind, lesson_id, award, |store| {
                    store.complete_lesson(lesson_id, award)
                })
            }
            Err(e) => CompleteOutput {
                xp_total: self.store.snapshot().xp,
                ..CompleteOutput::failure(kind, lesson_id, e.to_string())
            },
        };
        CompleteOutput { task, ..output }
    }

    /// Record a finished project.
    pub fn run_project(&self, project_id: &str, _options: &CompleteOptions) -> CompleteOutput {
        let kind = CompletionKind::Project;
        if !self.store.curriculum().has_project(project_id) {
            return CompleteOutput::failure(
                kind,
                project_id,
                format!("Unknown project: {}", project_id),
            );
        }
        let award = self.config.rewards.xp_per_project;
        self.record(kind, project_id, award, |store| {
            store.complete_project(project_id, award)
        })
    }

    fn record<F>(&self, kind: CompletionKind, id: &str, award: u64, complete: F) -> CompleteOutput
    where
        F: FnOnce(&ProgressStore<S>) -> Result<Transition>,
    {
        let before = self.store.snapshot().xp;
        let result = complete(self.store);
        // The CLI reports unlocks itself; nothing is left pending.
        self.store.acknowledge_badge();
        let after = self.store.snapshot().xp;

        match result {
            Ok(transition) => CompleteOutput {
                success: true,
                kind,
                id: id.to_string(),
                xp_awarded: if transition.changed { award } else { 0 },
                xp_total: after,
                already_completed: !transition.changed,
                unlocked: transition.unlocked,
                task: None,
                error: None,
            },
            Err(e) => CompleteOutput {
                xp_awarded: after - before,
                xp_total: after,
                ..CompleteOutput::failure(kind, id, format!("Progress not saved: {}", e))
            },
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &CompleteOutput, options: &CompleteOptions) -> String {
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
    fn format_human_readable(&self, output: &CompleteOutput) -> String {
        let noun = match output.kind {
            CompletionKind::Lesson => "Lesson",
            CompletionKind::Project => "Project",
        };

        let mut text = String::new();
        if let Some(task) = &output.task {
            let mark = if task.correct { "Correct" } else { "Not yet" };
            text.push_str(&format!("{}: {}\n", mark, task.feedback));
        }

        if !output.success {
            text.push_str(&format!(
                "Completion failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            ));
            return text;
        }

        if output.already_completed {
            text.push_str(&format!("{} {} was already completed.\n", noun, output.id));
            return text;
        }

        text.push_str(&format!(
            "{} {} completed! +{} XP ({} total)\n",
            noun, output.id, output.xp_awarded, output.xp_total
        ));
        for badge in &output.unlocked {
            text.push_str(&format!("Badge unlocked: {} {}\n", badge.icon, badge.name));
        }
        text
    }
}
