//! Sandbox commands for Stride.
//!
//! Everything that sends learner code or questions to the assistant: run,
//! check a lesson task, review, submit a project, and ask the tutor.

use std::path::Path;

use serde::Serialize;

use crate::activity::{Activities, VerdictSource};
use crate::core::{Badge, ProgressStore};
use crate::error::{Result, StrideError};
use crate::services::{ChatMessage, CodeReviewer, CodeRunner, SolutionChecker, Tutor};
use crate::storage::ProgressStorage;
use crate::util::read_to_string_limited;

/// Options for the sandbox commands.
#[derive(Debug, Clone, Default)]
pub struct SandboxOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Which sandbox action produced an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SandboxAction {
    Run,
    Check,
    Review,
    Submit,
    Ask,
}

/// Output format for the sandbox commands.
#[derive(Debug, Clone, Serialize)]
pub struct SandboxOutput {
    /// Whether the command ran and its effects were saved.
    pub success: bool,
    pub action: SandboxAction,
    /// Program output, review text or tutor answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Verdict for `check` and `submit`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
    /// Verdict explanation for `check` and `submit`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    /// How a `check` verdict was reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict_source: Option<VerdictSource>,
    /// Badges unlocked by a passing `submit`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unlocked: Vec<&'static Badge>,
    /// Error message if the command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SandboxOutput {
    fn new(action: SandboxAction) -> Self {
        Self {
            success: true,
            action,
            text: None,
            correct: None,
            feedback: None,
            verdict_source: None,
            unlocked: Vec::new(),
            error: None,
        }
    }

    fn failure(action: SandboxAction, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::new(action)
        }
    }

    /// Mark a result whose progress change was not saved.
    fn with_persist_error(mut self, error: Option<StrideError>) -> Self {
        if let Some(e) = error {
            self.success = false;
            self.error = Some(format!("Progress not saved: {}", e));
        }
        self
    }
}

/// The sandbox command implementation.
pub struct SandboxCommand<'a, S: ProgressStorage, A> {
    activities: Activities<'a, S, A>,
}

impl<'a, S, A> SandboxCommand<'a, S, A>
where
    S: ProgressStorage,
    A: CodeRunner + CodeReviewer + SolutionChecker + Tutor,
{
    /// Create a new sandbox command.
    pub fn new(activities: Activities<'a, S, A>) -> Self {
        Self { activities }
    }

    /// Run a source file.
    pub fn run_file(&self, file: &Path, _options: &SandboxOptions) -> SandboxOutput {
        let action = SandboxAction::Run;
        let code = match read_source(file) {
            Ok(code) => code,
            Err(e) => return SandboxOutput::failure(action, e.to_string()),
        };

        let outcome = self.activities.run_code(&code);
        SandboxOutput {
            text: Some(outcome.output),
            ..SandboxOutput::new(action)
        }
        .with_persist_error(outcome.persist_error)
    }

    /// Check a source file against a lesson's mini-task.
    pub fn check(&self, lesson_id: &str, file: &Path, _options: &SandboxOptions) -> SandboxOutput {
        let action = SandboxAction::Check;
        let verdict = read_source(file)
            .and_then(|code| self.activities.verify_lesson_task(lesson_id, &code));

        match verdict {
            Ok(verdict) => SandboxOutput {
                text: Some(verdict.output),
                correct: Some(verdict.result.correct),
                feedback: Some(verdict.result.feedback),
                verdict_source: Some(verdict.source),
                ..SandboxOutput::new(action)
            }
            .with_persist_error(verdict.persist_error),
            Err(e) => SandboxOutput::failure(action, e.to_string()),
        }
    }

    /// Review a source file.
    pub fn review(&self, file: &Path, _options: &SandboxOptions) -> SandboxOutput {
        let action = SandboxAction::Review;
        match read_source(file) {
            Ok(code) => SandboxOutput {
                text: Some(self.activities.review_code(&code)),
                ..SandboxOutput::new(action)
            },
            Err(e) => SandboxOutput::failure(action, e.to_string()),
        }
    }

    /// Submit a source file as a project solution.
    pub fn submit(
        &self,
        project_id: &str,
        file: &Path,
        _options: &SandboxOptions,
    ) -> SandboxOutput {
        let action = SandboxAction::Submit;
        let submission = read_source(file)
            .and_then(|code| self.activities.submit_project(project_id, &code));

        match submission {
            Ok(submission) => {
                let unlocked = submission
                    .transition
                    .map(|t| t.unlocked)
                    .unwrap_or_default();
                SandboxOutput {
                    correct: Some(submission.result.correct),
                    feedback: Some(submission.result.feedback),
                    unlocked,
                    ..SandboxOutput::new(action)
                }
                .with_persist_error(submission.persist_error)
            }
            Err(e) => SandboxOutput::failure(action, e.to_string()),
        }
    }

    /// Ask the tutor a question.
    ///
    /// `history` is an optional JSON file holding earlier turns as
    /// `[{"role": "user", "text": "..."}, ...]`.
    pub fn ask(
        &self,
        question: &str,
        context: &str,
        history: Option<&Path>,
        _options: &SandboxOptions,
    ) -> SandboxOutput {
        let action = SandboxAction::Ask;
        let history = match history.map(read_history).transpose() {
            Ok(history) => history.unwrap_or_default(),
            Err(e) => return SandboxOutput::failure(action, e.to_string()),
        };

        SandboxOutput {
            text: Some(self.activities.ask_tutor(question, context, &history)),
            ..SandboxOutput::new(action)
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &SandboxOutput, options: &SandboxOptions) -> String {
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
    fn format_human_readable(&self, output: &SandboxOutput) -> String {
        let mut text = String::new();

        if let Some(body) = &output.text {
            text.push_str(body.trim_end());
            text.push('\n');
        }

        if let (Some(correct), Some(feedback)) = (output.correct, &output.feedback) {
            if !text.is_empty() {
                text.push('\n');
            }
            let mark = if correct { "Correct" } else { "Not yet" };
            text.push_str(&format!("{}: {}\n", mark, feedback));
        }

        for badge in &output.unlocked {
            text.push_str(&format!("Badge unlocked: {} {}\n", badge.icon, badge.name));
        }

        if let Some(error) = &output.error {
            text.push_str(&format!("Error: {}\n", error));
        }

        text
    }
}

/// Read a learner source file.
fn read_source(file: &Path) -> Result<String> {
    read_to_string_limited(file)
}

/// Read tutor history from a JSON file.
fn read_history(file: &Path) -> Result<Vec<ChatMessage>> {
    let content = read_to_string_limited(file)?;
    serde_json::from_str(&content).map_err(|e| {
        StrideError::invalid_input(format!("bad history file {}: {}", file.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RewardsConfig;
    use crate::core::Curriculum;
    use crate::services::backend::tests::ScriptedBackend;
    use crate::services::Assistant;
    use crate::storage::MemoryProgressStore;
    use chrono::NaiveDate;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    type TestStore = ProgressStore<Arc<MemoryProgressStore>>;

    fn setup() -> (TestStore, Arc<MemoryProgressStore>, TempDir) {
        let storage = Arc::new(MemoryProgressStore::new());
        let store = ProgressStore::load(
            Arc::clone(&storage),
            Curriculum::default(),
            NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
        );
        (store, storage, TempDir::new().unwrap())
    }

    fn command<'a>(
        store: &'a TestStore,
        assistant: &'a Assistant<ScriptedBackend>,
    ) -> SandboxCommand<'a, Arc<MemoryProgressStore>, Assistant<ScriptedBackend>> {
        SandboxCommand::new(Activities::new(store, assistant, RewardsConfig::default()))
    }

    fn source(dir: &TempDir, code: &str) -> std::path::PathBuf {
        let path = dir.path().join("main.py");
        fs::write(&path, code).unwrap();
        path
    }

    #[test]
    fn test_run_file() {
        let (store, _, dir) = setup();
        let assistant = Assistant::new(ScriptedBackend::new().reply("Jambo Erick\n"));
        let cmd = command(&store, &assistant);
        let options = SandboxOptions::default();

        let output = cmd.run_file(&source(&dir, "print('Jambo Erick')"), &options);

        assert!(output.success);
        assert_eq!(output.text.as_deref(), Some("Jambo Erick\n"));
        assert_eq!(store.snapshot().code_attempts, 1);
        assert_eq!(cmd.format_output(&output, &options), "Jambo Erick\n");
    }

    #[test]
    fn test_run_missing_file() {
        let (store, _, dir) = setup();
        let assistant = Assistant::new(ScriptedBackend::new());
        let cmd = command(&store, &assistant);

        let output = cmd.run_file(&dir.path().join("nope.py"), &SandboxOptions::default());

        assert!(!output.success);
        assert_eq!(store.snapshot().code_attempts, 0);
    }

    #[test]
    fn test_run_with_write_failure_keeps_output() {
        let (store, storage, dir) = setup();
        storage.set_fail_writes(true);
        let assistant = Assistant::new(ScriptedBackend::new().reply("42"));
        let cmd = command(&store, &assistant);
        let options = SandboxOptions::default();

        let output = cmd.run_file(&source(&dir, "print(42)"), &options);

        assert!(!output.success);
        let text = cmd.format_output(&output, &options);
        assert!(text.starts_with("42\n"));
        assert!(text.contains("Error: Progress not saved"));
    }

    #[test]
    fn test_check_lesson_by_output() {
        let (store, _, dir) = setup();
        let assistant = Assistant::new(ScriptedBackend::new().reply("Musoma"));
        let cmd = command(&store, &assistant);
        let options = SandboxOptions::default();

        let output = cmd.check("l2-vars", &source(&dir, "town = 'Musoma'\nprint(town)"), &options);

        assert_eq!(output.correct, Some(true));
        assert_eq!(output.verdict_source, Some(VerdictSource::OutputMatch));
        assert!(cmd
            .format_output(&output, &options)
            .contains("Correct: Great job!"));
    }

    #[test]
    fn test_check_unknown_lesson() {
        let (store, _, dir) = setup();
        let assistant = Assistant::new(ScriptedBackend::new());
        let cmd = command(&store, &assistant);

        let output = cmd.check("l0", &source(&dir, "pass"), &SandboxOptions::default());

        assert!(!output.success);
        assert!(output.error.unwrap().contains("unknown lesson"));
    }

    #[test]
    fn test_review_file() {
        let (store, _, dir) = setup();
        let assistant = Assistant::new(ScriptedBackend::new().reply("Add a docstring."));
        let cmd = command(&store, &assistant);

        let output = cmd.review(&source(&dir, "def f(): pass"), &SandboxOptions::default());

        assert_eq!(output.text.as_deref(), Some("Add a docstring."));
        assert_eq!(store.snapshot().code_attempts, 0);
    }

    #[test]
    fn test_submit_passing_project() {
        let (store, _, dir) = setup();
        let assistant = Assistant::new(
            ScriptedBackend::new().reply(r#"{"correct": true, "feedback": "Hongera!"}"#),
        );
        let cmd = command(&store, &assistant);
        let options = SandboxOptions {
            json: true,
            quiet: false,
        };

        let output = cmd.submit("p1-calc", &source(&dir, "total = 0"), &options);

        assert!(output.success);
        assert_eq!(output.unlocked[0].id, "b5-builder");
        let value: serde_json::Value =
            serde_json::from_str(&cmd.format_output(&output, &options)).unwrap();
        assert_eq!(value["action"], "submit");
        assert_eq!(value["correct"], true);
        assert!(value.get("text").is_none());
    }

    #[test]
    fn test_ask_with_history_file() {
        let (store, _, dir) = setup();
        let assistant = Assistant::new(ScriptedBackend::new().reply("Use a for loop."));
        let cmd = command(&store, &assistant);
        let history = dir.path().join("history.json");
        fs::write(&history, r#"[{"role": "user", "text": "How do I repeat?"}]"#).unwrap();

        let output = cmd.ask(
            "Show me",
            "Lesson: Lists",
            Some(history.as_path()),
            &SandboxOptions::default(),
        );

        assert_eq!(output.text.as_deref(), Some("Use a for loop."));
        assert!(assistant.backend().prompts()[0].contains("How do I repeat?"));
    }

    #[test]
    fn test_ask_with_bad_history_file() {
        let (store, _, dir) = setup();
        let assistant = Assistant::new(ScriptedBackend::new());
        let cmd = command(&store, &assistant);
        let history = dir.path().join("history.json");
        fs::write(&history, "not json").unwrap();

        let output = cmd.ask("q", "ctx", Some(history.as_path()), &SandboxOptions::default());

        assert!(!output.success);
        assert!(assistant.backend().prompts().is_empty());
    }
}
