//! Learner-facing flows that couple the collaborators to the engine.
//!
//! Each flow asks a collaborator for something and records what it means for
//! progress. Collaborator answers are never lost to a persistence failure:
//! the failure travels next to the answer in `persist_error`.

use crate::config::RewardsConfig;
use crate::core::{ProgressStore, Transition};
use crate::error::{Result, StrideError};
use crate::services::{ChatMessage, CheckResult, CodeReviewer, CodeRunner, SolutionChecker, Tutor};
use crate::storage::ProgressStorage;

/// Feedback shown when program output contains the expected text.
pub const OUTPUT_MATCH_FEEDBACK: &str = "Great job! Your output matches perfectly.";

/// Result of running learner code.
#[derive(Debug)]
pub struct RunOutcome {
    /// What the program printed, or an error text.
    pub output: String,
    /// Set when the code attempt could not be saved.
    pub persist_error: Option<StrideError>,
}

/// How a lesson task was judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSource {
    /// Output contained the expected text.
    OutputMatch,
    /// The solution checker decided.
    Checker,
}

/// Result of verifying a lesson mini-task.
#[derive(Debug)]
pub struct TaskVerdict {
    /// Output of the run that preceded judging.
    pub output: String,
    /// The verdict shown to the learner.
    pub result: CheckResult,
    /// Who decided.
    pub source: VerdictSource,
    /// Set when the code attempt could not be saved.
    pub persist_error: Option<StrideError>,
}

/// Result of submitting a project.
#[derive(Debug)]
pub struct Submission {
    /// The checker's verdict.
    pub result: CheckResult,
    /// The completion, when the verdict was a pass.
    pub transition: Option<Transition>,
    /// Set when a passing completion could not be saved.
    pub persist_error: Option<StrideError>,
}

/// Activity flows for one learner.
pub struct Activities<'a, S: ProgressStorage, A> {
    store: &'a ProgressStore<S>,
    assistant: &'a A,
    rewards: RewardsConfig,
}

impl<'a, S, A> Activities<'a, S, A>
where
    S: ProgressStorage,
    A: CodeRunner + CodeReviewer + SolutionChecker + Tutor,
{
    /// Create flows over `store` served by `assistant`.
    pub fn new(store: &'a ProgressStore<S>, assistant: &'a A, rewards: RewardsConfig) -> Self {
        Self {
            store,
            assistant,
            rewards,
        }
    }

    /// Run code in the sandbox. Counts one code attempt.
    pub fn run_code(&self, code: &str) -> RunOutcome {
        let persist_error = self.store.increment_code_attempts().err();
        let output = self.assistant.run(code);
        RunOutcome {
            output,
            persist_error,
        }
    }

    /// Ask for a code review. Does not count as an attempt.
    pub fn review_code(&self, code: &str) -> String {
        self.assistant.review(code)
    }

    /// Check a lesson's mini-task.
    ///
    /// The code is run first; if its trimmed output contains the expected
    /// text the task passes without consulting the checker. Verifying does
    /// not complete the lesson.
    pub fn verify_lesson_task(&self, lesson_id: &str, code: &str) -> Result<TaskVerdict> {
        let lesson = self
            .store
            .curriculum()
            .lesson(lesson_id)
            .ok_or_else(|| StrideError::invalid_input(format!("unknown lesson '{}'", lesson_id)))?;
        let task = &lesson.task;

        let RunOutcome {
            output,
            persist_error,
        } = self.run_code(code);

        let matched = task
            .expected_output
            .as_deref()
            .is_some_and(|expected| output.trim().contains(expected));

        let (result, source) = if matched {
            (
                CheckResult::pass(OUTPUT_MATCH_FEEDBACK),
                VerdictSource::OutputMatch,
            )
        } else {
            (
                self.assistant.check(code, &task.description),
                VerdictSource::Checker,
            )
        };

        tracing::debug!(lesson_id, correct = result.correct, ?source, "lesson task verified");

        Ok(TaskVerdict {
            output,
            result,
            source,
            persist_error,
        })
    }

    /// Mark a lesson finished and award the configured XP.
    ///
    /// `answers` are the learner's quiz choices, one option index per
    /// question. `task` is the latest mini-task verdict, if the task was
    /// checked. Wrong answers or a failed task leave progress untouched.
    pub fn finish_lesson(
        &self,
        lesson_id: &str,
        answers: &[usize],
        task: Option<&CheckResult>,
    ) -> Result<Transition> {
        let lesson = self
            .store
            .curriculum()
            .lesson(lesson_id)
            .ok_or_else(|| StrideError::invalid_input(format!("unknown lesson '{}'", lesson_id)))?;
        lesson.completion_gate(answers, task.map(|verdict| verdict.correct))?;

        self.store
            .complete_lesson(lesson_id, self.rewards.xp_per_lesson)
    }

    /// Submit a project for grading; a pass completes it.
    pub fn submit_project(&self, project_id: &str, code: &str) -> Result<Submission> {
        let project = self
            .store
            .curriculum()
            .project(project_id)
            .ok_or_else(|| {
                StrideError::invalid_input(format!("unknown project '{}'", project_id))
            })?;

        let result = self.assistant.check(code, &project.verification_task());
        if !result.correct {
            return Ok(Submission {
                result,
                transition: None,
                persist_error: None,
            });
        }

        let (transition, persist_error) = match self
            .store
            .complete_project(project_id, self.rewards.xp_per_project)
        {
            Ok(transition) => (Some(transition), None),
            Err(e) => (None, Some(e)),
        };

        Ok(Submission {
            result,
            transition,
            persist_error,
        })
    }

    /// Ask the tutor. History is passed through unchanged.
    pub fn ask_tutor(&self, message: &str, context: &str, history: &[ChatMessage]) -> String {
        self.assistant.ask(message, context, history)
    }
}
