//! External collaborators used by the learner-facing activities.
//!
//! The engine never calls these directly. Each collaborator is infallible
//! from the caller's point of view: transport failures, a missing assistant
//! and malformed replies all degrade to fixed fallback results.

pub mod assistant;
pub mod backend;

use serde::{Deserialize, Serialize};

pub use assistant::Assistant;
pub use backend::{CommandBackend, CompletionBackend, OfflineBackend};

/// One turn of a tutor conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who spoke: `user` or `model`.
    pub role: String,
    /// What they said.
    pub text: String,
}

impl ChatMessage {
    /// A learner turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            text: text.into(),
        }
    }

    /// A tutor turn.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: "model".to_string(),
            text: text.into(),
        }
    }
}

/// Verdict of the solution checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Whether the code solves the task.
    pub correct: bool,
    /// Encouraging explanation for the learner.
    pub feedback: String,
}

impl CheckResult {
    /// A passing verdict.
    pub fn pass(feedback: impl Into<String>) -> Self {
        Self {
            correct: true,
            feedback: feedback.into(),
        }
    }

    /// A failing verdict.
    pub fn fail(feedback: impl Into<String>) -> Self {
        Self {
            correct: false,
            feedback: feedback.into(),
        }
    }
}

/// Runs learner code and returns what it printed.
pub trait CodeRunner: Send + Sync {
    /// Execute `code`. Errors come back as text, never as `Err`.
    fn run(&self, code: &str) -> String;
}

/// Reviews learner code for style, efficiency and bugs.
pub trait CodeReviewer: Send + Sync {
    /// Review `code`, returning readable feedback.
    fn review(&self, code: &str) -> String;
}

/// Decides whether code solves a task.
pub trait SolutionChecker: Send + Sync {
    /// Judge `code` against `task`.
    fn check(&self, code: &str, task: &str) -> CheckResult;
}

/// Answers learner questions.
///
/// Stateless: the full conversation is passed on every call.
pub trait Tutor: Send + Sync {
    /// Answer `message` given what the learner is looking at and the
    /// conversation so far.
    fn ask(&self, message: &str, context: &str, history: &[ChatMessage]) -> String;
}
