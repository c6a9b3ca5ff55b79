//! Prompt-driven assistant implementing every collaborator.
//!
//! One [`CompletionBackend`] serves as code interpreter, reviewer, solution
//! checker and tutor. Each role has its own prompt and its own fallbacks: one
//! for an unconfigured backend, one for a failed call.

use crate::error::{FailOpen, StrideError};
use crate::services::backend::CompletionBackend;
use crate::services::{ChatMessage, CheckResult, CodeReviewer, CodeRunner, SolutionChecker, Tutor};

pub const RUN_UNAVAILABLE: &str = "Error: Assistant not configured. Cannot execute code.";
pub const RUN_EMPTY: &str = "No output returned.";
pub const TUTOR_UNAVAILABLE: &str = "I'm sorry, I can't help right now (assistant not configured).";
pub const TUTOR_FAILED: &str = "Sorry, I'm having trouble thinking right now.";
pub const TUTOR_EMPTY: &str = "I couldn't generate a response.";
pub const CHECK_UNAVAILABLE: &str = "Assistant not configured";
pub const CHECK_FAILED: &str = "Could not verify code automatically.";
pub const REVIEW_UNAVAILABLE: &str = "Assistant not configured.";
pub const REVIEW_FAILED: &str = "Could not complete code review.";
pub const REVIEW_EMPTY: &str = "No feedback generated.";

/// Collaborator facade over a completion backend.
#[derive(Debug, Clone)]
pub struct Assistant<B> {
    backend: B,
}

impl<B: CompletionBackend> Assistant<B> {
    /// Wrap `backend`.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Ask the backend, returning `None` when it is unavailable.
    fn complete(&self, role: &str, prompt: &str) -> Option<crate::error::Result<String>> {
        if !self.backend.is_available() {
            tracing::debug!(role, backend = self.backend.name(), "assistant unavailable");
            return None;
        }
        Some(self.backend.complete(prompt))
    }
}

/// Reply text, or `empty` when the reply is blank.
fn non_empty(reply: String, empty: &str) -> String {
    if reply.trim().is_empty() {
        empty.to_string()
    } else {
        reply
    }
}

/// Strip a surrounding markdown code fence, if any.
fn strip_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parse a checker reply of the form `{"correct": bool, "feedback": string}`.
pub fn parse_check_reply(reply: &str) -> crate::error::Result<CheckResult> {
    serde_json::from_str(strip_fence(reply))
        .map_err(|e| StrideError::collaborator(format!("malformed checker reply: {}", e)))
}

fn run_prompt(code: &str) -> String {
    format!(
        "You are a Python code interpreter.\n\
         Execute the following Python code and return ONLY the output.\n\
         If there are syntax errors or runtime errors, return the error message clearly.\n\
         Do not use markdown formatting such as ```, just the raw text output.\n\
         Do not explain the code, just run it.\n\n\
         Code:\n{}\n",
        code
    )
}

fn review_prompt(code: &str) -> String {
    format!(
        "You are a senior Python code reviewer.\n\
         Analyze the following code for:\n\
         1. PEP 8 style compliance\n\
         2. Code efficiency and best practices\n\
         3. Potential bugs\n\
         4. Pythonic improvements\n\n\
         Provide the output in a structured, readable format (Markdown is okay).\n\
         Be constructive and encouraging.\n\n\
         Code:\n{}\n",
        code
    )
}

fn check_prompt(code: &str, task: &str) -> String {
    format!(
        "Task: {}\n\
         User code:\n{}\n\n\
         Analyze if the user's code correctly solves the task.\n\
         Return a JSON object with \"correct\" (boolean) and \"feedback\" (string).\n\
         The feedback should be encouraging and helpful.\n",
        task, code
    )
}

fn tutor_prompt(message: &str, context: &str, history: &[ChatMessage]) -> String {
    let history = serde_json::to_string(history)
        .map_err(StrideError::from)
        .fail_open_with("encoding tutor history", "[]".to_string());
    format!(
        "You are the Stride tutor: friendly, encouraging, and an expert Python teacher.\n\
         Help the student understand Python concepts, fix their code, or explain errors.\n\
         Keep answers concise but helpful. Use analogies from daily life in Tanzania where they help.\n\
         Context: the student is currently looking at: {}.\n\n\
         User history: {}\n\n\
         Current question: {}",
        context, history, message
    )
}

impl<B: CompletionBackend> CodeRunner for Assistant<B> {
    fn run(&self, code: &str) -> String {
        match self.complete("run", &run_prompt(code)) {
            None => RUN_UNAVAILABLE.to_string(),
            Some(Ok(reply)) => non_empty(reply, RUN_EMPTY),
            Some(Err(e)) => {
                tracing::warn!(error = %e, "code execution failed");
                format!("Execution Error: {}", e)
            }
        }
    }
}

impl<B: CompletionBackend> CodeReviewer for Assistant<B> {
    fn review(&self, code: &str) -> String {
        match self.complete("review", &review_prompt(code)) {
            None => REVIEW_UNAVAILABLE.to_string(),
            Some(reply) => reply
                .map(|text| non_empty(text, REVIEW_EMPTY))
                .fail_open_with("reviewing code", REVIEW_FAILED.to_string()),
        }
    }
}

impl<B: CompletionBackend> SolutionChecker for Assistant<B> {
    fn check(&self, code: &str, task: &str) -> CheckResult {
        match self.complete("check", &check_prompt(code, task)) {
            None => CheckResult::fail(CHECK_UNAVAILABLE),
            Some(reply) => reply
                .and_then(|text| parse_check_reply(&text))
                .fail_open_with("checking solution", CheckResult::fail(CHECK_FAILED)),
        }
    }
}

impl<B: CompletionBackend> Tutor for Assistant<B> {
    fn ask(&self, message: &str, context: &str, history: &[ChatMessage]) -> String {
        match self.complete("tutor", &tutor_prompt(message, context, history)) {
            None => TUTOR_UNAVAILABLE.to_string(),
            Some(reply) => reply
                .map(|text| non_empty(text, TUTOR_EMPTY))
                .fail_open_with("asking tutor", TUTOR_FAILED.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::backend::tests::ScriptedBackend;
    use crate::services::OfflineBackend;

    fn assistant(backend: ScriptedBackend) -> Assistant<ScriptedBackend> {
        Assistant::new(backend)
    }

    // =========================================================================
    // Code runner
    // =========================================================================

    #[test]
    fn test_run_returns_reply() {
        let a = assistant(ScriptedBackend::new().reply("Hello, Stride!\n"));
        assert_eq!(a.run("print('Hello, Stride!')"), "Hello, Stride!\n");

        let prompts = a.backend().prompts();
        assert!(prompts[0].contains("Python code interpreter"));
        assert!(prompts[0].ends_with("print('Hello, Stride!')\n"));
    }

    #[test]
    fn test_run_empty_reply() {
        let a = assistant(ScriptedBackend::new().reply("   "));
        assert_eq!(a.run("pass"), RUN_EMPTY);
    }

    #[test]
    fn test_run_failure_becomes_text() {
        let a = assistant(ScriptedBackend::new().fail("timeout"));
        let out = a.run("x = 1");
        assert!(out.starts_with("Execution Error:"));
        assert!(out.contains("timeout"));
    }

    #[test]
    fn test_run_offline() {
        assert_eq!(Assistant::new(OfflineBackend).run("print(1)"), RUN_UNAVAILABLE);
    }

    // =========================================================================
    // Reviewer
    // =========================================================================

    #[test]
    fn test_review() {
        let a = assistant(ScriptedBackend::new().reply("Looks tidy.").fail("down"));
        assert_eq!(a.review("x=1"), "Looks tidy.");
        assert_eq!(a.review("x=1"), REVIEW_FAILED);
        assert!(a.backend().prompts()[0].contains("PEP 8"));
    }

    #[test]
    fn test_review_offline() {
        assert_eq!(Assistant::new(OfflineBackend).review("x"), REVIEW_UNAVAILABLE);
    }

    // =========================================================================
    // Solution checker
    // =========================================================================

    #[test]
    fn test_check_parses_json() {
        let a = assistant(
            ScriptedBackend::new().reply(r#"{"correct": true, "feedback": "Nice loop!"}"#),
        );
        assert_eq!(
            a.check("for i in range(3): print(i)", "Print 0..2"),
            CheckResult::pass("Nice loop!")
        );
        assert!(a.backend().prompts()[0].starts_with("Task: Print 0..2"));
    }

    #[test]
    fn test_check_accepts_fenced_json() {
        let a = assistant(ScriptedBackend::new().reply(
            "```json\n{\"correct\": false, \"feedback\": \"Close, check the range.\"}\n```",
        ));
        assert_eq!(
            a.check("code", "task"),
            CheckResult::fail("Close, check the range.")
        );
    }

    #[test]
    fn test_check_malformed_reply_falls_back() {
        let a = assistant(ScriptedBackend::new().reply("Yes, that is correct!"));
        assert_eq!(a.check("code", "task"), CheckResult::fail(CHECK_FAILED));
    }

    #[test]
    fn test_check_failure_falls_back() {
        let a = assistant(ScriptedBackend::new().fail("connection reset"));
        assert_eq!(a.check("code", "task"), CheckResult::fail(CHECK_FAILED));
    }

    #[test]
    fn test_check_offline() {
        assert_eq!(
            Assistant::new(OfflineBackend).check("code", "task"),
            CheckResult::fail(CHECK_UNAVAILABLE)
        );
    }

    #[test]
    fn test_strip_fence() {
        assert_eq!(strip_fence("  {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_fence("```json\n{}\n```\n"), "{}");
    }

    // =========================================================================
    // Tutor
    // =========================================================================

    #[test]
    fn test_tutor_sends_full_history() {
        let a = assistant(ScriptedBackend::new().reply("A list is like a matatu queue."));
        let history = vec![
            ChatMessage::user("What is a list?"),
            ChatMessage::model("An ordered collection."),
        ];

        let answer = a.ask("Give me an analogy", "Lesson: Lists", &history);

        assert_eq!(answer, "A list is like a matatu queue.");
        let prompt = &a.backend().prompts()[0];
        assert!(prompt.contains("Context: the student is currently looking at: Lesson: Lists."));
        assert!(prompt.contains(r#"{"role":"user","text":"What is a list?"}"#));
        assert!(prompt.ends_with("Current question: Give me an analogy"));
    }

    #[test]
    fn test_tutor_fallbacks() {
        let a = assistant(ScriptedBackend::new().fail("down").reply(""));
        assert_eq!(a.ask("q", "ctx", &[]), TUTOR_FAILED);
        assert_eq!(a.ask("q", "ctx", &[]), TUTOR_EMPTY);
        assert_eq!(
            Assistant::new(OfflineBackend).ask("q", "ctx", &[]),
            TUTOR_UNAVAILABLE
        );
    }
}
