//! Text-completion backends for the assistant.

use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;

use crate::config::AssistantConfig;
use crate::error::{Result, StrideError};

/// Something that turns a prompt into a reply.
pub trait CompletionBackend: Send + Sync {
    /// Complete `prompt`.
    fn complete(&self, prompt: &str) -> Result<String>;

    /// Whether the backend can be called at all.
    ///
    /// An unavailable backend yields the "not configured" fallbacks instead
    /// of the generic failure ones.
    fn is_available(&self) -> bool {
        true
    }

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}

impl<T: CompletionBackend + ?Sized> CompletionBackend for Arc<T> {
    fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<T: CompletionBackend + ?Sized> CompletionBackend for Box<T> {
    fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Build the backend described by `config`.
pub fn from_config(config: &AssistantConfig) -> Box<dyn CompletionBackend> {
    match &config.command {
        Some(program) => Box::new(CommandBackend::new(program, config.args.clone())),
        None => {
            tracing::debug!("no assistant command configured, running offline");
            Box::new(OfflineBackend)
        }
    }
}

/// Pipes the prompt to an external program and reads its reply.
///
/// The program receives the prompt on stdin and must write the reply to
/// stdout and exit with status 0.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
}

impl CommandBackend {
    /// Create a backend that runs `program` with `args`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// The program this backend runs.
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl CompletionBackend for CommandBackend {
    fn complete(&self, prompt: &str) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                StrideError::collaborator(format!("{} not available: {}", self.program, e))
            })?;

        // The prompt is written from its own thread so a program that answers
        // while still reading cannot fill the stdout pipe and stall us.
        let stdin = child.stdin.take();
        let output = thread::scope(|scope| {
            if let Some(mut stdin) = stdin {
                scope.spawn(move || {
                    // A program that exits without reading its input is judged
                    // by its exit status, not by the broken pipe.
                    if let Err(e) = stdin.write_all(prompt.as_bytes()) {
                        tracing::debug!(
                            program = %self.program,
                            error = %e,
                            "prompt not fully written"
                        );
                    }
                });
            }
            child.wait_with_output()
        })
        .map_err(|e| {
            StrideError::collaborator(format!("{} did not finish: {}", self.program, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StrideError::collaborator(format!(
                "{} failed ({}): {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn name(&self) -> &'static str {
        "command"
    }
}

/// Backend used when no assistant is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineBackend;

impl CompletionBackend for OfflineBackend {
    fn complete(&self, _prompt: &str) -> Result<String> {
        Err(StrideError::collaborator("no assistant command configured"))
    }

    fn is_available(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}
