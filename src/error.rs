//! Unified error types for Stride.
//!
//! Only persistence write failures are surfaced to callers of mutating
//! operations. Everything else (a missing or corrupt progress file, an
//! unavailable assistant, a malformed checker reply) is recovered locally by
//! logging a warning and substituting a safe default.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Stride operations.
#[derive(Error, Debug)]
pub enum StrideError {
    /// I/O errors from progress file operations.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },

    /// External assistant failures (spawn, exit status, empty reply).
    #[error("collaborator error: {message}")]
    Collaborator { message: String },

    /// Caller supplied something the engine cannot act on.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

/// A specialized Result type for Stride operations.
pub type Result<T> = std::result::Result<T, StrideError>;

impl StrideError {
    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a collaborator error.
    pub fn collaborator(message: impl Into<String>) -> Self {
        Self::Collaborator {
            message: message.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Whether this error means a mutation was not durably recorded.
    pub fn is_persistence_failure(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Serde { .. })
    }
}

impl From<io::Error> for StrideError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for StrideError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Fail-open handling for recoverable errors.
///
/// Logs the error as a warning and substitutes a fallback value.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;

    /// Handle an error by logging a warning and returning the provided fallback.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using default)", context, err);
                T::default()
            }
        }
    }

    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using fallback)", context, err);
                fallback
            }
        }
    }
}

/// Exit codes for the Stride CLI.
pub mod exit_codes {
    /// Command completed and its result was recorded.
    pub const SUCCESS: i32 = 0;

    /// Command failed or its result could not be persisted.
    pub const ERROR: i32 = 1;
}
