//! Activity journal for Stride.
//!
//! An append-only JSONL log (`<stride home>/activity.log`) of engine events.
//! The progress record is the source of truth; the journal is a history of
//! how it got there and is written fail-open.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StrideError};
use crate::util::read_to_string_limited;

/// Schema version for journal entries.
pub const JOURNAL_SCHEMA_VERSION: u8 = 1;

/// One line of the journal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalEntry {
    /// Schema version for forward compatibility.
    pub v: u8,
    /// When the event was recorded.
    pub ts: DateTime<Utc>,
    /// The event and its data.
    #[serde(flatten)]
    pub event: JournalEvent,
}

impl JournalEntry {
    /// Create an entry stamped with the current time.
    pub fn new(event: JournalEvent) -> Self {
        Self::with_timestamp(event, Utc::now())
    }

    /// Create an entry with a specific timestamp (for testing).
    pub fn with_timestamp(event: JournalEvent, ts: DateTime<Utc>) -> Self {
        Self {
            v: JOURNAL_SCHEMA_VERSION,
            ts,
            event,
        }
    }
}

/// Engine events worth keeping a history of.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JournalEvent {
    /// A lesson was completed for the first time.
    LessonCompleted { lesson_id: String, xp: u64 },
    /// A project passed verification for the first time.
    ProjectCompleted { project_id: String, xp: u64 },
    /// A badge was earned.
    BadgeUnlocked { badge_id: String },
    /// The login streak changed at session start.
    StreakEvaluated { streak: u32 },
    /// Code was sent to the execution service.
    CodeAttempt { total: u64 },
    /// Progress was wiped.
    Reset,
}

impl JournalEvent {
    /// Get the event name as a string.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::LessonCompleted { .. } => "lesson_completed",
            Self::ProjectCompleted { .. } => "project_completed",
            Self::BadgeUnlocked { .. } => "badge_unlocked",
            Self::StreakEvaluated { .. } => "streak_evaluated",
            Self::CodeAttempt { .. } => "code_attempt",
            Self::Reset => "reset",
        }
    }
}

/// JSONL writer and reader for the activity journal.
#[derive(Debug, Clone)]
pub struct ActivityJournal {
    /// Path to the journal file.
    path: PathBuf,
}

impl ActivityJournal {
    /// Create a journal at the given path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path to the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event.
    pub fn append(&self, event: JournalEvent) -> Result<()> {
        self.append_entry(&JournalEntry::new(event))
    }

    /// Append a prepared entry.
    pub fn append_entry(&self, entry: &JournalEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StrideError::storage(parent, e))?;
        }

        let json = serde_json::to_string(entry)
            .map_err(|e| StrideError::serde(format!("Failed to serialize journal entry: {}", e)))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StrideError::storage(&self.path, e))?;

        writeln!(file, "{}", json).map_err(|e| StrideError::storage(&self.path, e))?;

        Ok(())
    }

    /// Read every parseable entry. Malformed lines are skipped.
    pub fn read_all(&self) -> Result<Vec<JournalEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = read_to_string_limited(&self.path)?;
        let mut entries = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<JournalEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::debug!(line = line_no + 1, error = %e, "skipping journal line"),
            }
        }
        Ok(entries)
    }
}
