//! The learner's progress record.
//!
//! One record per learner, persisted as a whole. Set-valued fields use
//! `BTreeSet` so membership is idempotent and the serialized form is stable.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::curriculum::Curriculum;
use crate::core::xp;

/// Persistent learner state.
///
/// Fields are public for reading and for constructing fixtures; production
/// mutation goes through [`crate::core::CompletionTracker`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Lessons the learner has finished.
    pub completed_lessons: BTreeSet<String>,
    /// Projects that passed verification.
    pub completed_projects: BTreeSet<String>,
    /// Accumulated experience points.
    pub xp: u64,
    /// Consecutive calendar days with a session. Always at least 1.
    pub streak: u32,
    /// Day of the most recent streak evaluation.
    pub last_login_date: NaiveDate,
    /// Modules open to the learner. Every module is unlocked at creation.
    pub unlocked_modules: BTreeSet<String>,
    /// Sandbox executions.
    pub code_attempts: u64,
    /// Earned badge ids.
    pub badges: BTreeSet<String>,
}

impl Progress {
    /// Create a fresh record dated `today` with every module in `curriculum` unlocked.
    pub fn new(today: NaiveDate, curriculum: &Curriculum) -> Self {
        Self {
            completed_lessons: BTreeSet::new(),
            completed_projects: BTreeSet::new(),
            xp: 0,
            streak: 1,
            last_login_date: today,
            unlocked_modules: curriculum.module_ids().map(str::to_string).collect(),
            code_attempts: 0,
            badges: BTreeSet::new(),
        }
    }

    /// Current level, starting at 1.
    pub fn level(&self) -> u64 {
        xp::level(self.xp)
    }

    /// Fraction of the current level already earned, in `[0.0, 1.0]`.
    pub fn level_progress(&self) -> f64 {
        xp::progress_fraction(self.xp)
    }

    /// Whether the lesson has been completed.
    pub fn has_lesson(&self, id: &str) -> bool {
        self.completed_lessons.contains(id)
    }

    /// Whether the project has been completed.
    pub fn has_project(&self, id: &str) -> bool {
        self.completed_projects.contains(id)
    }

    /// Whether the badge has been earned.
    pub fn has_badge(&self, id: &str) -> bool {
        self.badges.contains(id)
    }

    /// Repair invariants a stored record may violate.
    ///
    /// Returns true if anything was changed.
    pub fn normalize(&mut self) -> bool {
        if self.streak == 0 {
            tracing::warn!("stored progress had streak 0, restoring to 1");
            self.streak = 1;
            return true;
        }
        false
    }
}
