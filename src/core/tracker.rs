//! Completion tracker: the mutating core of the progress engine.
//!
//! Every operation reads the current record, builds the next record, runs the
//! badge rules against exactly that next record, and only then replaces the
//! current one. Persistence and publication are the caller's job (see
//! [`crate::core::ProgressStore`]).

use chrono::NaiveDate;

use crate::core::badges::{Badge, BadgeEvaluator};
use crate::core::curriculum::Curriculum;
use crate::core::progress::Progress;
use crate::core::streak;

/// Outcome of a single tracker operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transition {
    /// Whether the record changed.
    pub changed: bool,
    /// Badges unlocked by this operation, in catalog order.
    pub unlocked: Vec<&'static Badge>,
}

impl Transition {
    /// A transition that left the record untouched.
    pub fn unchanged() -> Self {
        Self::default()
    }

    fn changed(unlocked: Vec<&'static Badge>) -> Self {
        Self {
            changed: true,
            unlocked,
        }
    }

    /// Display name of the first unlocked badge, if any.
    pub fn headline_badge(&self) -> Option<&'static str> {
        self.unlocked.first().map(|b| b.name)
    }
}

/// Applies learner events to a progress record.
///
/// All mutations of a [`Progress`] go through this struct.
#[derive(Debug)]
pub struct CompletionTracker<'a> {
    /// The record being managed.
    progress: &'a mut Progress,
    /// Catalog used to validate ids and build fresh records.
    curriculum: &'a Curriculum,
    /// Unlock rules.
    evaluator: &'a BadgeEvaluator,
}

impl<'a> CompletionTracker<'a> {
    /// Create a tracker over `progress`.
    pub fn new(
        progress: &'a mut Progress,
        curriculum: &'a Curriculum,
        evaluator: &'a BadgeEvaluator,
    ) -> Self {
        Self {
            progress,
            curriculum,
            evaluator,
        }
    }

    /// Current record.
    pub fn progress(&self) -> &Progress {
        self.progress
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Mark a lesson complete and award XP.
    ///
    /// Repeating an already completed lesson, or naming a lesson the
    /// curriculum does not contain, leaves the record untouched.
    pub fn complete_lesson(&mut self, lesson_id: &str, xp_award: u64) -> Transition {
        if !self.curriculum.has_lesson(lesson_id) {
            tracing::warn!(lesson_id, "ignoring completion of unknown lesson");
            return Transition::unchanged();
        }
        if self.progress.has_lesson(lesson_id) {
            tracing::debug!(lesson_id, "lesson already completed");
            return Transition::unchanged();
        }

        let mut next = self.progress.clone();
        next.completed_lessons.insert(lesson_id.to_string());
        next.xp = next.xp.saturating_add(xp_award);
        self.commit(next)
    }

    /// Mark a project complete and award XP. Same idempotency rules as lessons.
    pub fn complete_project(&mut self, project_id: &str, xp_award: u64) -> Transition {
        if !self.curriculum.has_project(project_id) {
            tracing::warn!(project_id, "ignoring completion of unknown project");
            return Transition::unchanged();
        }
        if self.progress.has_project(project_id) {
            tracing::debug!(project_id, "project already completed");
            return Transition::unchanged();
        }

        let mut next = self.progress.clone();
        next.completed_projects.insert(project_id.to_string());
        next.xp = next.xp.saturating_add(xp_award);
        self.commit(next)
    }

    /// Count one sandbox execution. Never unlocks badges.
    pub fn increment_code_attempts(&mut self) -> Transition {
        self.progress.code_attempts = self.progress.code_attempts.saturating_add(1);
        Transition::changed(Vec::new())
    }

    /// Evaluate the login streak for a session starting on `today`.
    ///
    /// A second call on the same day is a no-op.
    pub fn evaluate_streak(&mut self, today: NaiveDate) -> Transition {
        let update = streak::evaluate(self.progress.last_login_date, today, self.progress.streak);
        if !update.changed {
            return Transition::unchanged();
        }

        let mut next = self.progress.clone();
        next.streak = update.streak;
        next.last_login_date = update.last_login_date;
        self.commit(next)
    }

    /// Replace the record with fresh defaults dated `today`.
    pub fn reset(&mut self, today: NaiveDate) -> Transition {
        *self.progress = Progress::new(today, self.curriculum);
        Transition::changed(Vec::new())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Evaluate badges against `next`, merge them, and install `next`.
    fn commit(&mut self, mut next: Progress) -> Transition {
        let unlocked = self.evaluator.evaluate(self.progress, &next);
        for badge in &unlocked {
            tracing::info!(badge = badge.id, "badge unlocked");
            next.badges.insert(badge.id.to_string());
        }
        *self.progress = next;
        Transition::changed(unlocked)
    }
}
