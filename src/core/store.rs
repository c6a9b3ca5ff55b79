//! Progress store: the single owner of the learner's record.
//!
//! Every read and mutation flows through a `ProgressStore`. Mutations run
//! tracker, badge evaluation, persistence, and publication as one step under
//! a mutex, so the badge rules always see the record produced by the
//! mutation that triggered them and never an interleaved one.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;

use crate::core::badges::{self, BadgeEvaluator};
use crate::core::curriculum::Curriculum;
use crate::core::progress::Progress;
use crate::core::tracker::{CompletionTracker, Transition};
use crate::error::{FailOpen, Result};
use crate::journal::{ActivityJournal, JournalEvent};
use crate::storage::ProgressStorage;

/// Mutable state guarded by the store's lock.
#[derive(Debug)]
struct StoreState {
    /// Current record.
    progress: Progress,
    /// Name of the most recently unlocked badge, until acknowledged.
    pending_badge: Option<String>,
    /// Snapshot subscribers.
    subscribers: Vec<Sender<Progress>>,
}

impl StoreState {
    /// Send the current record to every live subscriber, dropping dead ones.
    fn publish(&mut self) {
        let snapshot = &self.progress;
        self.subscribers
            .retain(|subscriber| subscriber.send(snapshot.clone()).is_ok());
    }
}

/// Process-wide holder of the progress record.
#[derive(Debug)]
pub struct ProgressStore<S: ProgressStorage> {
    storage: S,
    curriculum: Curriculum,
    evaluator: BadgeEvaluator,
    journal: Option<ActivityJournal>,
    state: Mutex<StoreState>,
}

impl<S: ProgressStorage> ProgressStore<S> {
    /// Initialize from storage.
    ///
    /// A missing or unreadable record is replaced by a fresh one dated
    /// `today`. Nothing is written until the first mutation.
    pub fn load(storage: S, curriculum: Curriculum, today: NaiveDate) -> Self {
        let stored = storage.load().fail_open_default("loading stored progress");
        let progress = match stored {
            Some(mut progress) => {
                progress.normalize();
                progress
            }
            None => {
                tracing::debug!(storage = storage.name(), "no stored progress, using defaults");
                Progress::new(today, &curriculum)
            }
        };

        Self {
            evaluator: BadgeEvaluator::new(&curriculum),
            storage,
            curriculum,
            journal: None,
            state: Mutex::new(StoreState {
                progress,
                pending_badge: None,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Initialize from storage, attach `journal`, and evaluate the streak for
    /// `today`.
    ///
    /// A failed write of the activation change is logged; the session
    /// continues with the updated in-memory record.
    pub fn open(
        storage: S,
        curriculum: Curriculum,
        today: NaiveDate,
        journal: Option<ActivityJournal>,
    ) -> Self {
        let mut store = Self::load(storage, curriculum, today);
        store.journal = journal;
        store
            .activate(today)
            .fail_open_default("recording session start");
        store
    }

    /// Record engine events to `journal` as they happen.
    pub fn with_journal(mut self, journal: ActivityJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// The catalog this store validates against.
    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    /// The storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// A copy of the current record.
    pub fn snapshot(&self) -> Progress {
        self.lock().progress.clone()
    }

    /// Current level.
    pub fn level(&self) -> u64 {
        self.lock().progress.level()
    }

    /// Fraction of the current level earned.
    pub fn progress_fraction(&self) -> f64 {
        self.lock().progress.level_progress()
    }

    /// Receive a snapshot after every mutation that changes the record.
    pub fn subscribe(&self) -> Receiver<Progress> {
        let (tx, rx) = mpsc::channel();
        self.lock().subscribers.push(tx);
        rx
    }

    // =========================================================================
    // One-shot badge notification
    // =========================================================================

    /// Display name of the most recently unlocked badge, if not yet acknowledged.
    pub fn pending_badge(&self) -> Option<String> {
        self.lock().pending_badge.clone()
    }

    /// Clear the notification, returning what it held. Earned badges are kept.
    pub fn acknowledge_badge(&self) -> Option<String> {
        self.lock().pending_badge.take()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Evaluate the login streak for a session starting on `today`.
    ///
    /// Call once when a session starts; repeated calls on the same day are
    /// no-ops.
    pub fn activate(&self, today: NaiveDate) -> Result<Transition> {
        self.mutate(
            |tracker| tracker.evaluate_streak(today),
            |progress| {
                Some(JournalEvent::StreakEvaluated {
                    streak: progress.streak,
                })
            },
        )
    }

    /// Mark a lesson complete and award XP.
    pub fn complete_lesson(&self, lesson_id: &str, xp_award: u64) -> Result<Transition> {
        self.mutate(
            |tracker| tracker.complete_lesson(lesson_id, xp_award),
            |_| {
                Some(JournalEvent::LessonCompleted {
                    lesson_id: lesson_id.to_string(),
                    xp: xp_award,
                })
            },
        )
    }

    /// Mark a project complete and award XP.
    pub fn complete_project(&self, project_id: &str, xp_award: u64) -> Result<Transition> {
        self.mutate(
            |tracker| tracker.complete_project(project_id, xp_award),
            |_| {
                Some(JournalEvent::ProjectCompleted {
                    project_id: project_id.to_string(),
                    xp: xp_award,
                })
            },
        )
    }

    /// Count one call to the code execution service.
    pub fn increment_code_attempts(&self) -> Result<Transition> {
        self.mutate(
            |tracker| tracker.increment_code_attempts(),
            |progress| {
                Some(JournalEvent::CodeAttempt {
                    total: progress.code_attempts,
                })
            },
        )
    }

    /// Wipe progress back to defaults dated `today`. Irreversible.
    pub fn reset(&self, today: NaiveDate) -> Result<Transition> {
        self.mutate(|tracker| tracker.reset(today), |_| Some(JournalEvent::Reset))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one transition: apply, evaluate, persist, publish.
    ///
    /// A failed write is returned to the caller, but the in-memory record
    /// keeps the mutation for the rest of the session.
    fn mutate<F, E>(&self, apply: F, event: E) -> Result<Transition>
    where
        F: FnOnce(&mut CompletionTracker<'_>) -> Transition,
        E: FnOnce(&Progress) -> Option<JournalEvent>,
    {
        let mut state = self.lock();

        let transition = {
            let mut tracker =
                CompletionTracker::new(&mut state.progress, &self.curriculum, &self.evaluator);
            apply(&mut tracker)
        };

        if !transition.changed {
            return Ok(transition);
        }

        if let Some(name) = transition.headline_badge() {
            state.pending_badge = Some(name.to_string());
        }
        // The notification may only name a badge that is still held.
        let held = state
            .pending_badge
            .as_deref()
            .and_then(badges::find_by_name)
            .is_some_and(|badge| state.progress.has_badge(badge.id));
        if !held {
            state.pending_badge = None;
        }

        let persisted = self.storage.save(&state.progress);
        state.publish();

        if let Err(err) = persisted {
            tracing::warn!(
                storage = self.storage.name(),
                error = %err,
                "progress change not persisted"
            );
            return Err(err);
        }

        // Only changes that reached storage become history.
        if let Some(journal) = &self.journal {
            let mut events: Vec<JournalEvent> = event(&state.progress).into_iter().collect();
            events.extend(transition.unlocked.iter().map(|badge| {
                JournalEvent::BadgeUnlocked {
                    badge_id: badge.id.to_string(),
                }
            }));
            for entry in events {
                journal
                    .append(entry)
                    .fail_open_default("writing activity journal");
            }
        }

        Ok(transition)
    }
}
