//! Core types and logic for Stride.
//!
//! This module contains the progress record, the curriculum catalog, the
//! streak, XP and badge rules, and the tracker and store that apply them.

pub mod badges;
pub mod curriculum;
pub mod progress;
pub mod store;
pub mod streak;
pub mod tracker;
pub mod xp;

pub use badges::{Badge, BadgeEvaluator, BADGES};
pub use curriculum::{
    Curriculum, Difficulty, Lesson, MiniTask, Module, Project, QuizQuestion, XP_PER_LESSON,
    XP_PER_PROJECT,
};
pub use progress::Progress;
pub use store::ProgressStore;
pub use streak::StreakUpdate;
pub use tracker::{CompletionTracker, Transition};
pub use xp::XP_PER_LEVEL;
