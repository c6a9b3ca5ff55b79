//! Stride - progress and achievement engine for an interactive coding course.
//!
//! Stride tracks a learner's completed lessons and projects, XP and level,
//! daily streak and badges, persists them as one record, and couples them to
//! an external assistant that runs, reviews and grades learner code.

pub mod activity;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod journal;
pub mod leaderboard;
pub mod services;
pub mod storage;
pub mod util;

pub use activity::Activities;
pub use config::Config;
pub use core::{
    Badge, BadgeEvaluator, CompletionTracker, Curriculum, Progress, ProgressStore, Transition,
};
pub use error::{Result, StrideError};
pub use journal::{ActivityJournal, JournalEvent};
pub use services::{
    Assistant, ChatMessage, CheckResult, CodeReviewer, CodeRunner, CompletionBackend,
    SolutionChecker, Tutor,
};
pub use storage::{FileProgressStore, MemoryProgressStore, ProgressStorage};

// CLI commands
pub use cli::{
    BadgesCommand, CompleteCommand, LeaderboardCommand, ResetCommand, SandboxCommand,
    StatusCommand,
};
