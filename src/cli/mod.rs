//! CLI commands for Stride.
//!
//! This module provides CLI commands for Stride, organized into:
//! - **Progress commands**: status, lesson/project completion, badges, leaderboard
//! - **Sandbox commands**: run, check, review, submit, ask (assistant-backed)
//! - **Maintenance commands**: reset

// Progress commands
pub mod badges;
pub mod complete;
pub mod leaderboard;
pub mod status;

// Sandbox commands
pub mod sandbox;

// Maintenance commands
pub mod reset;

pub use badges::BadgesCommand;
pub use complete::CompleteCommand;
pub use leaderboard::LeaderboardCommand;
pub use reset::ResetCommand;
pub use sandbox::SandboxCommand;
pub use status::StatusCommand;
