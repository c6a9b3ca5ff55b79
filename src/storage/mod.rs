//! Progress storage for Stride.
//!
//! This module provides durable storage for the single progress record,
//! supporting file-based and in-memory backends.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileProgressStore;
pub use memory::MemoryProgressStore;
pub use traits::{ProgressStorage, PROGRESS_KEY};
