//! Progress storage traits for Stride.
//!
//! This module defines the `ProgressStorage` trait: a single record under a
//! single fixed key, read and written whole.

use std::sync::Arc;

use crate::core::Progress;
use crate::error::Result;

/// Key under which the progress record is stored.
pub const PROGRESS_KEY: &str = "progress";

/// Trait for progress storage backends.
pub trait ProgressStorage: Send + Sync {
    /// Load the stored record.
    ///
    /// Returns `Ok(None)` if nothing has been stored yet, and an error if the
    /// stored value cannot be read or parsed.
    fn load(&self) -> Result<Option<Progress>>;

    /// Overwrite the stored record.
    fn save(&self, progress: &Progress) -> Result<()>;

    /// Remove the stored record.
    ///
    /// Returns `Ok(())` even if nothing was stored.
    fn clear(&self) -> Result<()>;

    /// Short name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Blanket implementation of ProgressStorage for Arc-wrapped stores.
///
/// This allows sharing one store between a `ProgressStore` and a test that
/// inspects what was written.
impl<T: ProgressStorage + ?Sized> ProgressStorage for Arc<T> {
    fn load(&self) -> Result<Option<Progress>> {
        (**self).load()
    }

    fn save(&self, progress: &Progress) -> Result<()> {
        (**self).save(progress)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
