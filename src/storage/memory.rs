//! In-memory progress storage for testing.
//!
//! Keeps the serialized JSON rather than the struct, so tests exercise the
//! same encode/decode path as the file store and can plant corrupt records.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::core::Progress;
use crate::error::{Result, StrideError};
use crate::storage::ProgressStorage;

/// In-memory progress store.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    /// Serialized record, if any.
    record: RwLock<Option<String>>,
    /// When set, every save fails with a storage error.
    fail_writes: AtomicBool,
    /// Number of successful saves.
    saves: AtomicUsize,
}

impl MemoryProgressStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding raw stored text.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            record: RwLock::new(Some(raw.into())),
            ..Self::default()
        }
    }

    /// Make subsequent saves fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Raw stored text.
    pub fn raw(&self) -> Option<String> {
        self.record.read().unwrap().clone()
    }
}

impl ProgressStorage for MemoryProgressStore {
    fn load(&self) -> Result<Option<Progress>> {
        let record = self.record.read().unwrap();
        match record.as_deref() {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, progress: &Progress) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StrideError::storage(
                "memory",
                io::Error::new(io::ErrorKind::Other, "simulated write failure"),
            ));
        }
        let json = serde_json::to_string(progress)?;
        *self.record.write().unwrap() = Some(json);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.record.write().unwrap() = None;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Curriculum;
    use crate::storage::traits::tests::test_progress_storage_roundtrip;
    use chrono::NaiveDate;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryProgressStore::new();
        test_progress_storage_roundtrip(&store);
    }

    #[test]
    fn test_corrupt_record_is_error() {
        let store = MemoryProgressStore::with_raw("[1, 2, 3]");
        assert!(store.load().is_err());
    }

    #[test]
    fn test_fail_writes() {
        let store = MemoryProgressStore::new();
        let progress = Progress::new(
            NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
            &Curriculum::default(),
        );

        store.set_fail_writes(true);
        assert!(store.save(&progress).is_err());
        assert_eq!(store.save_count(), 0);
        assert!(store.raw().is_none());

        store.set_fail_writes(false);
        store.save(&progress).unwrap();
        assert_eq!(store.save_count(), 1);
    }
}
