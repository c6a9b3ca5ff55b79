//! File-based progress storage for Stride.
//!
//! The record is stored as `<dir>/progress.json`. Writes go to a temp file
//! that is then renamed over the record, so readers never see a partial write.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::stride_home;
use crate::core::Progress;
use crate::error::{Result, StrideError};
use crate::storage::traits::PROGRESS_KEY;
use crate::storage::ProgressStorage;
use crate::util::read_to_string_limited;

/// File-based progress storage.
#[derive(Debug, Clone)]
pub struct FileProgressStore {
    /// Directory holding the record.
    dir: PathBuf,
}

impl FileProgressStore {
    /// Create a store in the default data directory.
    ///
    /// Uses `~/.stride/` or `$STRIDE_HOME/`.
    pub fn new() -> Result<Self> {
        let dir = stride_home().ok_or_else(|| {
            StrideError::config("Could not determine data directory (no home directory)")
        })?;
        Self::with_dir(dir)
    }

    /// Create a store in a custom directory, creating it if needed.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();

        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| StrideError::storage(&dir, e))?;
        }

        Ok(Self { dir })
    }

    /// Path of the stored record.
    pub fn record_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", PROGRESS_KEY))
    }

    /// Path of the temp file used during atomic writes.
    fn temp_path(&self) -> PathBuf {
        self.dir.join(format!(".{}.json.tmp", PROGRESS_KEY))
    }

    /// Directory holding the record.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn atomic_write(&self, progress: &Progress) -> Result<()> {
        let final_path = self.record_path();
        let temp_path = self.temp_path();

        let json = serde_json::to_string_pretty(progress)?;

        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| StrideError::storage(&temp_path, e))?;
            file.write_all(json.as_bytes())
                .map_err(|e| StrideError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| StrideError::storage(&temp_path, e))?;
        }

        // Rename is atomic on POSIX
        fs::rename(&temp_path, &final_path).map_err(|e| StrideError::storage(&final_path, e))?;

        Ok(())
    }
}

impl ProgressStorage for FileProgressStore {
    fn load(&self) -> Result<Option<Progress>> {
        let path = self.record_path();

        if !path.exists() {
            return Ok(None);
        }

        let content = read_to_string_limited(&path)?;
        let progress: Progress = serde_json::from_str(&content)?;

        Ok(Some(progress))
    }

    fn save(&self, progress: &Progress) -> Result<()> {
        self.atomic_write(progress)
    }

    fn clear(&self) -> Result<()> {
        let path = self.record_path();

        if path.exists() {
            fs::remove_file(&path).map_err(|e| StrideError::storage(&path, e))?;
        }

        let temp_path = self.temp_path();
        if temp_path.exists() {
            let _ = fs::remove_file(&temp_path);
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Curriculum;
    use crate::storage::traits::tests::test_progress_storage_roundtrip;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_store() -> (FileProgressStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = FileProgressStore::with_dir(dir.path()).unwrap();
        (store, dir)
    }

    fn sample() -> Progress {
        Progress::new(
            NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
            &Curriculum::default(),
        )
    }

    #[test]
    fn test_file_store_roundtrip() {
        let (store, _dir) = create_test_store();
        test_progress_storage_roundtrip(&store);
    }

    #[test]
    fn test_with_dir_creates_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested").join("stride");
        assert!(!nested.exists());

        let _store = FileProgressStore::with_dir(&nested).unwrap();

        assert!(nested.is_dir());
    }

    #[test]
    fn test_record_path() {
        let (store, _dir) = create_test_store();
        assert!(store.record_path().ends_with("progress.json"));
    }

    #[test]
    fn test_load_invalid_json_is_error() {
        let (store, _dir) = create_test_store();
        fs::write(store.record_path(), "{ not json").unwrap();

        let result = store.load();
        assert!(matches!(result, Err(StrideError::Serde { .. })));
    }

    #[test]
    fn test_saved_file_is_camel_case_json() {
        let (store, _dir) = create_test_store();
        store.save(&sample()).unwrap();

        let content = fs::read_to_string(store.record_path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["streak"], 1);
        assert_eq!(value["lastLoginDate"], "2026-02-02");
    }

    #[test]
    fn test_temp_file_cleaned_up() {
        let (store, _dir) = create_test_store();
        store.save(&sample()).unwrap();
        assert!(!store.temp_path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let store = FileProgressStore::with_dir(dir.path().join("gone")).unwrap();
        fs::remove_dir_all(store.dir()).unwrap();

        let result = store.save(&sample());
        assert!(matches!(result, Err(StrideError::Storage { .. })));
    }
}
