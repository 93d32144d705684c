//! Lock file
//!
//! Reads, writes and removes `store.lock`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

use super::LockRecord;

/// Name of the lock file inside the store directory
pub const LOCK_FILENAME: &str = "store.lock";

/// Operation id used while a poll reloads the snapshot
pub const INIT_OPERATION_ID: &str = "init";

/// Handle on a directory's lock file, tagged with the owning store's name
#[derive(Debug, Clone)]
pub struct LockFile {
    path: PathBuf,
    owner_name: String,
}

impl LockFile {
    pub fn new(dir: &Path, owner_name: impl Into<String>) -> Self {
        Self {
            path: dir.join(LOCK_FILENAME),
            owner_name: owner_name.into(),
        }
    }

    /// True iff no lock file exists
    pub fn can_execute(&self) -> bool {
        !self.path.exists()
    }

    /// Write a record for `operation_id`
    ///
    /// Does not check for an existing lock; callers test `can_execute()`
    /// first and accept the window between the two calls.
    pub fn acquire(&self, operation_id: &str) -> Result<()> {
        let record = LockRecord::for_current_process(self.owner_name.as_str(), operation_id);
        let json = serde_json::to_vec(&record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Remove the lock file; a missing file counts as released
    pub fn release(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove lock file"
                );
            }
        }
    }

    /// Parse the current lock record
    ///
    /// Fails with `StoreError::LockRecord` when the file is gone or does not
    /// hold a record.
    pub fn read_record(&self) -> Result<LockRecord> {
        let bytes = fs::read(&self.path)
            .map_err(|e| StoreError::LockRecord(format!("{}: {}", self.path.display(), e)))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::LockRecord(format!("{}: {}", self.path.display(), e)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }
}
