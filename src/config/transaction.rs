// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Keymap write transactions with automatic backups
//!
//! Writes go to a temporary file that is renamed over the target, so a
//! keymap file is never observed half-written.

use atomic_write_file::AtomicWriteFile;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::config::{KeymapFile, StorageError};

/// Atomic keymap write with an optional rollback point.
///
/// # Lifecycle
///
/// 1. `begin()` - snapshots the current file when backups are enabled
/// 2. Caller renders the new content
/// 3. `commit()` - writes atomically, or `rollback()` - restores the snapshot
///
/// # Example
///
/// ```no_run
/// use accel_keymap::config::{KeymapFile, KeymapTransaction};
///
/// let file = KeymapFile::new("keymap.ini").with_backups()?;
/// let tx = KeymapTransaction::begin(&file)?;
/// tx.commit("[EDITOR]\nSAVE = CTRL+S\n")?;
/// # Ok::<(), accel_keymap::config::StorageError>(())
/// ```
pub struct KeymapTransaction<'a> {
    file: &'a KeymapFile,
    backup_path: Option<PathBuf>,
}

impl<'a> KeymapTransaction<'a> {
    /// Begins a transaction, creating the backup immediately.
    ///
    /// # Errors
    ///
    /// Fails if the backup cannot be written; nothing has been modified then.
    pub fn begin(file: &'a KeymapFile) -> Result<Self, StorageError> {
        let backup_path = file.create_timestamped_backup()?;
        if let Some(path) = &backup_path {
            debug!(backup = %path.display(), "keymap backup created");
        }

        Ok(Self { file, backup_path })
    }

    pub fn backup_path(&self) -> Option<&Path> {
        self.backup_path.as_deref()
    }

    /// Atomically replaces the file content.
    ///
    /// Consumes the transaction. On failure the original file is untouched
    /// and the backup, if any, is kept.
    pub fn commit(self, new_content: &str) -> Result<(), StorageError> {
        write_atomic(self.file.path(), new_content)
    }

    /// Restores the content captured by `begin()`.
    ///
    /// # Errors
    ///
    /// `BackupFailed` when no backup was taken (backups disabled or the file
    /// did not exist yet).
    pub fn rollback(&self) -> Result<(), StorageError> {
        let Some(backup_path) = &self.backup_path else {
            return Err(StorageError::BackupFailed(
                "No backup available for rollback".to_string(),
            ));
        };

        let backup_content = fs::read_to_string(backup_path)?;
        write_atomic(self.file.path(), &backup_content)
    }
}

fn write_atomic(path: &Path, content: &str) -> Result<(), StorageError> {
    let mut file = AtomicWriteFile::options().open(path).map_err(|e| {
        StorageError::WriteFailed(format!("Failed to open for atomic write: {}", e))
    })?;

    file.write_all(content.as_bytes())
        .map_err(|e| StorageError::WriteFailed(format!("Failed to write content: {}", e)))?;

    file.commit()
        .map_err(|e| StorageError::WriteFailed(format!("Failed to commit atomic write: {}", e)))?;

    Ok(())
}
