//! Keymap file management with atomic writes and backup support.
//!
//! Keymaps persist as INI files, one section per view:
//!
//! ```ini
//! [EDITOR]
//! SAVE = CTRL+S
//! COPY = CTRL+C/CTRL+INSERT
//! ```
//!
//! - **Case-insensitive store**: [`KeymapDocument`] looks sections and keys up
//!   regardless of case
//! - **Atomic writes**: every save goes through a [`KeymapTransaction`]
//!   (temp-file-then-rename)
//! - **Optional backups**: a timestamped copy of the previous file is kept in a
//!   sibling `backups/` directory
//!
//! # Example
//!
//! ```no_run
//! use accel_keymap::config::KeymapFile;
//!
//! let file = KeymapFile::new("/home/user/.config/app/keymap.ini").with_backups()?;
//! let mut doc = file.load()?;
//! doc.set("EDITOR", "SAVE", "CTRL+S");
//! file.save(&doc)?;
//! # Ok::<(), accel_keymap::config::StorageError>(())
//! ```

pub mod document;
pub mod error;
pub mod parser;
pub mod transaction;

use chrono::Local;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

pub use document::{KeymapDocument, Section};
pub use error::StorageError;
pub use parser::ParseError;
pub use transaction::KeymapTransaction;

/// A keymap file on disk.
///
/// Loading never touches the file; saving writes atomically and, when
/// backups are enabled, snapshots the previous content first.
#[derive(Clone, Debug)]
pub struct KeymapFile {
    path: PathBuf,
    backup_dir: Option<PathBuf>,
}

impl KeymapFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup_dir: None,
        }
    }

    /// Enables timestamped backups in a `backups/` directory next to the file.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::BackupDirNotWritable` if the directory cannot
    /// be created or is read-only.
    pub fn with_backups(mut self) -> Result<Self, StorageError> {
        // e.g. ~/.config/app/keymap.ini -> ~/.config/app/backups/
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            Some(_) => PathBuf::from("."),
            None => {
                return Err(StorageError::BackupDirNotWritable(self.path.clone()));
            }
        };
        let backup_dir = parent.join("backups");

        if !backup_dir.exists() {
            fs::create_dir_all(&backup_dir)
                .map_err(|_| StorageError::BackupDirNotWritable(backup_dir.clone()))?;
        }

        if backup_dir.metadata()?.permissions().readonly() {
            return Err(StorageError::BackupDirNotWritable(backup_dir));
        }

        self.backup_dir = Some(backup_dir);
        Ok(self)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_dir(&self) -> Option<&Path> {
        self.backup_dir.as_deref()
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Reads the raw file content.
    pub fn read(&self) -> Result<String, StorageError> {
        if !self.path.exists() {
            return Err(StorageError::NotFound(self.path.clone()));
        }

        if self.path.read_link().is_ok() {
            warn!(path = %self.path.display(), "keymap file is a symlink");
        }

        fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(self.path.clone()),
            ErrorKind::InvalidData => StorageError::ParseFailed {
                path: self.path.clone(),
                reason: "file is not valid UTF-8".to_string(),
            },
            _ => StorageError::Io(e),
        })
    }

    /// Reads and parses the file.
    ///
    /// # Errors
    ///
    /// `NotFound` when the file is missing, `ParseFailed` when it is not a
    /// well-formed keymap document.
    pub fn load(&self) -> Result<KeymapDocument, StorageError> {
        let content = self.read()?;
        KeymapDocument::parse(&content).map_err(|e| StorageError::parse_failed(&self.path, &e))
    }

    /// Like [`load`](Self::load) but treats a missing file as empty.
    pub fn load_or_default(&self) -> Result<KeymapDocument, StorageError> {
        match self.load() {
            Err(StorageError::NotFound(_)) => Ok(KeymapDocument::new()),
            other => other,
        }
    }

    pub fn begin_transaction(&self) -> Result<KeymapTransaction<'_>, StorageError> {
        KeymapTransaction::begin(self)
    }

    /// Writes the document atomically, returning the backup path if one was made.
    pub fn save(&self, document: &KeymapDocument) -> Result<Option<PathBuf>, StorageError> {
        let transaction = self.begin_transaction()?;
        let backup = transaction.backup_path().map(Path::to_path_buf);
        transaction.commit(&document.to_ini_string())?;
        Ok(backup)
    }

    /// Copies the current file into the backup directory.
    ///
    /// Returns `None` when backups are disabled or there is nothing to copy.
    pub(crate) fn create_timestamped_backup(&self) -> Result<Option<PathBuf>, StorageError> {
        let Some(backup_dir) = &self.backup_dir else {
            return Ok(None);
        };
        if !self.path.is_file() {
            return Ok(None);
        }

        let content = fs::read(&self.path)?;

        // YYYY-MM-DD_HHMMSS
        let timestamp = Local::now().format("%Y-%m-%d_%H%M%S");

        let original_name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                StorageError::BackupFailed(format!(
                    "cannot derive a backup name from {}",
                    self.path.display()
                ))
            })?;

        let backup_path = backup_dir.join(format!("{}.{}", original_name, timestamp));
        fs::write(&backup_path, content)
            .map_err(|e| StorageError::BackupFailed(format!("{}: {}", backup_path.display(), e)))?;

        Ok(Some(backup_path))
    }
}

#[cfg(test)]
mod tests;
