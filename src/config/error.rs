use std::path::PathBuf;
use thiserror::Error;

use crate::config::parser::ParseError;

/// Errors raised while loading or saving keymap files.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Keymap file does not exist.
    #[error("Keymap file not found: {0}")]
    NotFound(PathBuf),
    /// Keymap file exists but could not be read as UTF-8 INI text.
    #[error("Cannot parse {path}: {reason}")]
    ParseFailed { path: PathBuf, reason: String },
    /// Generic save failure reported by the registry; details are logged.
    #[error("Cannot write keymap file: {0}")]
    AccessDenied(PathBuf),
    /// Backup directory cannot be created or written to.
    #[error("Backup directory not writable: {0}")]
    BackupDirNotWritable(PathBuf),
    /// Failed to create backup file.
    #[error("Failed to create backup: {0}")]
    BackupFailed(String),
    /// Atomic write operation failed.
    #[error("Atomic write failed: {0}")]
    WriteFailed(String),
    /// Generic I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub(crate) fn parse_failed(path: impl Into<PathBuf>, source: &ParseError) -> Self {
        Self::ParseFailed {
            path: path.into(),
            reason: source.to_string(),
        }
    }
}
