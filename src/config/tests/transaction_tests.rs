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


use std::fs;
use tempfile::TempDir;

use crate::config::{KeymapFile, KeymapTransaction, StorageError};

// ============================================================================
// KeymapTransaction Tests
// ============================================================================

#[test]
fn test_transaction_basic_flow() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("keymap.ini");
    let original_content = "[MAIN]\nsave = CTRL+S\n";
    fs::write(&path, original_content).unwrap();

    let file = KeymapFile::new(&path).with_backups().unwrap();
    let tx = KeymapTransaction::begin(&file).unwrap();

    let backup_path = tx.backup_path().unwrap().to_path_buf();
    assert_eq!(fs::read_to_string(&backup_path).unwrap(), original_content);

    let new_content = "[MAIN]\nsave = F2\n";
    tx.commit(new_content).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), new_content);
    // Backup survives the commit
    assert_eq!(fs::read_to_string(&backup_path).unwrap(), original_content);
}

#[test]
fn test_transaction_rollback() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("keymap.ini");
    let original_content = "[MAIN]\nsave = CTRL+S\n";
    fs::write(&path, original_content).unwrap();

    let file = KeymapFile::new(&path).with_backups().unwrap();
    let tx = file.begin_transaction().unwrap();

    // Something else clobbers the file
    fs::write(&path, "garbage").unwrap();

    tx.rollback().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), original_content);

    // Rollback can be repeated
    tx.rollback().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), original_content);
}

#[test]
fn test_rollback_without_backup() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("keymap.ini");
    fs::write(&path, "[MAIN]\n").unwrap();

    let file = KeymapFile::new(&path);
    let tx = KeymapTransaction::begin(&file).unwrap();

    assert!(tx.backup_path().is_none());
    assert!(matches!(tx.rollback(), Err(StorageError::BackupFailed(_))));
}

#[test]
fn test_commit_into_missing_directory_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("gone").join("keymap.ini");

    let file = KeymapFile::new(&path);
    let tx = KeymapTransaction::begin(&file).unwrap();

    assert!(matches!(
        tx.commit("[MAIN]\n"),
        Err(StorageError::WriteFailed(_))
    ));
    assert!(!path.exists());
}
