//! Config module tests
//!
//! Contains test suites for keymap file handling:
//! - INI parsing and writing
//! - Case-insensitive document access
//! - Loading, saving and backups
//! - Atomic transactions and rollback

#[cfg(test)]
mod transaction_tests;
