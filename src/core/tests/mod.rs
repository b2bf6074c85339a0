//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Key catalogue lookups
//! - Filter policy and reserved patterns
//! - Entry construction
//! - Conflict policies
//! - Registry ingestion, merging and persistence
//! - Value types (flags, triggers, entries)

#[cfg(test)]
mod conflict_tests;
#[cfg(test)]
mod registry_tests;
