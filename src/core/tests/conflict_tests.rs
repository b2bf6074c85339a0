use crate::core::catalog::code_of;
use crate::core::conflict::{ConflictPolicy, DenyAll, PermitAll, PermitRefs};
use crate::core::types::{AcceleratorEntry, CommandRef, ModifierFlags};
use crate::logging::Logger;

/// Helper to create colliding entries on CTRL+P
fn candidates(names: &[&str]) -> Vec<AcceleratorEntry> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            AcceleratorEntry::new(
                ModifierFlags::CTRL,
                code_of("P").unwrap(),
                CommandRef(5000 + i as u32),
                name,
            )
        })
        .collect()
}

#[test]
fn test_permit_all_and_deny_all() {
    let log = Logger::default();
    let entries = candidates(&["print", "preview"]);

    assert!(PermitAll.permit(&entries, &log));
    assert!(!DenyAll.permit(&entries, &log));
}

#[test]
fn test_permit_refs_requires_every_candidate() {
    let log = Logger::default();
    let policy = PermitRefs::new(["play", "Pause"]);

    assert!(policy.permit(&candidates(&["play", "pause"]), &log));
    assert!(!policy.permit(&candidates(&["play", "print"]), &log));
}

#[test]
fn test_closure_policy() {
    let log = Logger::default();
    let policy = |entries: &[AcceleratorEntry], _: &Logger| entries.len() <= 2;

    assert!(policy.permit(&candidates(&["a", "b"]), &log));
    assert!(!policy.permit(&candidates(&["a", "b", "c"]), &log));
}
