//! Window boundary tests
//!
//! Covers table construction and the headless window's dispatch.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::catalog::code_of;
use crate::core::types::{AcceleratorEntry, CommandRef, ModifierFlags};
use crate::window::{Accelerator, AcceleratorTable, AcceleratorWindow, HeadlessWindow};

fn entry(flags: ModifierFlags, key: &str, command: u32) -> AcceleratorEntry {
    AcceleratorEntry::new(flags, code_of(key).unwrap(), CommandRef(command), "cmd")
}

#[test]
fn test_table_from_entries() {
    let entries = vec![
        entry(ModifierFlags::CTRL, "S", 5000),
        entry(ModifierFlags::empty(), "F5", 5001),
    ];

    let table = AcceleratorTable::from_entries(&entries);

    assert_eq!(table.len(), 2);
    assert_eq!(
        table.iter().next(),
        Some(&Accelerator {
            flags: ModifierFlags::CTRL,
            code: code_of("S").unwrap(),
            command: CommandRef(5000),
        })
    );
    assert_eq!(
        table.lookup(ModifierFlags::empty(), code_of("F5").unwrap()),
        Some(CommandRef(5001))
    );
    assert_eq!(table.lookup(ModifierFlags::SHIFT, code_of("F5").unwrap()), None);
}

#[test]
fn test_accelerator_trigger() {
    let accelerator = Accelerator::from(&entry(ModifierFlags::ALT | ModifierFlags::SHIFT, "X", 5000));

    assert_eq!(accelerator.trigger().to_string(), "ALT+SHIFT+X");
}

#[test]
fn test_headless_window_without_table() {
    let mut window = HeadlessWindow::new();

    assert!(window.table().is_empty());
    assert!(!window.has_handler());
    assert_eq!(window.press(ModifierFlags::CTRL, code_of("S").unwrap()), None);
}

#[test]
fn test_headless_window_dispatch() {
    let fired = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&fired);

    let mut window = HeadlessWindow::new();
    window.bind_menu_command(Box::new(move |command: CommandRef| sink.borrow_mut().push(command)));
    window.set_accelerator_table(AcceleratorTable::from_entries(&[entry(
        ModifierFlags::CTRL,
        "Q",
        5003,
    )]));

    assert_eq!(
        window.press(ModifierFlags::CTRL, code_of("Q").unwrap()),
        Some(CommandRef(5003))
    );
    assert_eq!(window.press(ModifierFlags::CTRL, code_of("W").unwrap()), None);
    assert_eq!(*fired.borrow(), vec![CommandRef(5003)]);
}

#[test]
fn test_table_serialises() {
    let table = AcceleratorTable::from_entries(&[entry(ModifierFlags::CTRL, "S", 5000)]);

    let json = serde_json::to_string(&table).unwrap();
    let back: AcceleratorTable = serde_json::from_str(&json).unwrap();

    assert_eq!(back, table);
}
