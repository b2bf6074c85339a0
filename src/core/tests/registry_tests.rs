use std::cell::RefCell;
use std::fs;
use std::rc::Rc;
use tempfile::TempDir;

use crate::config::{KeymapDocument, StorageError};
use crate::core::catalog::code_of;
use crate::core::conflict::{PermitAll, PermitRefs};
use crate::core::filter::KeyFilter;
use crate::core::refs::RefAllocator;
use crate::core::registry::KeymapRegistry;
use crate::core::types::{AcceleratorEntry, CommandRef, ModifierFlags};
use crate::logging::Logger;
use crate::window::HeadlessWindow;

/// Registry with the text-view policy and no conflict policy
fn filtered_registry() -> KeymapRegistry {
    KeymapRegistry::new(RefAllocator::shared())
        .with_filter(KeyFilter::with_defaults(true, false, false))
}

fn command_of(registry: &KeymapRegistry, reference: &str) -> CommandRef {
    registry.refs().borrow().lookup(reference).unwrap()
}

// ============================================================================
// Add
// ============================================================================

#[test]
fn test_add_and_key_string() {
    let mut registry = filtered_registry();

    registry.add("main", "save", "CTRL+S");

    assert_eq!(registry.key_string("main", "save"), Some("CTRL+S"));
    assert_eq!(registry.entries("main").len(), 1);
    assert!(registry.take_errors("main").is_empty());
}

#[test]
fn test_names_are_case_insensitive() {
    let mut registry = filtered_registry();

    registry.add("Main", "Save", "ctrl+s");

    assert_eq!(registry.key_string("MAIN", "SAVE"), Some("CTRL+S"));
    assert_eq!(registry.key_string("main", "save"), Some("CTRL+S"));
    assert_eq!(registry.entries("mAiN").len(), 1);
    assert_eq!(registry.entries("MAIN")[0].ref_name(), "SAVE");
    assert_eq!(registry.views().collect::<Vec<_>>(), vec!["MAIN"]);
}

#[test]
fn test_alternatives() {
    let mut registry = KeymapRegistry::new(RefAllocator::shared());

    registry.add("main", "copy", "CTRL+C/CTRL+INSERT");

    let entries = registry.entries("main");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].command(), entries[1].command());
    assert_eq!(registry.key_string("main", "copy"), Some("CTRL+C/CTRL+INSERT"));
}

#[test]
fn test_rejected_alternative_is_recorded() {
    let mut registry = filtered_registry();

    registry.add("main", "save", "CTRL+S/CTRL+C");

    assert_eq!(registry.entries("main").len(), 1);
    assert_eq!(registry.key_string("main", "save"), Some("CTRL+S"));

    let errors = registry.take_errors("main");
    assert_eq!(errors.get("SAVE").map(String::as_str), Some("CTRL+S/CTRL+C"));

    // Errors are cleared on read
    assert!(registry.take_errors("main").is_empty());
}

#[test]
fn test_errors_are_per_view() {
    let mut registry = filtered_registry();

    registry.add("main", "copy", "CTRL+C");
    registry.add("viewer", "copy", "CTRL+SHIFT+C");

    assert!(registry.take_errors("viewer").is_empty());
    assert_eq!(registry.take_errors("main").len(), 1);
}

#[test]
fn test_fully_rejected_binding_creates_view_only() {
    let mut registry = filtered_registry();

    registry.add("main", "undo", "CTRL+Z");

    assert!(registry.entries("main").is_empty());
    assert_eq!(registry.key_string("main", "undo"), None);
    assert_eq!(registry.views().collect::<Vec<_>>(), vec!["MAIN"]);
}

#[test]
fn test_unknown_view_is_empty() {
    let registry = filtered_registry();

    assert!(registry.entries("nowhere").is_empty());
    assert!(registry.table("nowhere").is_empty());
    assert_eq!(registry.key_string("nowhere", "save"), None);
}

#[test]
fn test_key_string_falls_back_to_other_views() {
    let mut registry = filtered_registry();

    registry.add("main", "save", "CTRL+S");
    registry.add("viewer", "save", "CTRL+SHIFT+S");

    assert_eq!(registry.key_string("viewer", "save"), Some("CTRL+SHIFT+S"));
    assert_eq!(registry.key_string("settings", "save"), Some("CTRL+S"));
    assert_eq!(registry.key_string("settings", "open"), None);
}

#[test]
fn test_filter_mut_applies_to_later_adds() {
    let mut registry = filtered_registry();

    registry
        .filter_mut()
        .unwrap()
        .add_disabled_pattern("CTRL+K")
        .unwrap();
    registry.add("main", "kill", "CTRL+K");

    assert!(registry.entries("main").is_empty());
    assert_eq!(registry.take_errors("main").len(), 1);
}

#[test]
fn test_shared_allocator() {
    let refs = RefAllocator::shared();
    let mut main = KeymapRegistry::new(refs.clone());
    let mut viewer = KeymapRegistry::new(refs.clone());

    main.add("main", "save", "CTRL+S");
    viewer.add("viewer", "save", "F2");

    assert_eq!(
        main.entries("main")[0].command(),
        viewer.entries("viewer")[0].command()
    );
    assert_eq!(refs.borrow().len(), 1);
}

// ============================================================================
// Conflicts
// ============================================================================

#[test]
fn test_conflict_without_policy() {
    let mut registry = filtered_registry();

    registry.add("main", "save", "CTRL+S");
    registry.add("main", "store", "CTRL+S");

    let entries = registry.entries("main");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].command(), command_of(&registry, "save"));

    let errors = registry.take_errors("main");
    assert_eq!(errors.get("STORE").map(String::as_str), Some("CTRL+S"));
    assert_eq!(registry.key_string("main", "store"), None);
}

#[test]
fn test_same_trigger_in_other_view_is_no_conflict() {
    let mut registry = filtered_registry();

    registry.add("main", "save", "CTRL+S");
    registry.add("viewer", "store", "CTRL+S");

    assert_eq!(registry.entries("main").len(), 1);
    assert_eq!(registry.entries("viewer").len(), 1);
    assert!(registry.take_errors("viewer").is_empty());
}

#[test]
fn test_conflict_merged_by_policy() {
    let mut registry = filtered_registry().with_conflict_policy(PermitAll);

    registry.add("main", "save", "CTRL+S");
    registry.add("main", "store", "CTRL+S");

    let save = command_of(&registry, "save");
    let store = command_of(&registry, "store");

    let entries = registry.entries("main");
    assert_eq!(entries.len(), 1);

    let merged = entries[0].command();
    assert!(registry.is_redirected(merged));
    assert!(!registry.is_redirected(save));
    assert_eq!(entries[0].ref_name(), "KEYMAP_MAIN_CTRL+S");
    assert_eq!(
        registry.refs().borrow().name_of(merged),
        Some("KEYMAP_MAIN_CTRL+S")
    );

    assert_eq!(registry.original_refs(merged), vec![save, store]);
    assert_eq!(registry.resolve_command(merged), vec![save, store]);
    assert_eq!(registry.resolve_command(save), vec![save]);
    assert!(registry.original_refs(save).is_empty());

    assert_eq!(registry.key_string("main", "save"), Some("CTRL+S"));
    assert_eq!(registry.key_string("main", "store"), Some("CTRL+S"));
    assert!(registry.take_errors("main").is_empty());
}

#[test]
fn test_third_collision_extends_merge() {
    let mut registry = filtered_registry().with_conflict_policy(PermitAll);

    registry.add("main", "print", "CTRL+P");
    registry.add("main", "preview", "CTRL+P");
    registry.add("main", "publish", "ctrl+p");

    let entries = registry.entries("main");
    assert_eq!(entries.len(), 1);

    let expected = ["print", "preview", "publish"]
        .iter()
        .map(|name| command_of(&registry, name))
        .collect::<Vec<_>>();
    assert_eq!(registry.original_refs(entries[0].command()), expected);
}

#[test]
fn test_merges_are_scoped_per_view() {
    let mut registry = filtered_registry().with_conflict_policy(PermitAll);

    registry.add("main", "a", "CTRL+P");
    registry.add("main", "b", "CTRL+P");
    registry.add("viewer", "c", "CTRL+P");
    registry.add("viewer", "d", "CTRL+P");

    let main = registry.entries("main")[0].command();
    let viewer = registry.entries("viewer")[0].command();
    assert_ne!(main, viewer);
    assert_eq!(registry.original_refs(main).len(), 2);
    assert_eq!(registry.original_refs(viewer).len(), 2);
}

#[test]
fn test_merged_entry_keeps_position() {
    let mut registry = filtered_registry().with_conflict_policy(PermitAll);

    registry.add("main", "open", "CTRL+O");
    registry.add("main", "save", "CTRL+S");
    registry.add("main", "quit", "CTRL+Q");
    registry.add("main", "store", "CTRL+S");

    let raw = registry
        .entries("main")
        .iter()
        .map(AcceleratorEntry::to_raw_string)
        .collect::<Vec<_>>();
    assert_eq!(raw, vec!["CTRL+O", "CTRL+S", "CTRL+Q"]);
}

#[test]
fn test_rebinding_same_command_is_a_conflict() {
    let mut registry = filtered_registry();

    registry.add("view", "save", "ctrl+s");
    registry.add("VIEW", "SAVE", "CTRL+S");

    assert_eq!(registry.entries("view").len(), 1);
    assert_eq!(registry.key_string("view", "save"), Some("CTRL+S"));

    let errors = registry.take_errors("view");
    assert_eq!(errors.get("SAVE").map(String::as_str), Some("CTRL+S"));
}

#[test]
fn test_errors_keep_uppercased_key_string() {
    let mut registry = filtered_registry();

    registry.add("main", "copy", "Ctrl+c");

    let errors = registry.take_errors("main");
    assert_eq!(errors.get("COPY").map(String::as_str), Some("CTRL+C"));
}

#[test]
fn test_policy_sees_candidates_in_order() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let recorder = Rc::clone(&seen);

    let mut registry = filtered_registry().with_conflict_policy(
        move |candidates: &[AcceleratorEntry], _: &Logger| {
            recorder.borrow_mut().push(
                candidates
                    .iter()
                    .map(|c| c.ref_name().to_string())
                    .collect::<Vec<_>>(),
            );
            true
        },
    );

    registry.add("main", "a", "F5");
    registry.add("main", "b", "F5");
    registry.add("main", "c", "F5");

    assert_eq!(
        *seen.borrow(),
        vec![
            vec!["A".to_string(), "B".to_string()],
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
        ]
    );
}

#[test]
fn test_selective_policy() {
    let mut registry = filtered_registry().with_conflict_policy(PermitRefs::new(["play", "pause"]));

    registry.add("player", "play", "CTRL+SHIFT+SPACE");
    registry.add("player", "pause", "CTRL+SHIFT+SPACE");
    registry.add("player", "stop", "CTRL+SHIFT+SPACE");

    let entries = registry.entries("player");
    assert_eq!(entries.len(), 1);
    assert_eq!(registry.original_refs(entries[0].command()).len(), 2);
    assert!(registry.take_errors("player").contains_key("STOP"));
}

// ============================================================================
// Documents and files
// ============================================================================

fn sample_document() -> KeymapDocument {
    KeymapDocument::from_sections([
        ("Main", vec![("save", "CTRL+S"), ("open", "CTRL+O"), ("blank", "")]),
        ("Global_Hotkeys", vec![("show", "CTRL+ALT+K")]),
        ("Viewer", vec![("next", "SHIFT+PAGEDOWN/CTRL+N")]),
    ])
}

#[test]
fn test_add_from_document_skips_hotkey_sections() {
    let mut registry = filtered_registry();

    registry.add_from_document(&sample_document(), None);

    assert_eq!(registry.views().collect::<Vec<_>>(), vec!["MAIN", "VIEWER"]);
    assert_eq!(registry.entries("main").len(), 2);
    assert_eq!(registry.key_string("main", "blank"), None);
    assert!(registry.take_errors("main").is_empty());
    assert!(registry.entries("global_hotkeys").is_empty());
}

#[test]
fn test_add_from_document_selected_sections() {
    let mut registry = filtered_registry();

    registry.add_from_document(&sample_document(), Some(&["global_hotkeys", "VIEWER"]));

    assert_eq!(
        registry.views().collect::<Vec<_>>(),
        vec!["GLOBAL_HOTKEYS", "VIEWER"]
    );
    assert_eq!(registry.key_string("global_hotkeys", "show"), Some("CTRL+ALT+K"));
    assert_eq!(registry.key_string("viewer", "next"), Some("SHIFT+PAGEDOWN/CTRL+N"));
}

#[test]
fn test_add_from_document_empty_selection_reads_defaults() {
    let mut registry = filtered_registry();

    let nothing: &[&str] = &[];
    registry.add_from_document(&sample_document(), Some(nothing));

    assert_eq!(registry.views().collect::<Vec<_>>(), vec!["MAIN", "VIEWER"]);
    assert!(registry.entries("global_hotkeys").is_empty());
}

#[test]
fn test_add_from_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing.ini");
    let mut registry = filtered_registry();

    let result = registry.add_from_file(&path, None);

    assert!(matches!(result, Err(StorageError::NotFound(p)) if p == path));
    assert_eq!(registry.views().count(), 0);
}

#[test]
fn test_add_from_malformed_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.ini");
    fs::write(&path, "save = CTRL+S\n").unwrap();

    let mut registry = filtered_registry();
    registry.add("main", "open", "CTRL+O");

    let result = registry.add_from_file(&path, None);

    assert!(matches!(result, Err(StorageError::ParseFailed { .. })));
    // Existing bindings survive a failed load
    assert_eq!(registry.key_string("main", "open"), Some("CTRL+O"));
}

#[test]
fn test_save_and_reload_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("keymap.ini");
    fs::write(
        &path,
        "[Unrelated]\nfoo = bar\n\n[MAIN]\nstale = F9\n",
    )
    .unwrap();

    let mut registry = filtered_registry().with_conflict_policy(PermitAll);
    registry.add("main", "save", "CTRL+S/F2");
    registry.add("main", "store", "CTRL+S");
    registry.add("viewer", "next", "CTRL+N");
    registry.save_to_file(&path).unwrap();

    let document = KeymapDocument::parse(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(document.get("unrelated", "foo"), Some("bar"));
    assert_eq!(document.get("main", "stale"), None);

    let mut reloaded = filtered_registry();
    reloaded.add_from_file(&path, None).unwrap();

    assert_eq!(reloaded.key_string("main", "save"), Some("CTRL+S/F2"));
    assert_eq!(reloaded.key_string("viewer", "next"), Some("CTRL+N"));
    // Without a policy the merged binding collides again on reload
    assert_eq!(reloaded.key_string("main", "store"), None);
    assert_eq!(reloaded.take_errors("main").len(), 1);
    // The unrelated section is loaded as a view too
    assert_eq!(reloaded.key_string("unrelated", "foo"), None);
}

#[test]
fn test_save_replaces_unparseable_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("keymap.ini");
    fs::write(&path, "garbage line without section\n").unwrap();

    let mut registry = filtered_registry();
    registry.add("main", "save", "CTRL+S");

    registry.save_to_file(&path).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "[MAIN]\nSAVE = CTRL+S\n");
}

#[test]
fn test_save_clears_fully_rejected_view() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("keymap.ini");
    fs::write(&path, "[MAIN]\nbad = Q\n\n[Other]\nkeep = F1\n").unwrap();

    let mut registry = filtered_registry();
    registry.add_from_file(&path, Some(&["main"])).unwrap();
    assert_eq!(
        registry.take_errors("main").get("BAD").map(String::as_str),
        Some("Q")
    );

    registry.save_to_file(&path).unwrap();

    let document = KeymapDocument::parse(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(document.get("main", "bad"), None);
    assert!(document.section("main").unwrap().is_empty());
    assert_eq!(document.get("other", "keep"), Some("F1"));
}

#[test]
fn test_save_to_unwritable_location() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("no_such_dir").join("keymap.ini");

    let mut registry = filtered_registry();
    registry.add("main", "save", "CTRL+S");

    let result = registry.save_to_file(&path);

    assert!(matches!(result, Err(StorageError::AccessDenied(p)) if p == path));
}

// ============================================================================
// Binding
// ============================================================================

#[test]
fn test_bind_installs_table_and_handler() {
    let fired = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&fired);

    let mut registry = filtered_registry().with_conflict_policy(PermitAll);
    registry.add("main", "save", "CTRL+S");
    registry.add("main", "store", "CTRL+S");
    registry.add("main", "open", "CTRL+O");

    let mut window = HeadlessWindow::new();
    registry.bind(
        "main",
        &mut window,
        Some(Box::new(move |command: CommandRef| sink.borrow_mut().push(command))),
    );

    assert_eq!(window.table().len(), 2);
    assert!(window.has_handler());

    let merged = window
        .press(ModifierFlags::CTRL, code_of("S").unwrap())
        .unwrap();
    assert_eq!(
        registry.resolve_command(merged),
        vec![command_of(&registry, "save"), command_of(&registry, "store")]
    );
    assert_eq!(window.press(ModifierFlags::ALT, code_of("S").unwrap()), None);
    assert_eq!(*fired.borrow(), vec![merged]);
}

#[test]
fn test_log_prefix() {
    let registry = KeymapRegistry::new(RefAllocator::shared()).with_log_prefix("editor");

    assert_eq!(registry.log().name(), "editor.keymap");
    assert!(registry.filter().is_none());
}
