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

//! src/core/registry.rs
//!
//! Per-view keymap registry
//!
//! Ingests `(view, reference, key string)` triples, keeps at most one entry
//! per physical trigger in each view, and remembers the key string each
//! reference was bound with so the keymap can be saved back.
//!
//! When a binding collides with one already in its view, the configured
//! `ConflictPolicy` decides:
//! - denied (or no policy): the binding is recorded as an error and the
//!   existing entry is kept
//! - permitted: the colliding entries are replaced by one entry bound to a
//!   synthetic `keymap_<VIEW>_<TRIGGER>` reference, and the original
//!   entries are remembered so a dispatcher can fan the command back out
//!
//! View and reference names are case-insensitive and stored uppercase.

use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::Path;

use crate::config::{KeymapDocument, KeymapFile, StorageError};
use crate::core::conflict::ConflictPolicy;
use crate::core::entry::make_entry;
use crate::core::filter::KeyFilter;
use crate::core::refs::SharedRefAllocator;
use crate::core::types::{AcceleratorEntry, CommandRef};
use crate::logging::Logger;
use crate::window::{AcceleratorTable, AcceleratorWindow, CommandHandler};

/// Sections whose name contains this are skipped unless named explicitly.
pub const HOTKEY_MARKER: &str = "HOTKEY";

/// Stateful store of accelerator entries grouped by view
///
/// # Example
///
/// ```
/// use accel_keymap::core::{KeyFilter, KeymapRegistry, PermitAll, RefAllocator};
///
/// let refs = RefAllocator::shared();
/// let mut registry = KeymapRegistry::new(refs.clone())
///     .with_filter(KeyFilter::with_defaults(true, false, false))
///     .with_conflict_policy(PermitAll);
///
/// registry.add("editor", "save", "CTRL+S");
/// registry.add("editor", "store", "ctrl+s");
///
/// let entries = registry.entries("EDITOR");
/// assert_eq!(entries.len(), 1);
/// assert!(registry.is_redirected(entries[0].command()));
///
/// let save = refs.borrow().lookup("save").unwrap();
/// let store = refs.borrow().lookup("store").unwrap();
/// assert_eq!(registry.original_refs(entries[0].command()), vec![save, store]);
/// ```
pub struct KeymapRegistry {
    log: Logger,
    refs: SharedRefAllocator,
    filter: Option<KeyFilter>,
    policy: Option<Box<dyn ConflictPolicy>>,
    /// View -> entries, unique by trigger
    entries: IndexMap<String, Vec<AcceleratorEntry>>,
    /// View -> reference -> "/"-joined key string
    key_strings: IndexMap<String, IndexMap<String, String>>,
    /// View -> reference -> rejected key string, cleared on read
    errors: IndexMap<String, IndexMap<String, String>>,
    /// Synthetic command -> entries merged into it
    redirects: HashMap<CommandRef, Vec<AcceleratorEntry>>,
}

impl KeymapRegistry {
    /// Creates a registry with no filter and no conflict policy.
    pub fn new(refs: SharedRefAllocator) -> Self {
        Self {
            log: Logger::default(),
            refs,
            filter: None,
            policy: None,
            entries: IndexMap::new(),
            key_strings: IndexMap::new(),
            errors: IndexMap::new(),
            redirects: HashMap::new(),
        }
    }

    pub fn with_filter(mut self, filter: KeyFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_conflict_policy(mut self, policy: impl ConflictPolicy + 'static) -> Self {
        self.policy = Some(Box::new(policy));
        self
    }

    /// Logs under `"<prefix>.keymap"` instead of `"app.keymap"`.
    pub fn with_log_prefix(mut self, prefix: &str) -> Self {
        self.log = Logger::keymap(prefix);
        self
    }

    pub fn log(&self) -> &Logger {
        &self.log
    }

    pub fn refs(&self) -> &SharedRefAllocator {
        &self.refs
    }

    pub fn filter(&self) -> Option<&KeyFilter> {
        self.filter.as_ref()
    }

    pub fn filter_mut(&mut self) -> Option<&mut KeyFilter> {
        self.filter.as_mut()
    }

    /// Binds `reference` in `view` to every "/"-separated alternative of
    /// `key_string`.
    ///
    /// Alternatives are handled independently: a rejected or conflicting
    /// one records `key_string` under `reference` in the view's errors and
    /// the rest are still added. Binding a trigger the view already has is
    /// a conflict even when the existing entry is the same command.
    ///
    /// View, reference and key string are uppercased on entry, so both the
    /// key-string map and the recorded errors hold the uppercase form.
    pub fn add(&mut self, view: &str, reference: &str, key_string: &str) {
        let view = view.to_uppercase();
        let reference = reference.to_uppercase();
        let key_string = key_string.to_uppercase();

        self.entries.entry(view.clone()).or_default();

        for alternative in key_string.split('/') {
            let alternative = alternative.trim();

            let made = {
                let mut refs = self.refs.borrow_mut();
                make_entry(&reference, alternative, self.filter.as_ref(), &mut refs, &self.log)
            };
            let entry = match made {
                Ok(entry) => entry,
                Err(e) => {
                    self.log.warn(format!(
                        "Cannot add {}={} in {} reason={}",
                        reference, key_string, view, e
                    ));
                    self.record_error(&view, &reference, &key_string);
                    continue;
                }
            };

            let matches = self
                .entries(&view)
                .iter()
                .enumerate()
                .filter(|(_, existing)| existing.same_trigger(&entry))
                .map(|(index, _)| index)
                .collect::<Vec<_>>();

            let Some(&first) = matches.first() else {
                self.push_entry(&view, entry);
                self.append_key_string(&view, &reference, alternative);
                continue;
            };

            let view_entries = self.entries(&view);

            let mut candidates = Vec::new();
            for &index in &matches {
                let existing = &view_entries[index];
                match self.redirects.get(&existing.command()) {
                    Some(originals) => candidates.extend(originals.iter().cloned()),
                    None => candidates.push(existing.clone()),
                }
            }
            candidates.push(entry.clone());

            let permitted = self
                .policy
                .as_ref()
                .is_some_and(|policy| policy.permit(&candidates, &self.log));

            if !permitted {
                self.log.warn(format!(
                    "Cannot add {}={} in {} reason=conflict with {}",
                    reference,
                    key_string,
                    view,
                    view_entries[first].ref_name()
                ));
                self.record_error(&view, &reference, &key_string);
                continue;
            }

            self.merge(&view, &matches, &entry, candidates);
            self.append_key_string(&view, &reference, alternative);
        }
    }

    /// Adds every non-empty binding of the selected sections.
    ///
    /// With a non-empty `sections`, only sections whose name matches one of
    /// them (case-insensitively) are read. Without (or with an empty list),
    /// every section is read except those whose name contains `HOTKEY`.
    pub fn add_from_document(&mut self, document: &KeymapDocument, sections: Option<&[&str]>) {
        for section in document.sections() {
            let name = section.name();
            let included = match sections {
                Some(wanted) if !wanted.is_empty() => {
                    wanted.iter().any(|w| w.eq_ignore_ascii_case(name))
                }
                _ => !name.to_uppercase().contains(HOTKEY_MARKER),
            };
            if !included {
                self.log.debug(format!("skipping section [{}]", name));
                continue;
            }

            for (reference, key_string) in section.iter() {
                if key_string.trim().is_empty() {
                    continue;
                }
                self.add(name, reference, key_string);
            }
        }
    }

    /// Loads a keymap file and adds its bindings.
    ///
    /// `Ok` means the file was read, not that every binding was accepted;
    /// check `take_errors` for rejected ones. On error nothing is added.
    pub fn add_from_file(
        &mut self,
        path: impl AsRef<Path>,
        sections: Option<&[&str]>,
    ) -> Result<(), StorageError> {
        let path = path.as_ref();
        let document = KeymapFile::new(path).load().map_err(|e| {
            self.log.warn(format!("Cannot load {}: {}", path.display(), e));
            e
        })?;

        self.add_from_document(&document, sections);
        Ok(())
    }

    /// Writes the key-string map into the document.
    ///
    /// The section of every view seen so far is emptied and refilled from
    /// the accepted bindings, so a view whose bindings were all rejected
    /// ends up empty. Other sections are left alone.
    pub fn write_into(&self, document: &mut KeymapDocument) {
        for view in self.entries.keys() {
            let section = document.section_mut(view);
            section.clear();

            let Some(references) = self.key_strings.get(view) else {
                continue;
            };
            for (reference, key_string) in references {
                section.set(reference.as_str(), key_string.as_str());
            }
        }
    }

    /// Saves the key-string map to `path`, keeping unrelated sections.
    ///
    /// Keeping other sections is best-effort: an existing file that does
    /// not parse is replaced.
    ///
    /// # Errors
    ///
    /// Any failure is reported as `StorageError::AccessDenied`; the cause
    /// is logged.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), StorageError> {
        self.save(&KeymapFile::new(path.as_ref()))
    }

    /// Like `save_to_file`, going through a caller-configured file (e.g.
    /// with backups enabled).
    pub fn save(&self, file: &KeymapFile) -> Result<(), StorageError> {
        let existing = match file.load_or_default() {
            Err(StorageError::ParseFailed { path, reason }) => {
                self.log.warn(format!(
                    "Discarding unreadable {} before save: {}",
                    path.display(),
                    reason
                ));
                Ok(KeymapDocument::new())
            }
            other => other,
        };

        let result = existing.and_then(|mut document| {
            self.write_into(&mut document);
            file.save(&document)
        });

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                self.log
                    .warn(format!("Cannot save keymap to {}: {}", file.path().display(), e));
                Err(StorageError::AccessDenied(file.path().to_path_buf()))
            }
        }
    }

    /// Returns and clears the view's rejected bindings (reference -> key string).
    pub fn take_errors(&mut self, view: &str) -> IndexMap<String, String> {
        self.errors
            .shift_remove(&view.to_uppercase())
            .unwrap_or_default()
    }

    /// Key string bound to `reference` in `view`, falling back to the first
    /// other view that binds it.
    pub fn key_string(&self, view: &str, reference: &str) -> Option<&str> {
        let view = view.to_uppercase();
        let reference = reference.to_uppercase();

        if let Some(found) = self
            .key_strings
            .get(&view)
            .and_then(|references| references.get(&reference))
        {
            return Some(found.as_str());
        }

        self.key_strings
            .values()
            .find_map(|references| references.get(&reference))
            .map(String::as_str)
    }

    /// Entries of `view`; empty for an unknown view.
    pub fn entries(&self, view: &str) -> &[AcceleratorEntry] {
        self.entries
            .get(&view.to_uppercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn table(&self, view: &str) -> AcceleratorTable {
        AcceleratorTable::from_entries(self.entries(view))
    }

    /// Installs the view's table on `window`, registering `handler` first.
    pub fn bind(
        &self,
        view: &str,
        window: &mut dyn AcceleratorWindow,
        handler: Option<CommandHandler>,
    ) {
        if let Some(handler) = handler {
            window.bind_menu_command(handler);
        }
        window.set_accelerator_table(self.table(view));
    }

    /// View identifiers in the order they were first seen.
    pub fn views(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_redirected(&self, command: CommandRef) -> bool {
        self.redirects.contains_key(&command)
    }

    /// Entries merged into a synthetic command, in insertion order.
    pub fn original_entries(&self, command: CommandRef) -> &[AcceleratorEntry] {
        self.redirects
            .get(&command)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Commands merged into `command`; empty unless it is synthetic.
    pub fn original_refs(&self, command: CommandRef) -> Vec<CommandRef> {
        self.original_entries(command)
            .iter()
            .map(AcceleratorEntry::command)
            .collect()
    }

    /// Commands to run when `command` fires.
    pub fn resolve_command(&self, command: CommandRef) -> Vec<CommandRef> {
        if self.is_redirected(command) {
            self.original_refs(command)
        } else {
            vec![command]
        }
    }

    fn merge(
        &mut self,
        view: &str,
        matches: &[usize],
        entry: &AcceleratorEntry,
        candidates: Vec<AcceleratorEntry>,
    ) {
        let view_entries = self.entries.entry(view.to_string()).or_default();
        let Some(&first) = matches.first() else {
            return;
        };

        let synthetic = format!("keymap_{}_{}", view, view_entries[first].to_raw_string());
        let command = self.refs.borrow_mut().resolve(&synthetic);

        let mut originals: Vec<AcceleratorEntry> = Vec::new();
        for candidate in candidates {
            if !originals.iter().any(|o| o.command() == candidate.command()) {
                originals.push(candidate);
            }
        }

        self.log.debug(format!(
            "{} merged into {} in {}",
            originals
                .iter()
                .map(AcceleratorEntry::ref_name)
                .collect::<Vec<_>>()
                .join(","),
            synthetic.to_uppercase(),
            view
        ));

        view_entries[first] = entry.with_command(command, &synthetic);
        for &index in matches.iter().skip(1).rev() {
            view_entries.remove(index);
        }

        self.redirects.insert(command, originals);
    }

    fn push_entry(&mut self, view: &str, entry: AcceleratorEntry) {
        self.entries.entry(view.to_string()).or_default().push(entry);
    }

    fn append_key_string(&mut self, view: &str, reference: &str, alternative: &str) {
        let references = self.key_strings.entry(view.to_string()).or_default();
        match references.get_mut(reference) {
            Some(existing) => {
                if !existing.split('/').any(|a| a == alternative) {
                    existing.push('/');
                    existing.push_str(alternative);
                }
            }
            None => {
                references.insert(reference.to_string(), alternative.to_string());
            }
        }
    }

    fn record_error(&mut self, view: &str, reference: &str, key_string: &str) {
        self.errors
            .entry(view.to_string())
            .or_default()
            .insert(reference.to_string(), key_string.to_string());
    }
}
