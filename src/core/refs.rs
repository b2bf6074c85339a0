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

//! src/core/refs.rs
//!
//! Command reference allocation
//!
//! Turns string identifiers ("SAVE", "KEYMAP_EDITOR_CTRL+S") into stable
//! numeric `CommandRef`s. Identifiers are case-insensitive and numbers are
//! handed out sequentially from `FIRST_REF`.
//!
//! The allocator is an ordinary value. Hosts usually create one per process
//! and share it between registries and menu builders through
//! `SharedRefAllocator`; tests create their own.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::core::types::CommandRef;

/// First number handed out by a fresh allocator.
pub const FIRST_REF: u32 = 5000;

/// Allocator shared between a registry and its host (single-threaded).
pub type SharedRefAllocator = Rc<RefCell<RefAllocator>>;

#[derive(Clone, Debug)]
pub struct RefAllocator {
    refs: HashMap<String, CommandRef>,
    names: HashMap<CommandRef, String>,
    next: u32,
}

impl RefAllocator {
    pub fn new() -> Self {
        Self::starting_at(FIRST_REF)
    }

    /// Allocator numbering from `first` instead of `FIRST_REF`.
    pub fn starting_at(first: u32) -> Self {
        Self {
            refs: HashMap::new(),
            names: HashMap::new(),
            next: first,
        }
    }

    /// Convenience constructor for the shared form.
    pub fn shared() -> SharedRefAllocator {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Returns the reference for `identifier`, allocating one on first use.
    ///
    /// Numbering stops at `u32::MAX` instead of wrapping.
    pub fn resolve(&mut self, identifier: &str) -> CommandRef {
        let identifier = identifier.to_uppercase();
        if let Some(existing) = self.refs.get(&identifier) {
            return *existing;
        }

        let command = CommandRef(self.next);
        self.next = self.next.saturating_add(1);
        self.names.insert(command, identifier.clone());
        self.refs.insert(identifier, command);
        command
    }

    /// Looks up an identifier without allocating.
    pub fn lookup(&self, identifier: &str) -> Option<CommandRef> {
        self.refs.get(&identifier.to_uppercase()).copied()
    }

    /// Identifier a reference was allocated for.
    pub fn name_of(&self, command: CommandRef) -> Option<&str> {
        self.names.get(&command).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

impl Default for RefAllocator {
    fn default() -> Self {
        Self::new()
    }
}
