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

//! Accelerator tables and the window boundary
//!
//! The registry never talks to a GUI toolkit directly. It hands an
//! `AcceleratorTable` (flags, code, command triples) to anything that
//! implements `AcceleratorWindow`, and optionally a single handler for the
//! generic "menu command" channel.
//!
//! `HeadlessWindow` is the toolkit-free implementation: it keeps the
//! installed table, and `press()` looks a trigger up and fires the handler
//! the way a real window would on a key press.
//!
//! # Example
//! ```
//! use accel_keymap::window::{AcceleratorWindow, HeadlessWindow};
//! use accel_keymap::core::{KeymapRegistry, ModifierFlags, RefAllocator};
//! use accel_keymap::core::catalog::code_of;
//!
//! let mut registry = KeymapRegistry::new(RefAllocator::shared());
//! registry.add("main", "save", "CTRL+S");
//!
//! let mut window = HeadlessWindow::new();
//! registry.bind("main", &mut window, None);
//!
//! let fired = window.press(ModifierFlags::CTRL, code_of("S")?);
//! assert!(fired.is_some());
//! # Ok::<(), accel_keymap::core::catalog::UnknownKey>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::core::catalog::KeyCode;
use crate::core::types::{AcceleratorEntry, CommandRef, ModifierFlags, Trigger};

/// One row of an accelerator table
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Accelerator {
    pub flags: ModifierFlags,
    pub code: KeyCode,
    pub command: CommandRef,
}

impl Accelerator {
    pub fn trigger(&self) -> Trigger {
        Trigger {
            flags: self.flags,
            code: self.code,
        }
    }
}

impl From<&AcceleratorEntry> for Accelerator {
    fn from(entry: &AcceleratorEntry) -> Self {
        Self {
            flags: entry.flags(),
            code: entry.code(),
            command: entry.command(),
        }
    }
}

/// Toolkit-neutral accelerator table
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct AcceleratorTable {
    accelerators: Vec<Accelerator>,
}

impl AcceleratorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: &[AcceleratorEntry]) -> Self {
        Self {
            accelerators: entries.iter().map(Accelerator::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.accelerators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accelerators.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Accelerator> {
        self.accelerators.iter()
    }

    /// Command fired by a trigger. The first matching row wins.
    pub fn lookup(&self, flags: ModifierFlags, code: KeyCode) -> Option<CommandRef> {
        self.accelerators
            .iter()
            .find(|a| a.flags == flags && a.code == code)
            .map(|a| a.command)
    }
}

/// Handler for the generic command-activation channel
pub type CommandHandler = Box<dyn FnMut(CommandRef)>;

/// A window that can carry an accelerator table
pub trait AcceleratorWindow {
    /// Replaces the window's accelerator table.
    fn set_accelerator_table(&mut self, table: AcceleratorTable);

    /// Subscribes `handler` to command activations.
    fn bind_menu_command(&mut self, handler: CommandHandler);
}

/// Window stand-in for hosts without a toolkit, and for tests
#[derive(Default)]
pub struct HeadlessWindow {
    table: AcceleratorTable,
    handler: Option<CommandHandler>,
}

impl HeadlessWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self) -> &AcceleratorTable {
        &self.table
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Simulates a key press.
    ///
    /// Returns the command the table maps the trigger to, after passing it
    /// to the handler (if one is bound).
    pub fn press(&mut self, flags: ModifierFlags, code: KeyCode) -> Option<CommandRef> {
        let command = self.table.lookup(flags, code)?;
        if let Some(handler) = self.handler.as_mut() {
            handler(command);
        }
        Some(command)
    }
}

impl AcceleratorWindow for HeadlessWindow {
    fn set_accelerator_table(&mut self, table: AcceleratorTable) {
        self.table = table;
    }

    fn bind_menu_command(&mut self, handler: CommandHandler) {
        self.handler = Some(handler);
    }
}

#[cfg(test)]
mod tests;
