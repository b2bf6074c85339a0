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

//! src/core/types.rs
//!
//! Core value types for keymap management
//!
//! - `ModifierFlags`: bitset of CTRL/ALT/SHIFT/WIN
//! - `CommandRef`: stable numeric command identifier
//! - `Trigger`: the physical (flags, code) pair a binding fires on
//! - `AcceleratorEntry`: an immutable binding of a trigger to a command
//!
//! Entries are compared for conflicts with `same_trigger`, never with `==`.
//! Two entries bound to different commands still collide when they share
//! a trigger.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::catalog::{KeyCatalog, KeyCode};

bitflags! {
    /// Modifier keys held together with the main key
    #[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
    pub struct ModifierFlags: u8 {
        const CTRL = 0b0001;
        const ALT = 0b0010;
        const SHIFT = 0b0100;
        /// Windows/Super key, only recognised when the filter enables it
        const WIN = 0b1000;
    }
}

impl ModifierFlags {
    /// Maps a modifier token to its flag.
    ///
    /// `WINDOWS` only counts when `windows` is set, mirroring filters that
    /// have not opted into the Windows key.
    pub fn from_token(token: &str, windows: bool) -> Option<Self> {
        match token {
            "CTRL" => Some(Self::CTRL),
            "ALT" => Some(Self::ALT),
            "SHIFT" => Some(Self::SHIFT),
            "WINDOWS" if windows => Some(Self::WIN),
            _ => None,
        }
    }

    /// Number of distinct modifiers set.
    pub fn count(self) -> usize {
        self.bits().count_ones() as usize
    }
}

impl fmt::Display for ModifierFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::CTRL, "CTRL"),
            (Self::ALT, "ALT"),
            (Self::SHIFT, "SHIFT"),
            (Self::WIN, "WINDOWS"),
        ];
        let parts = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect::<Vec<_>>();
        write!(f, "{}", parts.join("+"))
    }
}

/// Numeric command identifier handed to the GUI layer.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct CommandRef(pub u32);

impl fmt::Display for CommandRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The physical key combination an entry fires on.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Trigger {
    pub flags: ModifierFlags,
    pub code: KeyCode,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = KeyCatalog::global()
            .name_of(self.code)
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", self.code));

        if self.flags.is_empty() {
            write!(f, "{}", key)
        } else {
            write!(f, "{}+{}", self.flags, key)
        }
    }
}

/// An immutable accelerator binding
///
/// Holds the trigger, the resolved command reference and the uppercase
/// reference name it was resolved from.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AcceleratorEntry {
    flags: ModifierFlags,
    code: KeyCode,
    command: CommandRef,
    ref_name: String,
}

impl AcceleratorEntry {
    pub fn new(flags: ModifierFlags, code: KeyCode, command: CommandRef, ref_name: &str) -> Self {
        Self {
            flags,
            code,
            command,
            ref_name: ref_name.to_uppercase(),
        }
    }

    pub fn flags(&self) -> ModifierFlags {
        self.flags
    }

    pub fn code(&self) -> KeyCode {
        self.code
    }

    pub fn command(&self) -> CommandRef {
        self.command
    }

    pub fn ref_name(&self) -> &str {
        &self.ref_name
    }

    pub fn trigger(&self) -> Trigger {
        Trigger {
            flags: self.flags,
            code: self.code,
        }
    }

    /// True when both entries fire on the same physical key combination.
    ///
    /// The bound command and reference name are ignored.
    pub fn same_trigger(&self, other: &AcceleratorEntry) -> bool {
        self.flags == other.flags && self.code == other.code
    }

    /// Canonical key string of the trigger, e.g. `CTRL+SHIFT+A`.
    pub fn to_raw_string(&self) -> String {
        self.trigger().to_string()
    }

    /// Same trigger rebound to another command.
    pub fn with_command(&self, command: CommandRef, ref_name: &str) -> Self {
        Self::new(self.flags, self.code, command, ref_name)
    }
}

impl fmt::Display for AcceleratorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.trigger(), self.ref_name, self.command)
    }
}
