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

//! src/core/catalog.rs
//!
//! Static key name catalogue
//!
//! Maps canonical (uppercase) key names to abstract key codes and back.
//! Every name belongs to exactly one `KeyGroup`; the groups are the raw
//! material `KeyFilter::set_default` distributes into usable categories.
//!
//! Codes for printable characters are their ASCII values. Everything else
//! lives in the 300+ range so the two never collide.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Abstract key code consumed by the accelerator table.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct KeyCode(pub u32);

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Partition of the catalogue
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum KeyGroup {
    /// CTRL, ALT, SHIFT, WINDOWS
    Modifier,
    /// F1 to F24
    Function,
    /// Pause, print screen, lock keys and the numeric keypad
    Special,
    /// Keys that drive text entry on their own (arrows, Home, Return, ...)
    InputControl,
    /// Keys with a standard meaning when pressed alone (Escape, Space, menu)
    Standalone,
    /// Printable letters, digits and symbols
    Character,
}

/// Key name missing from the catalogue.
///
/// This is a configuration bug in the caller, not a user input problem.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("unknown key name '{0}'")]
pub struct UnknownKey(pub String);

const KEY_TABLE: &[(&str, u32, KeyGroup)] = &[
    ("CTRL", 308, KeyGroup::Modifier),
    ("ALT", 307, KeyGroup::Modifier),
    ("SHIFT", 306, KeyGroup::Modifier),
    ("WINDOWS", 393, KeyGroup::Modifier),
    ("F1", 340, KeyGroup::Function),
    ("F2", 341, KeyGroup::Function),
    ("F3", 342, KeyGroup::Function),
    ("F4", 343, KeyGroup::Function),
    ("F5", 344, KeyGroup::Function),
    ("F6", 345, KeyGroup::Function),
    ("F7", 346, KeyGroup::Function),
    ("F8", 347, KeyGroup::Function),
    ("F9", 348, KeyGroup::Function),
    ("F10", 349, KeyGroup::Function),
    ("F11", 350, KeyGroup::Function),
    ("F12", 351, KeyGroup::Function),
    ("F13", 352, KeyGroup::Function),
    ("F14", 353, KeyGroup::Function),
    ("F15", 354, KeyGroup::Function),
    ("F16", 355, KeyGroup::Function),
    ("F17", 356, KeyGroup::Function),
    ("F18", 357, KeyGroup::Function),
    ("F19", 358, KeyGroup::Function),
    ("F20", 359, KeyGroup::Function),
    ("F21", 360, KeyGroup::Function),
    ("F22", 361, KeyGroup::Function),
    ("F23", 362, KeyGroup::Function),
    ("F24", 363, KeyGroup::Function),
    ("PAUSE", 310, KeyGroup::Special),
    ("PRINTSCREEN", 318, KeyGroup::Special),
    ("SCROLL", 365, KeyGroup::Special),
    ("NUMLOCK", 364, KeyGroup::Special),
    ("NUMPAD0", 324, KeyGroup::Special),
    ("NUMPAD1", 325, KeyGroup::Special),
    ("NUMPAD2", 326, KeyGroup::Special),
    ("NUMPAD3", 327, KeyGroup::Special),
    ("NUMPAD4", 328, KeyGroup::Special),
    ("NUMPAD5", 329, KeyGroup::Special),
    ("NUMPAD6", 330, KeyGroup::Special),
    ("NUMPAD7", 331, KeyGroup::Special),
    ("NUMPAD8", 332, KeyGroup::Special),
    ("NUMPAD9", 333, KeyGroup::Special),
    ("NUMPAD_MULTIPLY", 387, KeyGroup::Special),
    ("NUMPAD_ADD", 388, KeyGroup::Special),
    ("NUMPAD_SUBTRACT", 390, KeyGroup::Special),
    ("NUMPAD_DECIMAL", 391, KeyGroup::Special),
    ("NUMPAD_DIVIDE", 392, KeyGroup::Special),
    ("BACK", 8, KeyGroup::InputControl),
    ("TAB", 9, KeyGroup::InputControl),
    ("RETURN", 13, KeyGroup::InputControl),
    ("DELETE", 127, KeyGroup::InputControl),
    ("INSERT", 322, KeyGroup::InputControl),
    ("HOME", 313, KeyGroup::InputControl),
    ("END", 312, KeyGroup::InputControl),
    ("PAGEUP", 366, KeyGroup::InputControl),
    ("PAGEDOWN", 367, KeyGroup::InputControl),
    ("LEFTARROW", 314, KeyGroup::InputControl),
    ("UPARROW", 315, KeyGroup::InputControl),
    ("RIGHTARROW", 316, KeyGroup::InputControl),
    ("DOWNARROW", 317, KeyGroup::InputControl),
    ("ESCAPE", 27, KeyGroup::Standalone),
    ("SPACE", 32, KeyGroup::Standalone),
    ("APPLICATIONS", 395, KeyGroup::Standalone),
    ("0", 48, KeyGroup::Character),
    ("1", 49, KeyGroup::Character),
    ("2", 50, KeyGroup::Character),
    ("3", 51, KeyGroup::Character),
    ("4", 52, KeyGroup::Character),
    ("5", 53, KeyGroup::Character),
    ("6", 54, KeyGroup::Character),
    ("7", 55, KeyGroup::Character),
    ("8", 56, KeyGroup::Character),
    ("9", 57, KeyGroup::Character),
    ("A", 65, KeyGroup::Character),
    ("B", 66, KeyGroup::Character),
    ("C", 67, KeyGroup::Character),
    ("D", 68, KeyGroup::Character),
    ("E", 69, KeyGroup::Character),
    ("F", 70, KeyGroup::Character),
    ("G", 71, KeyGroup::Character),
    ("H", 72, KeyGroup::Character),
    ("I", 73, KeyGroup::Character),
    ("J", 74, KeyGroup::Character),
    ("K", 75, KeyGroup::Character),
    ("L", 76, KeyGroup::Character),
    ("M", 77, KeyGroup::Character),
    ("N", 78, KeyGroup::Character),
    ("O", 79, KeyGroup::Character),
    ("P", 80, KeyGroup::Character),
    ("Q", 81, KeyGroup::Character),
    ("R", 82, KeyGroup::Character),
    ("S", 83, KeyGroup::Character),
    ("T", 84, KeyGroup::Character),
    ("U", 85, KeyGroup::Character),
    ("V", 86, KeyGroup::Character),
    ("W", 87, KeyGroup::Character),
    ("X", 88, KeyGroup::Character),
    ("Y", 89, KeyGroup::Character),
    ("Z", 90, KeyGroup::Character),
    ("COMMA", 44, KeyGroup::Character),
    ("MINUS", 45, KeyGroup::Character),
    ("PERIOD", 46, KeyGroup::Character),
    ("SLASH", 47, KeyGroup::Character),
    ("COLON", 58, KeyGroup::Character),
    ("SEMICOLON", 59, KeyGroup::Character),
    ("AT", 64, KeyGroup::Character),
    ("LEFTBRACKET", 91, KeyGroup::Character),
    ("BACKSLASH", 92, KeyGroup::Character),
    ("RIGHTBRACKET", 93, KeyGroup::Character),
    ("CARET", 94, KeyGroup::Character),
];

/// Bidirectional name/code lookup over `KEY_TABLE`.
#[derive(Debug)]
pub struct KeyCatalog {
    by_name: HashMap<&'static str, (KeyCode, KeyGroup)>,
    by_code: HashMap<KeyCode, &'static str>,
}

static CATALOG: OnceLock<KeyCatalog> = OnceLock::new();

impl KeyCatalog {
    /// Returns the process-wide catalogue, building it on first use.
    pub fn global() -> &'static KeyCatalog {
        CATALOG.get_or_init(|| {
            let mut by_name = HashMap::with_capacity(KEY_TABLE.len());
            let mut by_code = HashMap::with_capacity(KEY_TABLE.len());
            for &(name, code, group) in KEY_TABLE {
                by_name.insert(name, (KeyCode(code), group));
                by_code.insert(KeyCode(code), name);
            }
            KeyCatalog { by_name, by_code }
        })
    }

    /// Resolves a name (any case) to its canonical static spelling.
    pub fn canonical(&self, name: &str) -> Option<&'static str> {
        let upper = name.to_uppercase();
        self.by_name
            .get_key_value(upper.as_str())
            .map(|(canonical, _)| *canonical)
    }

    /// Looks up the key code for a name.
    ///
    /// # Errors
    ///
    /// Returns `UnknownKey` if the name is not in the catalogue.
    pub fn code_of(&self, name: &str) -> Result<KeyCode, UnknownKey> {
        self.by_name
            .get(name.to_uppercase().as_str())
            .map(|(code, _)| *code)
            .ok_or_else(|| UnknownKey(name.to_uppercase()))
    }

    /// Reverse lookup from code to canonical name.
    pub fn name_of(&self, code: KeyCode) -> Option<&'static str> {
        self.by_code.get(&code).copied()
    }

    pub fn group_of(&self, name: &str) -> Option<KeyGroup> {
        self.by_name
            .get(name.to_uppercase().as_str())
            .map(|(_, group)| *group)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.canonical(name).is_some()
    }

    /// All names of one group, in table order.
    pub fn names(&self, group: KeyGroup) -> impl Iterator<Item = &'static str> {
        KEY_TABLE
            .iter()
            .filter(move |(_, _, g)| *g == group)
            .map(|(name, _, _)| *name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Shorthand for `KeyCatalog::global().code_of(name)`.
pub fn code_of(name: &str) -> Result<KeyCode, UnknownKey> {
    KeyCatalog::global().code_of(name)
}
