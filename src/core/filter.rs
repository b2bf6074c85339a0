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

//! src/core/filter.rs
//!
//! Shortcut policy filter
//!
//! A `KeyFilter` decides whether a "+"-joined key combination may be used as a
//! shortcut. Each usable key name carries exactly one `KeyCategory`:
//!
//! - `Modifier`: CTRL/ALT/SHIFT (optionally WINDOWS), never alone
//! - `Function`: usable alone or with modifiers
//! - `Enable`: needs at least one modifier, SHIFT included
//! - `NoShiftEnable`: needs a modifier other than SHIFT
//!
//! On top of that, exact combinations can be reserved ("disabled patterns").
//! A fresh filter already reserves the combinations the operating system
//! owns (task switching, start menu, task manager, ...).
//!
//! Unknown key names passed while *configuring* the filter are programmer
//! errors (`UnknownKey`). Rejections while *checking* a combination are
//! ordinary outcomes (`Rejection`).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

use crate::core::catalog::{KeyCatalog, KeyGroup, UnknownKey};

/// How a usable key may appear in a combination
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum KeyCategory {
    Modifier,
    Function,
    Enable,
    NoShiftEnable,
}

/// Why a combination was refused
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum Rejection {
    #[error("no key specified")]
    Empty,

    #[error("unusable key: {0}")]
    UnusableKey(String),

    /// A lone modifier such as `CTRL`
    #[error("modifier-only pattern not allowed")]
    ModifierOnly,

    #[error("this key requires a modifier")]
    RequiresModifier,

    #[error("cannot combine more than one non-modifier key")]
    TooManyKeys,

    /// Several modifiers and nothing else, such as `CTRL+ALT`
    #[error("modifier-only combination not allowed")]
    ModifierOnlyCombination,

    #[error("this key requires a non-SHIFT modifier")]
    RequiresNonShiftModifier,

    #[error("reserved for another purpose")]
    Reserved,
}

/// Combinations owned by the operating system.
pub const OS_RESERVED: &[&str] = &[
    "CTRL+ESCAPE",           // start menu
    "CTRL+SHIFT+ESCAPE",     // task manager
    "CTRL+WINDOWS+RETURN",   // narrator
    "ALT+SHIFT+PRINTSCREEN", // high contrast
    "ALT+ESCAPE",            // minimise foreground window
    "ALT+TAB",
    "ALT+SHIFT+TAB",
];

/// Combinations used by text controls and input methods.
pub const TEXT_INPUT_RESERVED: &[&str] = &[
    "CTRL+INSERT",  // copy
    "SHIFT+INSERT", // paste
    "CTRL+Z",
    "CTRL+X",
    "CTRL+C",
    "CTRL+V",
    "CTRL+A",
    "CTRL+Y",
    "CTRL+F7",  // IME word registration
    "CTRL+F10", // IME menu
];

/// Combinations users should not rebind (context menu, cancel, close, button press).
pub const USER_RESERVED: &[&str] = &[
    "APPLICATIONS",
    "SHIFT+F10",
    "F10",
    "ESCAPE",
    "ALT+F4",
    "SPACE",
    "ALT+SPACE",
];

/// Configurable shortcut policy.
///
/// See the module documentation for the category rules. Filters are cheap
/// to clone, so registries that need diverging policies each own a copy.
#[derive(Clone, Debug)]
pub struct KeyFilter {
    categories: HashMap<&'static str, KeyCategory>,
    disabled_patterns: Vec<BTreeSet<&'static str>>,
    last_error: Option<Rejection>,
}

impl KeyFilter {
    /// Creates a filter with no usable keys and the OS reservations in place.
    pub fn new() -> Self {
        let mut filter = Self {
            categories: HashMap::new(),
            disabled_patterns: Vec::new(),
            last_error: None,
        };
        filter.insert_builtin_patterns(OS_RESERVED);
        filter
    }

    /// `new()` followed by `set_default(...)`.
    pub fn with_defaults(support_input_char: bool, is_system: bool, arrow_char_key: bool) -> Self {
        let mut filter = Self::new();
        filter.set_default(support_input_char, is_system, arrow_char_key);
        filter
    }

    /// Configures the general-purpose policy.
    ///
    /// * `support_input_char` - the view accepts text input, so editing
    ///   shortcuts are reserved and input-control keys need a modifier
    /// * `is_system` - bindings come from the application itself rather than
    ///   the user, so standalone keys (Escape, Space, menu) are allowed
    /// * `arrow_char_key` - printable keys may be used alone; normally `false`
    ///   since it clashes with incremental search in list controls
    ///
    /// Existing reservations are kept.
    pub fn set_default(&mut self, support_input_char: bool, is_system: bool, arrow_char_key: bool) -> &mut Self {
        for name in ["CTRL", "ALT", "SHIFT"] {
            self.categories.insert(name, KeyCategory::Modifier);
        }

        self.assign_group(KeyGroup::Function, KeyCategory::Function);
        self.assign_group(KeyGroup::Special, KeyCategory::Function);

        if support_input_char {
            self.insert_builtin_patterns(TEXT_INPUT_RESERVED);
            self.assign_group(KeyGroup::InputControl, KeyCategory::Enable);
        } else {
            self.assign_group(KeyGroup::InputControl, KeyCategory::Function);
        }

        if is_system {
            self.assign_group(KeyGroup::Standalone, KeyCategory::Function);
        } else {
            self.insert_builtin_patterns(USER_RESERVED);
            self.assign_group(KeyGroup::Standalone, KeyCategory::Enable);
        }

        if arrow_char_key {
            self.assign_group(KeyGroup::Character, KeyCategory::Function);
        } else {
            self.assign_group(KeyGroup::Character, KeyCategory::NoShiftEnable);
        }

        self
    }

    /// Reserves an exact combination, e.g. `"CTRL+ALT+DELETE"`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownKey` if any token is not a catalogue key.
    pub fn add_disabled_pattern(&mut self, pattern: &str) -> Result<(), UnknownKey> {
        let pattern = parse_pattern(pattern)?;
        self.push_pattern(pattern);
        Ok(())
    }

    /// Drops a reservation. Returns whether it was present.
    pub fn remove_disabled_pattern(&mut self, pattern: &str) -> Result<bool, UnknownKey> {
        let pattern = parse_pattern(pattern)?;
        let before = self.disabled_patterns.len();
        self.disabled_patterns.retain(|p| *p != pattern);
        Ok(self.disabled_patterns.len() != before)
    }

    /// Reserved combinations in canonical "+"-joined form.
    pub fn disabled_patterns(&self) -> Vec<String> {
        self.disabled_patterns
            .iter()
            .map(|p| p.iter().copied().collect::<Vec<_>>().join("+"))
            .collect()
    }

    /// Moves one key into `category`.
    ///
    /// The key leaves whatever category it had before, and a reservation
    /// consisting of that key alone is lifted.
    pub fn add_key(&mut self, name: &str, category: KeyCategory) -> Result<(), UnknownKey> {
        let name = canonical_name(name)?;
        self.assign(name, category);
        Ok(())
    }

    /// Moves several keys into `category`.
    ///
    /// All names are checked before anything changes, so an unknown name
    /// leaves the filter untouched.
    pub fn add_keys<I, S>(&mut self, names: I, category: KeyCategory) -> Result<(), UnknownKey>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|name| canonical_name(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        for name in names {
            self.assign(name, category);
        }
        Ok(())
    }

    pub fn add_enable_keys<I, S>(&mut self, names: I) -> Result<(), UnknownKey>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_keys(names, KeyCategory::Enable)
    }

    pub fn add_function_keys<I, S>(&mut self, names: I) -> Result<(), UnknownKey>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_keys(names, KeyCategory::Function)
    }

    pub fn add_modifier_keys<I, S>(&mut self, names: I) -> Result<(), UnknownKey>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_keys(names, KeyCategory::Modifier)
    }

    pub fn add_no_shift_enable_keys<I, S>(&mut self, names: I) -> Result<(), UnknownKey>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_keys(names, KeyCategory::NoShiftEnable)
    }

    /// Makes a key unusable. Returns the category it had, if any.
    pub fn remove_key(&mut self, name: &str) -> Result<Option<KeyCategory>, UnknownKey> {
        let name = canonical_name(name)?;
        Ok(self.categories.remove(name))
    }

    pub fn category_of(&self, name: &str) -> Option<KeyCategory> {
        self.categories.get(name.to_uppercase().as_str()).copied()
    }

    pub fn is_modifier(&self, name: &str) -> bool {
        self.category_of(name) == Some(KeyCategory::Modifier)
    }

    /// Validates a combination without touching the last error.
    ///
    /// A single key is accepted as soon as it is a function key; only
    /// combinations of two or more tokens are matched against the
    /// reservations.
    pub fn validate(&self, key_string: &str) -> Result<(), Rejection> {
        if key_string.is_empty() {
            return Err(Rejection::Empty);
        }

        let upper = key_string.to_uppercase();
        let tokens = upper.split('+').collect::<Vec<_>>();

        let mut modifier = false;
        let mut shift = false;
        let mut function = 0usize;
        let mut enable = 0usize;
        let mut no_shift = 0usize;
        let mut token_set = BTreeSet::new();

        for token in &tokens {
            let Some((&name, &category)) = self.categories.get_key_value(*token) else {
                return Err(Rejection::UnusableKey((*token).to_string()));
            };
            token_set.insert(name);

            match category {
                KeyCategory::Modifier if name == "SHIFT" => shift = true,
                KeyCategory::Modifier => modifier = true,
                KeyCategory::Function => function += 1,
                KeyCategory::Enable => enable += 1,
                KeyCategory::NoShiftEnable => no_shift += 1,
            }
        }

        if tokens.len() == 1 {
            return if function > 0 {
                Ok(())
            } else if modifier || shift {
                Err(Rejection::ModifierOnly)
            } else {
                Err(Rejection::RequiresModifier)
            };
        }

        if function + enable + no_shift > 1 {
            return Err(Rejection::TooManyKeys);
        }
        if !modifier && !shift && function == 0 {
            return Err(Rejection::RequiresNonShiftModifier);
        }
        if function == 0 && enable == 0 && no_shift == 0 {
            return Err(Rejection::ModifierOnlyCombination);
        }
        if enable > 0 && !modifier && !shift {
            unreachable!("enable key '{}' accepted without any modifier", upper);
        }
        if no_shift > 0 && !modifier {
            return Err(Rejection::RequiresNonShiftModifier);
        }

        if self.disabled_patterns.contains(&token_set) {
            return Err(Rejection::Reserved);
        }

        Ok(())
    }

    /// Validates a combination and remembers the reason on failure.
    pub fn check(&mut self, key_string: &str) -> bool {
        self.last_error = None;
        match self.validate(key_string) {
            Ok(()) => true,
            Err(rejection) => {
                self.last_error = Some(rejection);
                false
            }
        }
    }

    /// Reason for the most recent failed `check`, `None` after a success.
    pub fn last_error(&self) -> Option<&Rejection> {
        self.last_error.as_ref()
    }

    /// Every key name with a category, sorted.
    pub fn usable_keys(&self) -> Vec<&'static str> {
        let mut keys = self.categories.keys().copied().collect::<Vec<_>>();
        keys.sort_unstable();
        keys
    }

    /// Key names of one category, sorted.
    pub fn keys_in(&self, category: KeyCategory) -> Vec<&'static str> {
        let mut keys = self
            .categories
            .iter()
            .filter(|(_, c)| **c == category)
            .map(|(name, _)| *name)
            .collect::<Vec<_>>();
        keys.sort_unstable();
        keys
    }

    fn assign(&mut self, name: &'static str, category: KeyCategory) {
        self.disabled_patterns
            .retain(|p| !(p.len() == 1 && p.contains(name)));
        self.categories.insert(name, category);
    }

    fn assign_group(&mut self, group: KeyGroup, category: KeyCategory) {
        for name in KeyCatalog::global().names(group) {
            self.categories.insert(name, category);
        }
    }

    fn insert_builtin_patterns(&mut self, patterns: &[&str]) {
        for pattern in patterns {
            match parse_pattern(pattern) {
                Ok(parsed) => self.push_pattern(parsed),
                Err(e) => unreachable!("built-in pattern '{}' is invalid: {}", pattern, e),
            }
        }
    }

    fn push_pattern(&mut self, pattern: BTreeSet<&'static str>) {
        if !self.disabled_patterns.contains(&pattern) {
            self.disabled_patterns.push(pattern);
        }
    }
}

impl Default for KeyFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialisable description of a filter, for hosts that keep their policy
/// in a settings file and for the CLI flags.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct FilterPreset {
    pub support_input_char: bool,
    pub is_system: bool,
    pub arrow_char_key: bool,
    /// Accept WINDOWS as a modifier key
    pub windows_modifier: bool,
    /// Additional reserved combinations
    pub disabled_patterns: Vec<String>,
}

impl FilterPreset {
    /// Builds the filter this preset describes.
    ///
    /// # Errors
    ///
    /// Returns `UnknownKey` if an extra pattern names an unknown key.
    pub fn build(&self) -> Result<KeyFilter, UnknownKey> {
        let mut filter =
            KeyFilter::with_defaults(self.support_input_char, self.is_system, self.arrow_char_key);

        if self.windows_modifier {
            filter.add_key("WINDOWS", KeyCategory::Modifier)?;
        }
        for pattern in &self.disabled_patterns {
            filter.add_disabled_pattern(pattern)?;
        }

        Ok(filter)
    }
}

fn canonical_name(name: &str) -> Result<&'static str, UnknownKey> {
    KeyCatalog::global()
        .canonical(name)
        .ok_or_else(|| UnknownKey(name.to_uppercase()))
}

/// Parses "A+B+C" into its canonical token set.
fn parse_pattern(pattern: &str) -> Result<BTreeSet<&'static str>, UnknownKey> {
    pattern.split('+').map(canonical_name).collect()
}
