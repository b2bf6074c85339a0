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

//! In-memory sectioned key/value store backing keymap files.
//!
//! Section and key lookups are case-insensitive; the spelling used when a
//! section or key was first written is kept for output.

use indexmap::IndexMap;

use crate::config::parser::{self, ParseError};

/// One `[name]` block of a keymap document.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Section {
    name: String,
    /// Uppercased key -> (written key, value)
    entries: IndexMap<String, (String, String)>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Iterates `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_uppercase())
            .map(|(_, value)| value.as_str())
    }

    /// Sets a value, replacing any existing key that differs only in case.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        match self.entries.get_mut(&key.to_uppercase()) {
            Some(slot) => slot.1 = value,
            None => {
                self.entries.insert(key.to_uppercase(), (key, value));
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries
            .shift_remove(&key.to_uppercase())
            .map(|(_, value)| value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ordered collection of sections, as read from or written to an INI file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct KeymapDocument {
    sections: IndexMap<String, Section>,
}

impl KeymapDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a document from in-memory `(section, [(key, value)])` pairs.
    ///
    /// ```
    /// use accel_keymap::config::KeymapDocument;
    ///
    /// let doc = KeymapDocument::from_sections([
    ///     ("Editor", vec![("save", "CTRL+S"), ("find", "CTRL+F")]),
    /// ]);
    /// assert_eq!(doc.get("EDITOR", "find"), Some("CTRL+F"));
    /// ```
    pub fn from_sections<S, E, K, V>(sections: impl IntoIterator<Item = (S, E)>) -> Self
    where
        S: AsRef<str>,
        E: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut document = Self::new();
        for (name, entries) in sections {
            let section = document.section_mut(name.as_ref());
            for (key, value) in entries {
                section.set(key.as_ref(), value.as_ref());
            }
        }
        document
    }

    pub fn parse(content: &str) -> Result<Self, ParseError> {
        parser::parse_document(content)
    }

    pub fn to_ini_string(&self) -> String {
        parser::write_document(self)
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(&name.to_uppercase())
    }

    /// Returns the named section, appending an empty one if missing.
    pub fn section_mut(&mut self, name: &str) -> &mut Section {
        self.sections
            .entry(name.to_uppercase())
            .or_insert_with(|| Section::new(name))
    }

    pub fn contains_section(&self, name: &str) -> bool {
        self.sections.contains_key(&name.to_uppercase())
    }

    pub fn remove_section(&mut self, name: &str) -> Option<Section> {
        self.sections.shift_remove(&name.to_uppercase())
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }

    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.section_mut(section).set(key, value);
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
