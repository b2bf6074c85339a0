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

//! src/core/entry.rs
//!
//! Accelerator entry construction
//!
//! `make_entry` turns one key combination (no "/" alternatives) into an
//! `AcceleratorEntry`:
//! 1. Uppercase the combination and split it on "+"
//! 2. Collect modifier flags from exact CTRL/ALT/SHIFT tokens (WINDOWS too
//!    when the filter treats it as a modifier)
//! 3. Require exactly one remaining key, naming a catalogue key
//! 4. Run the filter, if any
//! 5. Resolve the command reference

use thiserror::Error;

use crate::core::catalog::KeyCatalog;
use crate::core::filter::{KeyFilter, Rejection};
use crate::core::refs::RefAllocator;
use crate::core::types::{AcceleratorEntry, ModifierFlags};
use crate::logging::Logger;

/// Why a combination could not become an entry
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum EntryError {
    /// Wrong number of non-modifier keys, a repeated modifier, or a "/"
    #[error("{0} is an invalid pattern")]
    InvalidPattern(String),

    #[error("key name {0} is unknown")]
    UnknownKeyName(String),

    #[error("{key} rejected: {reason}")]
    Rejected { key: String, reason: Rejection },
}

/// Builds an entry binding `key` to the command named `reference`.
///
/// # Arguments
///
/// * `reference` - command identifier, case-insensitive
/// * `key` - single combination such as `"ctrl+shift+s"`
/// * `filter` - policy to enforce, or `None` to accept any well-formed key
/// * `refs` - allocator resolving `reference`
/// * `log` - receives a warning for every failure
///
/// # Errors
///
/// See `EntryError`. Nothing is allocated in `refs` on failure.
///
/// # Example
///
/// ```
/// use accel_keymap::core::entry::make_entry;
/// use accel_keymap::core::{KeyFilter, ModifierFlags, RefAllocator};
/// use accel_keymap::logging::Logger;
///
/// let filter = KeyFilter::with_defaults(true, false, false);
/// let mut refs = RefAllocator::new();
///
/// let entry = make_entry("save", "ctrl+s", Some(&filter), &mut refs, &Logger::default())?;
/// assert_eq!(entry.flags(), ModifierFlags::CTRL);
/// assert_eq!(entry.ref_name(), "SAVE");
/// # Ok::<(), accel_keymap::core::entry::EntryError>(())
/// ```
pub fn make_entry(
    reference: &str,
    key: &str,
    filter: Option<&KeyFilter>,
    refs: &mut RefAllocator,
    log: &Logger,
) -> Result<AcceleratorEntry, EntryError> {
    let key = key.to_uppercase();

    if key.contains('/') {
        log.warn(format!("{} is invalid pattern.", key));
        return Err(EntryError::InvalidPattern(key));
    }

    let windows = filter.is_some_and(|f| f.is_modifier("WINDOWS"));

    let tokens = key.split('+').collect::<Vec<_>>();
    let mut flags = ModifierFlags::empty();
    let mut keys = Vec::new();

    for token in &tokens {
        match ModifierFlags::from_token(token, windows) {
            Some(flag) => flags |= flag,
            None => keys.push(*token),
        }
    }

    // A repeated modifier leaves the distinct count short of the token count
    if keys.len() != 1 || tokens.len() - keys.len() != flags.count() {
        log.warn(format!("{} is invalid pattern.", key));
        return Err(EntryError::InvalidPattern(key));
    }

    let code = match KeyCatalog::global().code_of(keys[0]) {
        Ok(code) => code,
        Err(_) => {
            log.warn(format!("keyname {} is wrong", keys[0]));
            return Err(EntryError::UnknownKeyName(keys[0].to_string()));
        }
    };

    if let Some(filter) = filter {
        if let Err(reason) = filter.validate(&key) {
            log.warn(format!("{}({}): {}", reference.to_uppercase(), key, reason));
            return Err(EntryError::Rejected { key, reason });
        }
    }

    let command = refs.resolve(reference);
    Ok(AcceleratorEntry::new(flags, code, command, reference))
}
