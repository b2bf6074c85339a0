// Copyright 2025 bakri (tidynest@proton.me)
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

//! src/core/mod.rs
//!
//! Core business logic module
//!
//! Everything needed to validate shortcuts and build per-view keymaps:
//! - `catalog`: the static key name <-> key code table
//! - `filter`: the configurable key policy and its reserved patterns
//! - `entry`: parsing one key combination into an accelerator entry
//! - `conflict`: policies deciding whether colliding bindings merge
//! - `registry`: the per-view store tying it together
//!
//! Nothing here touches a GUI toolkit; file I/O is confined to the
//! registry's load/save helpers, which go through `config`.

pub mod catalog;
pub mod conflict;
pub mod entry;
pub mod filter;
pub mod refs;
pub mod registry;
pub mod types;

pub use catalog::{KeyCatalog, KeyCode, KeyGroup, UnknownKey};
pub use conflict::{ConflictPolicy, DenyAll, PermitAll, PermitRefs};
pub use entry::{make_entry, EntryError};
pub use filter::{FilterPreset, KeyCategory, KeyFilter, Rejection};
pub use refs::{RefAllocator, SharedRefAllocator, FIRST_REF};
pub use registry::KeymapRegistry;
pub use types::{AcceleratorEntry, CommandRef, ModifierFlags, Trigger};

#[cfg(test)]
mod tests;
