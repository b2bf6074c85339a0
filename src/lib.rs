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

//! Accelerator Keymap
//!
//! Shortcut key validation and per-view keymap management for desktop
//! applications with several windows or editing contexts.
//!
//! # Features
//!
//! - **Key policy:** Configurable filter deciding which modifier+key
//!   combinations are usable, with OS, text-editing and user reserved lists
//! - **Per-view registry:** Bindings grouped by view, one entry per trigger
//! - **Conflict merging:** Colliding bindings are rejected or merged under a
//!   synthetic command, as a caller-supplied policy decides
//! - **INI persistence:** Load and save keymaps, keeping unrelated sections,
//!   with atomic writes and optional timestamped backups
//!
//! # Architecture
//!
//! - **`core`:** Business logic (key catalogue, filter, entries, registry)
//! - **`config`:** File operations (INI parsing, atomic writes, backups)
//! - **`window`:** Accelerator tables and the window sink trait
//! - **`logging`:** Named loggers and subscriber setup
//!
//! # Examples
//!
//! ## Validating a shortcut
//!
//! ```
//! use accel_keymap::core::{KeyFilter, Rejection};
//!
//! let mut filter = KeyFilter::with_defaults(true, false, false);
//! assert!(filter.check("CTRL+SHIFT+C"));
//! assert!(!filter.check("CTRL+C"));
//! assert_eq!(filter.last_error(), Some(&Rejection::Reserved));
//! ```
//!
//! ## Loading a keymap
//!
//! ```no_run
//! use accel_keymap::core::{KeyFilter, KeymapRegistry, RefAllocator};
//!
//! let mut registry = KeymapRegistry::new(RefAllocator::shared())
//!     .with_filter(KeyFilter::with_defaults(true, false, false));
//! registry.add_from_file("/home/user/.config/app/keymap.ini", None)?;
//!
//! for (reference, key_string) in registry.take_errors("EDITOR") {
//!     eprintln!("{} = {} was rejected", reference, key_string);
//! }
//! # Ok::<(), accel_keymap::config::StorageError>(())
//! ```

pub mod config;
pub mod core;
pub mod logging;
pub mod window;

// Re-export commonly used types for convenience
pub use crate::core::{AcceleratorEntry, CommandRef, KeyFilter, KeymapRegistry, ModifierFlags, RefAllocator};
