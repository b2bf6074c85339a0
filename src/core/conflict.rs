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

//! src/core/conflict.rs
//!
//! Conflict policies for colliding bindings
//!
//! When a new binding fires on the same physical trigger as bindings already
//! registered in the view, the registry asks a `ConflictPolicy` whether the
//! collision may be merged. The candidate list holds the existing entries
//! first and the new entry last.
//!
//! Any `Fn(&[AcceleratorEntry], &Logger) -> bool` closure is a policy.

use crate::core::types::AcceleratorEntry;
use crate::logging::Logger;

/// Decides whether colliding bindings may share one trigger.
pub trait ConflictPolicy {
    /// Returns `true` to merge `candidates` under a shared command.
    fn permit(&self, candidates: &[AcceleratorEntry], log: &Logger) -> bool;
}

impl<F> ConflictPolicy for F
where
    F: Fn(&[AcceleratorEntry], &Logger) -> bool,
{
    fn permit(&self, candidates: &[AcceleratorEntry], log: &Logger) -> bool {
        self(candidates, log)
    }
}

/// Merges every collision.
#[derive(Clone, Copy, Debug, Default)]
pub struct PermitAll;

impl ConflictPolicy for PermitAll {
    fn permit(&self, candidates: &[AcceleratorEntry], log: &Logger) -> bool {
        log.debug(format!(
            "merging {} bindings on {}",
            candidates.len(),
            candidates
                .first()
                .map(AcceleratorEntry::to_raw_string)
                .unwrap_or_default()
        ));
        true
    }
}

/// Refuses every collision; equivalent to registering no policy.
#[derive(Clone, Copy, Debug, Default)]
pub struct DenyAll;

impl ConflictPolicy for DenyAll {
    fn permit(&self, _candidates: &[AcceleratorEntry], _log: &Logger) -> bool {
        false
    }
}

/// Merges collisions only between the listed commands.
///
/// Useful when a few commands are known to be context-exclusive (for
/// example "play" and "pause" sharing SPACE) while everything else must stay
/// unique.
#[derive(Clone, Debug, Default)]
pub struct PermitRefs {
    names: Vec<String>,
}

impl PermitRefs {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|name| name.as_ref().to_uppercase())
                .collect(),
        }
    }
}

impl ConflictPolicy for PermitRefs {
    fn permit(&self, candidates: &[AcceleratorEntry], log: &Logger) -> bool {
        let permitted = candidates
            .iter()
            .all(|entry| self.names.iter().any(|name| name == entry.ref_name()));

        if !permitted {
            log.debug(format!(
                "conflict between {} not in the permitted set",
                candidates
                    .iter()
                    .map(AcceleratorEntry::ref_name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
        permitted
    }
}
