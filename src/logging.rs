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

//! Named logger handles
//!
//! Components log through a `Logger` carrying a dotted name such as
//! `app.keymap`, so several registries in one process can be told apart.
//! Events go to `tracing`; the binary decides where they end up via
//! `init_subscriber`.

use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Environment variable holding per-target log directives.
pub const LOG_ENV: &str = "ACCEL_KEYMAP_LOG";

/// Leveled sink identified by a name-spaced logger name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Logger {
    name: String,
}

impl Logger {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Logger for a keymap registry owned by `prefix`, e.g. `app.keymap`.
    pub fn keymap(prefix: &str) -> Self {
        Self::new(format!("{}.keymap", prefix))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        tracing::debug!(logger = %self.name, "{}", message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        tracing::warn!(logger = %self.name, "{}", message.as_ref());
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::keymap("app")
    }
}

/// Verbosity requested on the command line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    pub const fn from_flags(verbose: bool, quiet: bool) -> Self {
        if verbose {
            Self::Verbose
        } else if quiet {
            Self::Quiet
        } else {
            Self::Normal
        }
    }

    pub const fn default_level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::DEBUG,
        }
    }
}

/// Builds the filter: `ACCEL_KEYMAP_LOG`, then `RUST_LOG`, then the flags.
pub fn build_env_filter(verbosity: Verbosity) -> EnvFilter {
    for var in [LOG_ENV, "RUST_LOG"] {
        if let Ok(directives) = std::env::var(var) {
            if let Ok(filter) = EnvFilter::try_new(&directives) {
                return filter;
            }
        }
    }
    EnvFilter::new(verbosity.default_level().as_str().to_lowercase())
}

/// Installs the stderr subscriber. Calling it twice is a no-op.
pub fn init_subscriber(verbosity: Verbosity) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(build_env_filter(verbosity))
        .with(fmt_layer)
        .try_init();
}
