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


//! CLI entry point for accel-keymap
//!
//! Provides a command-line interface for checking shortcuts against a key
//! policy, listing usable keys, inspecting keymap files, and rewriting them
//! in canonical form.

use clap::{Args, Parser, Subcommand};
use colored::*;
use indexmap::IndexMap;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use accel_keymap::config::KeymapFile;
use accel_keymap::core::{
    FilterPreset, KeyCategory, KeyFilter, KeymapRegistry, PermitAll, RefAllocator,
};
use accel_keymap::logging::{self, Verbosity};

#[derive(Parser)]
#[command(name = "accel-keymap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check key combinations against the key policy
    Check {
        /// Key combinations such as CTRL+SHIFT+S
        #[arg(required = true)]
        keys: Vec<String>,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// List usable keys grouped by category
    Keys {
        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// List the bindings of a keymap file
    List {
        #[command(flatten)]
        source: SourceArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Load a keymap file and write it back in canonical form
    Rewrite {
        #[command(flatten)]
        source: SourceArgs,

        /// Destination file (defaults to the source file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep a timestamped copy of the destination before writing
        #[arg(long)]
        backup: bool,
    },
}

/// Key policy options shared by every command
#[derive(Args, Clone, Debug)]
struct PolicyArgs {
    /// JSON filter preset to start from
    #[arg(long, value_name = "FILE")]
    preset: Option<PathBuf>,

    /// The view accepts text input (reserves editing shortcuts)
    #[arg(long)]
    input_char: bool,

    /// Bindings are defined by the application (allows ESCAPE, SPACE, ...)
    #[arg(long)]
    system: bool,

    /// Allow printable keys without a modifier
    #[arg(long)]
    arrow_char_key: bool,

    /// Accept WINDOWS as a modifier
    #[arg(long)]
    windows: bool,

    /// Additional reserved combination (repeatable)
    #[arg(long = "reserve", value_name = "PATTERN")]
    reserved: Vec<String>,
}

/// Keymap file options shared by `list` and `rewrite`
#[derive(Args, Clone, Debug)]
struct SourceArgs {
    /// Path to the keymap file
    #[arg(short, long)]
    config: PathBuf,

    /// Only read these sections (repeatable, case-insensitive)
    #[arg(short, long = "section", value_name = "NAME")]
    sections: Vec<String>,

    /// Merge colliding bindings instead of rejecting them
    #[arg(long)]
    allow_conflicts: bool,

    #[command(flatten)]
    policy: PolicyArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_subscriber(Verbosity::from_flags(cli.verbose, cli.quiet));

    match cli.command {
        Commands::Check { keys, policy } => check_keys(&keys, &policy)?,
        Commands::Keys { policy } => list_keys(&policy)?,
        Commands::List { source, json } => list_keymap(&source, json)?,
        Commands::Rewrite {
            source,
            output,
            backup,
        } => rewrite_keymap(&source, output.as_deref(), backup)?,
    }

    Ok(())
}

/// Expand tilde in path
fn expand_path(path: &Path) -> anyhow::Result<PathBuf> {
    let raw = path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid path encoding"))?;
    Ok(PathBuf::from(shellexpand::tilde(raw).as_ref()))
}

impl PolicyArgs {
    fn build(&self) -> anyhow::Result<KeyFilter> {
        let mut preset = match &self.preset {
            Some(path) => {
                let path = expand_path(path)?;
                let content = fs::read_to_string(&path)
                    .map_err(|e| anyhow::anyhow!("Failed to read preset {}: {}", path.display(), e))?;
                serde_json::from_str::<FilterPreset>(&content)
                    .map_err(|e| anyhow::anyhow!("Invalid preset {}: {}", path.display(), e))?
            }
            None => FilterPreset::default(),
        };

        preset.support_input_char |= self.input_char;
        preset.is_system |= self.system;
        preset.arrow_char_key |= self.arrow_char_key;
        preset.windows_modifier |= self.windows;
        preset.disabled_patterns.extend(self.reserved.iter().cloned());

        preset
            .build()
            .map_err(|e| anyhow::anyhow!("Invalid key policy: {}", e))
    }
}

/// Validate key combinations, exiting with 1 if any is rejected
fn check_keys(keys: &[String], policy: &PolicyArgs) -> anyhow::Result<()> {
    let mut filter = policy.build()?;
    let mut rejected = 0;

    for key in keys {
        if filter.check(key) {
            println!("{} {}", "✓".green().bold(), key.to_uppercase().cyan());
        } else {
            rejected += 1;
            let reason = filter
                .last_error()
                .map(ToString::to_string)
                .unwrap_or_default();
            println!(
                "{} {} {}",
                "✗".red().bold(),
                key.to_uppercase().cyan(),
                format!("({})", reason).dimmed()
            );
        }
    }

    if rejected > 0 {
        println!(
            "\n{} {} of {} rejected",
            "⚠".yellow(),
            rejected,
            keys.len()
        );
        std::process::exit(1);
    }

    Ok(())
}

/// Print usable keys per category, then the reserved combinations
fn list_keys(policy: &PolicyArgs) -> anyhow::Result<()> {
    let filter = policy.build()?;

    let groups = [
        (KeyCategory::Modifier, "Modifiers"),
        (KeyCategory::Function, "Usable alone"),
        (KeyCategory::Enable, "Need a modifier"),
        (KeyCategory::NoShiftEnable, "Need a non-SHIFT modifier"),
    ];

    for (category, title) in groups {
        let keys = filter.keys_in(category);
        if keys.is_empty() {
            continue;
        }
        println!("{} ({})", title.bold(), keys.len());
        println!("  {}\n", keys.join(" "));
    }

    println!("{}", "Reserved".bold());
    for pattern in filter.disabled_patterns() {
        println!("  {}", pattern.yellow());
    }

    Ok(())
}

#[derive(Serialize)]
struct ViewReport {
    view: String,
    entries: Vec<EntryReport>,
    rejected: IndexMap<String, String>,
}

#[derive(Serialize)]
struct EntryReport {
    key: String,
    command: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    merged: Vec<String>,
}

/// Build a registry from a keymap file
fn load_registry(source: &SourceArgs) -> anyhow::Result<(PathBuf, KeymapRegistry)> {
    let path = expand_path(&source.config)?;

    let mut registry = KeymapRegistry::new(RefAllocator::shared())
        .with_filter(source.policy.build()?)
        .with_log_prefix("cli");
    if source.allow_conflicts {
        registry = registry.with_conflict_policy(PermitAll);
    }

    let names = source.sections.iter().map(String::as_str).collect::<Vec<_>>();
    let selected = (!names.is_empty()).then_some(names.as_slice());

    registry
        .add_from_file(&path, selected)
        .map_err(|e| anyhow::anyhow!("Failed to load keymap: {}", e))?;

    Ok((path, registry))
}

fn collect_reports(registry: &mut KeymapRegistry) -> Vec<ViewReport> {
    let views = registry.views().map(str::to_string).collect::<Vec<_>>();

    views
        .into_iter()
        .map(|view| {
            let entries = registry
                .entries(&view)
                .iter()
                .map(|entry| EntryReport {
                    key: entry.to_raw_string(),
                    command: entry.ref_name().to_string(),
                    merged: registry
                        .original_entries(entry.command())
                        .iter()
                        .map(|original| original.ref_name().to_string())
                        .collect(),
                })
                .collect();
            let rejected = registry.take_errors(&view);

            ViewReport {
                view,
                entries,
                rejected,
            }
        })
        .collect()
}

/// List all bindings in the keymap
fn list_keymap(source: &SourceArgs, json: bool) -> anyhow::Result<()> {
    let (path, mut registry) = load_registry(source)?;
    let reports = collect_reports(&mut registry);

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    println!("{}", format!("Keymap from: {}\n", path.display()).bold());

    let mut total = 0;
    for report in &reports {
        println!("{}", format!("[{}]", report.view).magenta().bold());

        for entry in &report.entries {
            total += 1;
            if entry.merged.is_empty() {
                println!("  {} → {}", entry.key.cyan().bold(), entry.command.green());
            } else {
                println!(
                    "  {} → {} {}",
                    entry.key.cyan().bold(),
                    entry.merged.join(", ").green(),
                    "(merged)".dimmed()
                );
            }
        }

        for (reference, key_string) in &report.rejected {
            println!(
                "  {} {} = {}",
                "✗".red(),
                reference,
                key_string.dimmed()
            );
        }
        println!();
    }

    println!(
        "{} Total: {} bindings in {} views",
        "✓".green(),
        total,
        reports.len()
    );

    Ok(())
}

/// Load and save a keymap, dropping rejected bindings
fn rewrite_keymap(source: &SourceArgs, output: Option<&Path>, backup: bool) -> anyhow::Result<()> {
    let (path, mut registry) = load_registry(source)?;

    let output = match output {
        Some(output) => expand_path(output)?,
        None => path.clone(),
    };

    let mut file = KeymapFile::new(&output);
    if backup {
        file = file
            .with_backups()
            .map_err(|e| anyhow::anyhow!("Failed to prepare backups: {}", e))?;
    }

    let mut dropped = 0;
    let views = registry.views().map(str::to_string).collect::<Vec<_>>();
    for view in views {
        for (reference, key_string) in registry.take_errors(&view) {
            dropped += 1;
            println!(
                "{} dropping [{}] {} = {}",
                "⚠".yellow(),
                view,
                reference,
                key_string
            );
        }
    }

    registry
        .save(&file)
        .map_err(|e| anyhow::anyhow!("Failed to write keymap: {}", e))?;

    println!(
        "{} Wrote {}{}",
        "✓".green(),
        output.display(),
        if dropped > 0 {
            format!(" ({} rejected binding{} dropped)", dropped, if dropped == 1 { "" } else { "s" })
        } else {
            String::new()
        }
    );

    Ok(())
}
