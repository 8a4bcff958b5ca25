//! `mounts` command group: inspect and edit persisted bind-mounts.

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::json;
use std::path::{Path, PathBuf};

use crate::core::error::MountctlError;
use crate::core::output::{self, OutputFormat};
use crate::core::store::{EnvMode, Store};
use crate::core::time;
use crate::mounts::directive::{self, MountDirective, ParsedMount};
use crate::mounts::plan::MountPlan;
use crate::mounts::{Resolver, merge, state};

#[derive(Parser, Debug)]
#[clap(
    name = "mounts",
    about = "Manage host bind-mounts saved for local and dev deployments"
)]
pub struct MountsCli {
    #[clap(subcommand)]
    pub command: MountsCommand,
}

#[derive(Subcommand, Debug)]
pub enum MountsCommand {
    /// List saved bind-mounts
    List {
        #[clap(long, value_enum, default_value_t = EnvMode::Local)]
        mode: EnvMode,
        #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Add bind-mounts to the saved set, keeping existing ones
    Add {
        #[clap(required = true, value_name = "MOUNT")]
        mounts: Vec<String>,
        #[clap(long, value_enum, default_value_t = EnvMode::Local)]
        mode: EnvMode,
    },
    /// Remove saved bind-mounts by argument or host path
    Remove {
        #[clap(required = true, value_name = "MOUNT")]
        mounts: Vec<String>,
        #[clap(long, value_enum, default_value_t = EnvMode::Local)]
        mode: EnvMode,
    },
    /// Show the folder naming conventions for implicit mounts
    Conventions {
        #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

pub fn run_mounts_cli(
    root: &Path,
    resolver: &Resolver,
    cli: MountsCli,
) -> Result<(), MountctlError> {
    match cli.command {
        MountsCommand::List { mode, format } => list(&Store::new(root, mode), format),
        MountsCommand::Add { mounts, mode } => add(&Store::new(root, mode), resolver, &mounts),
        MountsCommand::Remove { mounts, mode } => {
            remove(&Store::new(root, mode), resolver, &mounts)
        }
        MountsCommand::Conventions { format } => conventions(resolver, format),
    }
}

fn fingerprint(s: &state::MountState) -> Result<String, MountctlError> {
    s.fingerprint()
        .map_err(|e| MountctlError::StateError(format!("failed to hash mount state: {e}")))
}

fn list(store: &Store, format: OutputFormat) -> Result<(), MountctlError> {
    let current = state::load_state(store)?;
    let digest = fingerprint(&current)?;
    match format {
        OutputFormat::Text => print!("{}", output::render_state(store.mode.as_str(), &current, &digest)),
        OutputFormat::Json => {
            let envelope = time::command_envelope(
                "mounts.list",
                json!({
                    "mode": store.mode,
                    "fingerprint": digest,
                    "state": current,
                    "plan": MountPlan::from_state(&current).to_json(),
                }),
            );
            println!("{}", render_json(&envelope)?);
        }
    }
    Ok(())
}

fn add(store: &Store, resolver: &Resolver, raws: &[String]) -> Result<(), MountctlError> {
    let previous = state::load_state(store)?;
    let resolution = resolver.resolve_all(raws)?;
    for d in &resolution.directives {
        println!("{} {}", "Adding bind-mount:".bright_green(), d.source);
    }
    let next = merge::append(&previous, resolution.directives);
    let path = state::save_state(store, &next)?;
    println!(
        "{} mounts saved to {} (generation {})",
        store.mode,
        path.display(),
        next.generation
    );
    Ok(())
}

/// Explicit arguments match on their exact text or their resolved triple;
/// implicit ones on their text or normalized host path.
fn matcher_for(resolver: &Resolver, raw: &str) -> Result<Box<dyn Fn(&MountDirective) -> bool>, MountctlError> {
    let source = raw.trim().to_string();
    match directive::parse_mount(raw)? {
        ParsedMount::Explicit(mut wanted) => {
            wanted.host_path = resolver.paths().normalize(&wanted.host_path)?;
            Ok(Box::new(move |d: &MountDirective| {
                d.source == source
                    || (d.services == wanted.services
                        && d.host_path == wanted.host_path
                        && d.container_path == wanted.container_path)
            }))
        }
        ParsedMount::Implicit { host_path } => {
            let host: PathBuf = resolver.paths().normalize(&host_path)?;
            Ok(Box::new(move |d: &MountDirective| {
                d.source == source || (!directive::is_explicit(&d.source) && d.host_path == host)
            }))
        }
    }
}

fn remove(store: &Store, resolver: &Resolver, raws: &[String]) -> Result<(), MountctlError> {
    let mut current = state::load_state(store)?;
    let original_generation = current.generation;
    for raw in raws {
        let matches = matcher_for(resolver, raw)?;
        let (next, removed) = merge::remove(&current, matches);
        if removed.is_empty() {
            return Err(MountctlError::NotFound(format!(
                "no saved {} bind-mount matches '{}'",
                store.mode, raw
            )));
        }
        for d in &removed {
            println!("{} {}", "Removing bind-mount:".bright_red(), d.source);
        }
        current = next;
    }
    if current.generation != original_generation {
        // one logical change, however many arguments
        current.generation = original_generation + 1;
        state::save_state(store, &current)?;
    }
    Ok(())
}

fn conventions(resolver: &Resolver, format: OutputFormat) -> Result<(), MountctlError> {
    let patterns = resolver.table().supported_patterns();
    let catalog = resolver.table().catalog();
    match format {
        OutputFormat::Text => {
            println!("Implicit mounts are resolved from the folder name:");
            for p in &patterns {
                println!("  {}", p);
            }
            println!("Anything else needs the explicit form: {}", directive::EXPLICIT_FORM);
            println!("<service> is one of: {}", catalog.enabled().join(", "));
        }
        OutputFormat::Json => {
            let envelope = time::command_envelope(
                "mounts.conventions",
                json!({
                    "patterns": patterns,
                    "explicit_form": directive::EXPLICIT_FORM,
                    "services": {
                        "known": catalog.known(),
                        "enabled": catalog.enabled(),
                    },
                }),
            );
            println!("{}", render_json(&envelope)?);
        }
    }
    Ok(())
}

fn render_json(value: &serde_json::Value) -> Result<String, MountctlError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| MountctlError::StateError(format!("failed to render output: {e}")))
}
