//! Mount resolution pipeline.
//!
//! raw `--mount` strings → [`directive::parse_mount`] → convention lookup for
//! implicit forms → host path normalization → [`merge::next_state`] against
//! the persisted [`state::MountState`] → [`plan::MountPlan`].
//!
//! Every argument is resolved before anything is written: a bad argument
//! aborts the invocation with the previous state intact.

pub mod conventions;
pub mod directive;
pub mod merge;
pub mod plan;
pub mod state;

use std::path::PathBuf;

use crate::core::config::ProjectConfig;
use crate::core::error::MountctlError;
use crate::core::store::Store;
use conventions::ConventionTable;
use directive::{MountDirective, ParsedMount, PathContext};
use plan::MountPlan;
use state::MountState;

/// Directives resolved from one invocation, in argument order.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub directives: Vec<MountDirective>,
    /// Host paths that do not exist yet. Advisory only.
    pub missing_host_paths: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Resolver {
    table: ConventionTable,
    paths: PathContext,
    warn_missing_host_paths: bool,
}

impl Resolver {
    pub fn new(table: ConventionTable, paths: PathContext) -> Self {
        Resolver {
            table,
            paths,
            warn_missing_host_paths: true,
        }
    }

    pub fn from_config(config: &ProjectConfig, paths: PathContext) -> Result<Self, MountctlError> {
        Ok(Resolver::new(ConventionTable::from_config(config)?, paths)
            .with_missing_path_warnings(config.mounts.warn_missing_host_paths))
    }

    pub fn with_missing_path_warnings(mut self, enabled: bool) -> Self {
        self.warn_missing_host_paths = enabled;
        self
    }

    pub fn table(&self) -> &ConventionTable {
        &self.table
    }

    pub fn paths(&self) -> &PathContext {
        &self.paths
    }

    /// Parse, resolve and normalize a single argument.
    pub fn resolve_one(&self, raw: &str) -> Result<MountDirective, MountctlError> {
        match directive::parse_mount(raw)? {
            ParsedMount::Explicit(mut d) => {
                d.host_path = self.paths.normalize(&d.host_path)?;
                Ok(d)
            }
            ParsedMount::Implicit { host_path } => {
                let host_path = self.paths.normalize(&host_path)?;
                self.table.resolve(raw.trim(), &host_path)
            }
        }
    }

    pub fn resolve_all(&self, raws: &[String]) -> Result<Resolution, MountctlError> {
        let mut resolution = Resolution::default();
        for raw in raws {
            let d = self.resolve_one(raw)?;
            if !d.host_path.exists() && !resolution.missing_host_paths.contains(&d.host_path) {
                resolution.missing_host_paths.push(d.host_path.clone());
            }
            resolution.directives.push(d);
        }
        if self.warn_missing_host_paths {
            for path in &resolution.missing_host_paths {
                tracing::warn!(
                    path = %path.display(),
                    "host path does not exist; the container runtime will create it on mount"
                );
            }
        }
        Ok(resolution)
    }
}

#[derive(Debug, Clone)]
pub struct InvocationOutcome {
    pub state: MountState,
    pub plan: MountPlan,
    /// Number of `--mount` arguments supplied.
    pub supplied: usize,
    pub persisted: bool,
    pub state_path: PathBuf,
    pub missing_host_paths: Vec<PathBuf>,
}

/// Run one mount-aware command's mount processing: load, resolve, merge and
/// (unless `dry_run`) persist when directives were supplied.
pub fn process_invocation(
    store: &Store,
    resolver: &Resolver,
    raws: &[String],
    dry_run: bool,
) -> Result<InvocationOutcome, MountctlError> {
    let previous = state::load_state(store)?;
    let resolution = resolver.resolve_all(raws)?;
    let next = merge::next_state(&previous, resolution.directives);

    let persisted = !raws.is_empty() && !dry_run;
    if persisted {
        state::save_state(store, &next)?;
    }
    tracing::debug!(
        mode = %store.mode,
        supplied = raws.len(),
        generation = next.generation,
        persisted,
        "processed mount arguments"
    );

    Ok(InvocationOutcome {
        plan: MountPlan::from_state(&next),
        state: next,
        supplied: raws.len(),
        persisted,
        state_path: store.mounts_state_path(),
        missing_host_paths: resolution.missing_host_paths,
    })
}
