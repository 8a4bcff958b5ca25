//! mountctl: host bind-mounts for containerized platform services
//!
//! Developers work on the platform by bind-mounting host checkouts into the
//! containers that run them. `mountctl` turns `--mount` arguments into a
//! deterministic set of bind-mount declarations:
//!
//! - **explicit**: `lms,cms:~/src/theme:/openedx/themes/theme`
//! - **implicit**: `~/src/edx-platform`, resolved from the folder name
//!
//! # Lifecycle
//!
//! Mounts are saved per environment mode under `<root>/env/<mode>/mounts.json`.
//! The latest invocation that passes `--mount` wins: its directives replace
//! the saved set. An invocation without `--mount` reuses the saved set.
//! `mountctl mounts add` is the additive alternative.
//!
//! # Examples
//!
//! ```bash
//! # Mount a platform checkout and a virtualenv for development
//! mountctl dev start -m ~/src/edx-platform -m ~/src/venv-lms
//!
//! # Same mounts on the next start
//! mountctl dev start
//!
//! # Inspect what is saved
//! mountctl mounts list --mode dev
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: errors, configuration, stores, logging and output
//! - [`mounts`]: parser, convention resolver, merger, state and plan
//! - [`plugins`]: command surfaces (`local`/`dev`, `mounts`)

pub mod core;
pub mod mounts;
pub mod plugins;

mod cli;

use crate::core::{config, error, logging, store};
use crate::mounts::Resolver;
use crate::mounts::directive::PathContext;
use crate::plugins::{compose, mounts as mounts_cli};

use clap::Parser;
use cli::{Cli, Command};

pub fn run() -> Result<(), error::MountctlError> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Command::Version = cli.command {
        println!("v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let paths = PathContext::from_env()?;
    let root = store::resolve_project_root(cli.root.as_deref(), &paths.cwd)?;
    let config = config::load_config(&store::config_path(&root))?;
    let resolver = Resolver::from_config(&config, paths)?;
    tracing::debug!(root = %root.display(), "loaded project configuration");

    match cli.command {
        Command::Local(sub) => {
            compose::run_compose_cli(&store::Store::new(&root, store::EnvMode::Local), &resolver, sub)
        }
        Command::Dev(sub) => {
            compose::run_compose_cli(&store::Store::new(&root, store::EnvMode::Dev), &resolver, sub)
        }
        Command::Mounts(sub) => mounts_cli::run_mounts_cli(&root, &resolver, sub),
        Command::Version => Ok(()),
    }
}
