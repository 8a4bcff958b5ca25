//! CLI struct definitions for the mountctl command-line interface.
//!
//! Subcommand argument types live next to their handlers in `plugins/`.

use crate::plugins::{compose, mounts};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "mountctl",
    version = env!("CARGO_PKG_VERSION"),
    about = "Resolve, merge and persist host bind-mounts for local and dev deployments.",
    disable_version_flag = true
)]
pub(crate) struct Cli {
    /// Project root (defaults to $MOUNTCTL_ROOT, then the current directory).
    #[clap(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,
    /// Enable debug diagnostics on stderr.
    #[clap(short = 'v', long, global = true)]
    pub verbose: bool,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Production-like single-host deployment
    #[clap(name = "local", visible_alias = "l")]
    Local(compose::ComposeCli),

    /// Development deployment
    #[clap(name = "dev", visible_alias = "d")]
    Dev(compose::ComposeCli),

    /// Manage saved bind-mounts
    #[clap(name = "mounts", visible_alias = "m")]
    Mounts(mounts::MountsCli),

    /// Show version information
    #[clap(name = "version")]
    Version,
}
