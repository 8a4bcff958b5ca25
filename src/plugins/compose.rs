//! `local` / `dev` invocation commands.
//!
//! Each command processes its `--mount` arguments and prints the resulting
//! bind-mount plan for the container runtime. Starting containers is left to
//! the runtime wrapper that consumes the plan.

use clap::{Parser, Subcommand};
use serde_json::json;

use crate::core::error::MountctlError;
use crate::core::output::{self, OutputFormat};
use crate::core::store::Store;
use crate::core::time;
use crate::mounts::{self, InvocationOutcome, Resolver};

#[derive(clap::Args, Debug, Clone, Default)]
pub struct MountArgs {
    /// Bind-mount a folder from the host in the right containers. Either
    /// explicit, 'service1[,service2...]:/host/path:/container/path', or
    /// implicit, '/host/path', resolved from the folder name.
    #[clap(short = 'm', long = "mount", value_name = "MOUNT")]
    pub mounts: Vec<String>,
    /// Resolve and print the plan without saving the mount state.
    #[clap(long)]
    pub dry_run: bool,
    /// Output format.
    #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
#[clap(about = "Mount-aware deployment commands")]
pub struct ComposeCli {
    #[clap(subcommand)]
    pub command: ComposeCommand,
}

#[derive(Subcommand, Debug)]
pub enum ComposeCommand {
    /// Run all or a selection of services
    Start {
        #[clap(flatten)]
        mount: MountArgs,
        /// Start in daemon mode
        #[clap(short = 'd', long)]
        detach: bool,
        /// Services to start (all when empty)
        services: Vec<String>,
    },
    /// Run a one-off command in a service container
    Run {
        #[clap(flatten)]
        mount: MountArgs,
        service: String,
        #[clap(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Run initialisation jobs
    Init {
        #[clap(flatten)]
        mount: MountArgs,
        /// Limit initialisation to this plugin or service
        #[clap(long)]
        limit: Option<String>,
    },
    /// Configure and launch the platform in one go
    Quickstart {
        #[clap(flatten)]
        mount: MountArgs,
        /// Do not prompt for configuration values
        #[clap(short = 'I', long)]
        non_interactive: bool,
    },
}

impl ComposeCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ComposeCommand::Start { .. } => "start",
            ComposeCommand::Run { .. } => "run",
            ComposeCommand::Init { .. } => "init",
            ComposeCommand::Quickstart { .. } => "quickstart",
        }
    }

    pub fn mount_args(&self) -> &MountArgs {
        match self {
            ComposeCommand::Start { mount, .. }
            | ComposeCommand::Run { mount, .. }
            | ComposeCommand::Init { mount, .. }
            | ComposeCommand::Quickstart { mount, .. } => mount,
        }
    }

    /// Command-specific details echoed with the plan.
    fn target(&self) -> serde_json::Value {
        match self {
            ComposeCommand::Start {
                detach, services, ..
            } => json!({ "services": services, "detach": detach }),
            ComposeCommand::Run { service, args, .. } => {
                json!({ "service": service, "args": args })
            }
            ComposeCommand::Init { limit, .. } => json!({ "limit": limit }),
            ComposeCommand::Quickstart {
                non_interactive, ..
            } => json!({ "non_interactive": non_interactive }),
        }
    }
}

pub fn run_compose_cli(
    store: &Store,
    resolver: &Resolver,
    cli: ComposeCli,
) -> Result<(), MountctlError> {
    let command = cli.command;
    let args = command.mount_args();
    let outcome = mounts::process_invocation(store, resolver, &args.mounts, args.dry_run)?;

    match args.format {
        OutputFormat::Json => {
            let envelope = time::command_envelope(
                &format!("{}.{}", store.mode, command.name()),
                outcome_json(&outcome, command.target(), args.dry_run),
            );
            println!(
                "{}",
                serde_json::to_string_pretty(&envelope).map_err(|e| {
                    MountctlError::StateError(format!("failed to render plan: {e}"))
                })?
            );
        }
        OutputFormat::Text => {
            print!("{}", summary_line(store, command.name(), &outcome, args.dry_run));
            print!("{}", output::render_plan(&outcome.plan));
        }
    }
    Ok(())
}

fn outcome_json(
    outcome: &InvocationOutcome,
    target: serde_json::Value,
    dry_run: bool,
) -> serde_json::Value {
    json!({
        "dry_run": dry_run,
        "supplied": outcome.supplied,
        "persisted": outcome.persisted,
        "generation": outcome.state.generation,
        "state_path": outcome.state_path.display().to_string(),
        "missing_host_paths": outcome
            .missing_host_paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>(),
        "target": target,
        "plan": outcome.plan.to_json(),
    })
}

fn summary_line(store: &Store, cmd: &str, outcome: &InvocationOutcome, dry_run: bool) -> String {
    let state_note = if outcome.supplied == 0 {
        format!("reusing saved mounts (generation {})", outcome.state.generation)
    } else if dry_run {
        "dry run, mount state not saved".to_string()
    } else {
        format!(
            "saved generation {} to {}",
            outcome.state.generation,
            outcome.state_path.display()
        )
    };
    format!(
        "{} {}: {} bind-mount(s), {}\n",
        store.mode,
        cmd,
        outcome.plan.binds().len(),
        state_note
    )
}
