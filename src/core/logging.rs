//! Diagnostic logging setup.

use tracing_subscriber::filter::Directive;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV_VAR: &str = "MOUNTCTL_LOG";
const DEFAULT_DIRECTIVE: &str = "mountctl=warn";
const VERBOSE_DIRECTIVE: &str = "mountctl=debug";

/// `MOUNTCTL_LOG` (or the warn default), with `--verbose` applied last so it
/// sets the crate's own level to debug whatever the variable says.
pub fn build_filter(env_value: Option<&str>, verbose: bool) -> EnvFilter {
    let base = env_value
        .and_then(|v| EnvFilter::try_new(v).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE));
    if !verbose {
        return base;
    }
    match VERBOSE_DIRECTIVE.parse::<Directive>() {
        Ok(directive) => base.add_directive(directive),
        Err(_) => base,
    }
}

/// Install the global subscriber. Diagnostics go to stderr so stdout stays
/// parseable for `--format json`.
pub fn init(verbose: bool) {
    let env_value = std::env::var(LOG_ENV_VAR).ok();
    let filter = build_filter(env_value.as_deref(), verbose);

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init();
}
