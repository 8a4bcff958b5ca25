use std::env;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MountctlError {
    #[error("invalid mount '{raw}': {reason}")]
    ParseError { raw: String, reason: String },
    #[error(
        "no mount convention matches '{name}' (from '{raw}'). Supported folder names: {}. Use the explicit form 'service1[,service2...]:/host/path:/container/path' for anything else.",
        .supported.join(", ")
    )]
    UnresolvedMountError {
        raw: String,
        name: String,
        supported: Vec<String>,
    },
    #[error(
        "mount '{raw}' targets service '{service}', which is not enabled. Enabled services: {}",
        .enabled.join(", ")
    )]
    AmbiguousServiceError {
        raw: String,
        service: String,
        enabled: Vec<String>,
    },
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Mount state error: {0}")]
    StateError(String),
    #[error("Path error: {0}")]
    PathError(String),
    #[error("Environment variable error: {0}")]
    EnvVarError(#[from] env::VarError),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl MountctlError {
    pub fn parse(raw: &str, reason: impl Into<String>) -> Self {
        MountctlError::ParseError {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }

    /// Errors caused by user input rather than the environment.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            MountctlError::ParseError { .. }
                | MountctlError::UnresolvedMountError { .. }
                | MountctlError::AmbiguousServiceError { .. }
        )
    }
}
