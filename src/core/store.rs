//! Store abstraction for per-environment mount state.
//!
//! A project root holds one environment directory per deployment mode.
//! `local` and `dev` keep separate mount state, so mounting a checkout for
//! development never leaks into the production-like local deployment.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::error::MountctlError;

pub const ROOT_ENV_VAR: &str = "MOUNTCTL_ROOT";
pub const STATE_FILE_NAME: &str = "mounts.json";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Deployment mode discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvMode {
    /// Production-like single-host deployment
    Local,
    /// Development deployment with live code mounts
    Dev,
}

impl EnvMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvMode::Local => "local",
            EnvMode::Dev => "dev",
        }
    }
}

impl fmt::Display for EnvMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store handle for one environment mode of a project.
#[derive(Debug, Clone)]
pub struct Store {
    pub mode: EnvMode,
    /// Absolute path to the project root
    pub root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>, mode: EnvMode) -> Self {
        Store {
            mode,
            root: root.into(),
        }
    }

    pub fn env_dir(&self) -> PathBuf {
        self.root.join("env").join(self.mode.as_str())
    }

    pub fn mounts_state_path(&self) -> PathBuf {
        self.env_dir().join(STATE_FILE_NAME)
    }
}

/// Project configuration file; shared by both modes.
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Resolve the project root: explicit flag, then `MOUNTCTL_ROOT`, then `cwd`.
pub fn resolve_project_root(
    explicit: Option<&Path>,
    cwd: &Path,
) -> Result<PathBuf, MountctlError> {
    let raw = match explicit {
        Some(p) => p.to_path_buf(),
        None => match std::env::var_os(ROOT_ENV_VAR) {
            Some(v) if !v.is_empty() => PathBuf::from(v),
            _ => cwd.to_path_buf(),
        },
    };
    let root = if raw.is_absolute() {
        raw
    } else {
        cwd.join(raw)
    };
    if root.exists() && !root.is_dir() {
        return Err(MountctlError::PathError(format!(
            "project root {} is not a directory",
            root.display()
        )));
    }
    Ok(root)
}
