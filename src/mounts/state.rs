//! Persisted mount state, one file per environment mode.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;

use crate::core::error::MountctlError;
use crate::core::store::Store;
use crate::core::time;
use crate::mounts::directive::MountDirective;

pub const MOUNT_STATE_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountState {
    pub schema_version: String,
    /// Bumped every time the directive set changes.
    pub generation: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invocation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub directives: Vec<MountDirective>,
}

impl Default for MountState {
    fn default() -> Self {
        MountState {
            schema_version: MOUNT_STATE_SCHEMA_VERSION.to_string(),
            generation: 0,
            invocation_id: None,
            updated_at: None,
            directives: Vec::new(),
        }
    }
}

impl MountState {
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Next generation holding `directives`, stamped with a fresh invocation id.
    pub fn successor(&self, directives: Vec<MountDirective>) -> Self {
        MountState {
            schema_version: MOUNT_STATE_SCHEMA_VERSION.to_string(),
            generation: self.generation + 1,
            invocation_id: Some(time::new_invocation_id()),
            updated_at: Some(time::state_timestamp()),
            directives,
        }
    }

    pub fn canonical_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.directives)
    }

    /// SHA-256 over the directive list only, so two states with the same
    /// mounts compare equal regardless of when they were written.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let bytes = self.canonical_json_bytes()?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

/// Load the state for `store.mode`. A missing file is an empty state.
pub fn load_state(store: &Store) -> Result<MountState, MountctlError> {
    let path = store.mounts_state_path();
    if !path.exists() {
        return Ok(MountState::default());
    }
    let raw = fs::read_to_string(&path).map_err(MountctlError::IoError)?;
    let state: MountState = serde_json::from_str(&raw).map_err(|e| {
        MountctlError::StateError(format!("invalid mount state {}: {}", path.display(), e))
    })?;
    let major = state.schema_version.split('.').next().unwrap_or_default();
    if major != "1" {
        return Err(MountctlError::StateError(format!(
            "unsupported mount state schema {} in {}",
            state.schema_version,
            path.display()
        )));
    }
    Ok(state)
}

/// Write via a sibling temp file and rename, so readers never see a torn file.
pub fn save_state(store: &Store, state: &MountState) -> Result<PathBuf, MountctlError> {
    let path = store.mounts_state_path();
    let parent = path.parent().ok_or_else(|| {
        MountctlError::PathError(format!("invalid state path {}", path.display()))
    })?;
    fs::create_dir_all(parent).map_err(MountctlError::IoError)?;

    let bytes = serde_json::to_vec_pretty(state).map_err(|e| {
        MountctlError::StateError(format!("failed to serialize mount state: {e}"))
    })?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).map_err(MountctlError::IoError)?;
    fs::rename(&tmp, &path).map_err(MountctlError::IoError)?;
    tracing::debug!(path = %path.display(), generation = state.generation, "saved mount state");
    Ok(path)
}
