//! Flattened bind-mount plan handed to the container runtime.

use serde::Serialize;
use serde_json::{Value as JsonValue, json};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::mounts::state::MountState;

pub const JOB_SUFFIX: &str = "-job";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindMount {
    pub service: String,
    pub host_path: PathBuf,
    pub container_path: String,
}

impl BindMount {
    /// One-shot job containers get their binds in a separate compose file.
    pub fn is_job(&self) -> bool {
        self.service.ends_with(JOB_SUFFIX)
    }

    /// Compose `volumes` entry.
    pub fn volume(&self) -> String {
        format!("{}:{}", self.host_path.to_string_lossy(), self.container_path)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountPlan {
    binds: Vec<BindMount>,
}

impl MountPlan {
    pub fn from_state(state: &MountState) -> Self {
        let binds = state
            .directives
            .iter()
            .flat_map(|d| {
                d.services.iter().map(move |service| BindMount {
                    service: service.clone(),
                    host_path: d.host_path.clone(),
                    container_path: d.container_path.clone(),
                })
            })
            .collect();
        MountPlan { binds }
    }

    pub fn binds(&self) -> &[BindMount] {
        &self.binds
    }

    pub fn is_empty(&self) -> bool {
        self.binds.is_empty()
    }

    pub fn app_binds(&self) -> impl Iterator<Item = &BindMount> {
        self.binds.iter().filter(|b| !b.is_job())
    }

    pub fn job_binds(&self) -> impl Iterator<Item = &BindMount> {
        self.binds.iter().filter(|b| b.is_job())
    }

    /// Distinct services in first-appearance order.
    pub fn services(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for bind in &self.binds {
            if !out.contains(&bind.service.as_str()) {
                out.push(&bind.service);
            }
        }
        out
    }

    pub fn to_json(&self) -> JsonValue {
        json!({
            "binds": self.binds,
            "services": self.services(),
            "compose": {
                "app": compose_services(self.app_binds()),
                "jobs": compose_services(self.job_binds()),
            }
        })
    }
}

/// `{service: {volumes: [...]}}`, volumes in plan order.
pub fn compose_services<'a>(binds: impl Iterator<Item = &'a BindMount>) -> JsonValue {
    let mut grouped: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for bind in binds {
        grouped.entry(&bind.service).or_default().push(bind.volume());
    }
    let services: serde_json::Map<String, JsonValue> = grouped
        .into_iter()
        .map(|(service, volumes)| (service.to_string(), json!({ "volumes": volumes })))
        .collect();
    JsonValue::Object(services)
}
