//! Project configuration loaded from `<root>/config.toml`.
//!
//! Every section is optional. A missing file yields the built-in defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::core::error::MountctlError;

/// Services that run the platform code base and share its mounts.
pub const OPENEDX_SERVICES: &[&str] = &["lms", "cms", "lms-worker", "cms-worker", "lms-job", "cms-job"];

pub const DEFAULT_KNOWN_SERVICES: &[&str] = &[
    "lms",
    "cms",
    "lms-worker",
    "cms-worker",
    "lms-job",
    "cms-job",
    "mfe",
    "mysql",
    "mysql-job",
    "mongodb",
    "redis",
    "meilisearch",
    "caddy",
    "smtp",
    // micro-frontend dev services, one per `frontend-app-<app>` checkout
    "authn",
    "account",
    "communications",
    "course-authoring",
    "discussions",
    "gradebook",
    "learner-dashboard",
    "learner-record",
    "learning",
    "ora-grading",
    "profile",
];

pub const DEFAULT_CONTAINER_ROOT: &str = "/mnt";

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    pub services: ServicesConfig,
    pub mounts: MountsConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServicesConfig {
    /// Services currently enabled; defaults to every known service.
    pub enabled: Option<Vec<String>>,
    /// Full service catalog; defaults to [`DEFAULT_KNOWN_SERVICES`].
    pub known: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MountsConfig {
    pub container_root: String,
    pub warn_missing_host_paths: bool,
    pub exact: Vec<ExactRuleConfig>,
}

impl Default for MountsConfig {
    fn default() -> Self {
        MountsConfig {
            container_root: DEFAULT_CONTAINER_ROOT.to_string(),
            warn_missing_host_paths: true,
            exact: Vec::new(),
        }
    }
}

/// Extra reserved folder name declared by the project.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExactRuleConfig {
    pub name: String,
    pub services: Vec<String>,
    pub container_path: String,
}

/// Known and enabled services, validated against each other.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCatalog {
    known: Vec<String>,
    enabled: Vec<String>,
}

impl ServiceCatalog {
    pub fn new(known: Vec<String>, enabled: Vec<String>) -> Result<Self, MountctlError> {
        let known_set: BTreeSet<&str> = known.iter().map(String::as_str).collect();
        if let Some(unknown) = enabled.iter().find(|s| !known_set.contains(s.as_str())) {
            return Err(MountctlError::ConfigError(format!(
                "enabled service '{}' is not a known service",
                unknown
            )));
        }
        Ok(ServiceCatalog { known, enabled })
    }

    pub fn is_known(&self, service: &str) -> bool {
        self.known.iter().any(|s| s == service)
    }

    pub fn is_enabled(&self, service: &str) -> bool {
        self.enabled.iter().any(|s| s == service)
    }

    pub fn known(&self) -> &[String] {
        &self.known
    }

    pub fn enabled(&self) -> &[String] {
        &self.enabled
    }
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        let known: Vec<String> = DEFAULT_KNOWN_SERVICES.iter().map(|s| s.to_string()).collect();
        ServiceCatalog {
            enabled: known.clone(),
            known,
        }
    }
}

impl ProjectConfig {
    pub fn catalog(&self) -> Result<ServiceCatalog, MountctlError> {
        let known = self.services.known.clone().unwrap_or_else(|| {
            DEFAULT_KNOWN_SERVICES.iter().map(|s| s.to_string()).collect()
        });
        let enabled = self
            .services
            .enabled
            .clone()
            .unwrap_or_else(|| known.clone());
        ServiceCatalog::new(known, enabled)
    }

    pub fn validate(&self) -> Result<(), MountctlError> {
        if !self.mounts.container_root.starts_with('/') {
            return Err(MountctlError::ConfigError(format!(
                "mounts.container_root must be an absolute container path, got '{}'",
                self.mounts.container_root
            )));
        }
        let catalog = self.catalog()?;
        for rule in &self.mounts.exact {
            if rule.name.trim().is_empty() || rule.name.contains('/') {
                return Err(MountctlError::ConfigError(format!(
                    "mounts.exact name '{}' must be a plain folder name",
                    rule.name
                )));
            }
            if rule.services.is_empty() {
                return Err(MountctlError::ConfigError(format!(
                    "mounts.exact '{}' must list at least one service",
                    rule.name
                )));
            }
            if let Some(s) = rule.services.iter().find(|s| !catalog.is_known(s)) {
                return Err(MountctlError::ConfigError(format!(
                    "mounts.exact '{}' targets unknown service '{}'",
                    rule.name, s
                )));
            }
            if !rule.container_path.starts_with('/') {
                return Err(MountctlError::ConfigError(format!(
                    "mounts.exact '{}' container_path must be absolute",
                    rule.name
                )));
            }
        }
        Ok(())
    }
}

/// Load `config.toml`; a missing file is not an error.
pub fn load_config(path: &Path) -> Result<ProjectConfig, MountctlError> {
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }
    let content = fs::read_to_string(path).map_err(MountctlError::IoError)?;
    let config: ProjectConfig = toml::from_str(&content).map_err(|e| {
        MountctlError::ConfigError(format!("invalid config {}: {}", path.display(), e))
    })?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_config_yields_defaults() {
        let tmp = tempdir().unwrap();
        let config = load_config(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(config, ProjectConfig::default());
        assert_eq!(config.mounts.container_root, "/mnt");
        let catalog = config.catalog().unwrap();
        assert!(catalog.is_enabled("lms"));
        assert!(catalog.is_known("cms-job"));
    }

    #[test]
    fn parses_services_and_exact_rules() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[services]
enabled = ["lms", "lms-job"]

[mounts]
container_root = "/opt/mounts"

[[mounts.exact]]
name = "my-theme"
services = ["lms", "cms"]
container_path = "/openedx/themes/my-theme"
"#,
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.mounts.container_root, "/opt/mounts");
        assert!(config.mounts.warn_missing_host_paths);
        assert_eq!(config.mounts.exact.len(), 1);
        let catalog = config.catalog().unwrap();
        assert!(catalog.is_enabled("lms"));
        assert!(!catalog.is_enabled("cms"));
        assert!(catalog.is_known("cms"));
    }

    #[test]
    fn rejects_enabled_service_outside_catalog() {
        let config = ProjectConfig {
            services: ServicesConfig {
                enabled: Some(vec!["ghost".to_string()]),
                known: None,
            },
            mounts: MountsConfig::default(),
        };
        assert!(matches!(
            config.validate(),
            Err(MountctlError::ConfigError(_))
        ));
    }

    #[test]
    fn rejects_relative_container_root() {
        let mut config = ProjectConfig::default();
        config.mounts.container_root = "mnt".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_malformed_toml() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[mounts\ncontainer_root = 3").unwrap();
        assert!(matches!(
            load_config(&path),
            Err(MountctlError::ConfigError(_))
        ));
    }
}
