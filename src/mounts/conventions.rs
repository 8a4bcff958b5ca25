//! Folder-name conventions for implicit mounts.
//!
//! Rules are kept as an ordered list of tagged variants. Precedence is fixed
//! by tier: exact names, then `venv-<service>`, then package prefixes, then
//! `<service>-repository`. Within a tier, rules keep declaration order.

use std::path::Path;

use crate::core::config::{OPENEDX_SERVICES, ProjectConfig, ServiceCatalog};
use crate::core::error::MountctlError;
use crate::mounts::directive::{self, MountDirective};

pub const EDX_PLATFORM_DIR: &str = "edx-platform";
pub const SHARED_VENV_DIR: &str = "venv";
pub const VENV_CONTAINER_PATH: &str = "/openedx/venv";
pub const MFE_CONTAINER_PATH: &str = "/openedx/app";

/// Platform packages that are mounted like plugins even without a prefix.
pub const PLATFORM_PACKAGES: &[&str] = &["edx-ora2", "edx-search", "edx-enterprise", "openedx-learning"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Basename equals the name.
    Exact(String),
    /// `<prefix><service>`, where the service must be enabled.
    Parametrized(String),
    /// `<prefix><anything>`, remainder non-empty.
    Prefix(String),
    /// `<service><suffix>` for a known service.
    ServiceSuffix(String),
}

impl Matcher {
    fn tier(&self) -> u8 {
        match self {
            Matcher::Exact(_) => 0,
            Matcher::Parametrized(_) => 1,
            Matcher::Prefix(_) => 2,
            Matcher::ServiceSuffix(_) => 3,
        }
    }

    /// Human-readable pattern, as listed in resolution errors.
    pub fn pattern(&self) -> String {
        match self {
            Matcher::Exact(name) => name.clone(),
            Matcher::Parametrized(prefix) => format!("{}<service>", prefix),
            Matcher::Prefix(prefix) => format!("{}*", prefix),
            Matcher::ServiceSuffix(suffix) => format!("<service>{}", suffix),
        }
    }
}

/// How a rule derives target services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceTarget {
    Fixed(Vec<String>),
    /// The captured parameter itself.
    Param,
    /// The parameter, plus `<param>-job` when that service is known.
    ParamWithJob,
}

impl ServiceTarget {
    fn names_service(&self) -> bool {
        !matches!(self, ServiceTarget::Fixed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionRule {
    pub matcher: Matcher,
    pub services: ServiceTarget,
    /// Supports `{root}`, `{name}` and `{param}` placeholders.
    pub container_path: String,
}

impl ConventionRule {
    pub fn exact<S: Into<String>>(
        name: &str,
        services: impl IntoIterator<Item = S>,
        container_path: &str,
    ) -> Self {
        ConventionRule {
            matcher: Matcher::Exact(name.to_string()),
            services: ServiceTarget::Fixed(services.into_iter().map(Into::into).collect()),
            container_path: container_path.to_string(),
        }
    }
}

enum RuleMatch<'a> {
    Miss,
    Hit(Option<&'a str>),
}

/// Ordered rule table bound to a service catalog.
#[derive(Debug, Clone)]
pub struct ConventionTable {
    rules: Vec<ConventionRule>,
    catalog: ServiceCatalog,
    container_root: String,
}

impl ConventionTable {
    pub fn new(
        mut rules: Vec<ConventionRule>,
        catalog: ServiceCatalog,
        container_root: impl Into<String>,
    ) -> Self {
        // stable: declaration order survives within a tier
        rules.sort_by_key(|r| r.matcher.tier());
        ConventionTable {
            rules,
            catalog,
            container_root: container_root.into(),
        }
    }

    pub fn builtin(catalog: ServiceCatalog, container_root: impl Into<String>) -> Self {
        Self::new(builtin_rules(), catalog, container_root)
    }

    /// Built-in rules plus the project's `[[mounts.exact]]` entries, which
    /// take precedence over built-in exact names.
    pub fn from_config(config: &ProjectConfig) -> Result<Self, MountctlError> {
        config.validate()?;
        let mut rules: Vec<ConventionRule> = config
            .mounts
            .exact
            .iter()
            .map(|r| ConventionRule::exact(&r.name, r.services.clone(), &r.container_path))
            .collect();
        rules.extend(builtin_rules());
        Ok(Self::new(
            rules,
            config.catalog()?,
            config.mounts.container_root.clone(),
        ))
    }

    pub fn rules(&self) -> &[ConventionRule] {
        &self.rules
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    pub fn supported_patterns(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for rule in &self.rules {
            let p = rule.matcher.pattern();
            if !out.contains(&p) {
                out.push(p);
            }
        }
        out
    }

    /// Resolve a normalized host path. `raw` is the original argument and is
    /// only used for the directive's `source` and error messages.
    pub fn resolve(&self, raw: &str, host_path: &Path) -> Result<MountDirective, MountctlError> {
        let name = host_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if name.is_empty() {
            return Err(self.unresolved(raw, &host_path.display().to_string()));
        }

        for rule in &self.rules {
            let param = match self.match_rule(&rule.matcher, name) {
                RuleMatch::Miss => continue,
                RuleMatch::Hit(param) => param,
            };
            if let Some(service) = param.filter(|_| rule.services.names_service()) {
                match rule.matcher {
                    // a prefix only claims names that are services
                    Matcher::Prefix(_)
                        if !directive::is_valid_service_name(service)
                            || !self.catalog.is_known(service) =>
                    {
                        continue;
                    }
                    Matcher::Parametrized(_) | Matcher::Prefix(_)
                        if !self.catalog.is_enabled(service) =>
                    {
                        return Err(MountctlError::AmbiguousServiceError {
                            raw: raw.to_string(),
                            service: service.to_string(),
                            enabled: self.catalog.enabled().to_vec(),
                        });
                    }
                    _ => {}
                }
            }
            let services = self.target_services(&rule.services, param);
            let container_path = rule
                .container_path
                .replace("{root}", self.container_root.trim_end_matches('/'))
                .replace("{name}", name)
                .replace("{param}", param.unwrap_or(name));
            tracing::debug!(
                name,
                pattern = %rule.matcher.pattern(),
                container_path = %container_path,
                "resolved implicit mount"
            );
            return Ok(MountDirective::new(services, host_path, container_path, raw));
        }

        Err(self.unresolved(raw, name))
    }

    fn match_rule<'a>(&self, matcher: &Matcher, name: &'a str) -> RuleMatch<'a> {
        match matcher {
            Matcher::Exact(exact) if name == exact.as_str() => RuleMatch::Hit(None),
            Matcher::Parametrized(prefix) | Matcher::Prefix(prefix) => match name.strip_prefix(prefix.as_str()) {
                Some(rest) if !rest.is_empty() => RuleMatch::Hit(Some(rest)),
                _ => RuleMatch::Miss,
            },
            Matcher::ServiceSuffix(suffix) => match name.strip_suffix(suffix.as_str()) {
                Some(service) if self.catalog.is_known(service) => RuleMatch::Hit(Some(service)),
                _ => RuleMatch::Miss,
            },
            _ => RuleMatch::Miss,
        }
    }

    fn target_services(&self, target: &ServiceTarget, param: Option<&str>) -> Vec<String> {
        match (target, param) {
            (ServiceTarget::Fixed(services), _) => services.clone(),
            (ServiceTarget::Param, Some(p)) => vec![p.to_string()],
            (ServiceTarget::ParamWithJob, Some(p)) => {
                let mut services = vec![p.to_string()];
                let job = format!("{}-job", p);
                if self.catalog.is_known(&job) {
                    services.push(job);
                }
                services
            }
            // parameterless rules cannot carry parameter targets
            (_, None) => Vec::new(),
        }
    }

    fn unresolved(&self, raw: &str, name: &str) -> MountctlError {
        MountctlError::UnresolvedMountError {
            raw: raw.to_string(),
            name: name.to_string(),
            supported: self.supported_patterns(),
        }
    }
}

fn openedx() -> Vec<String> {
    OPENEDX_SERVICES.iter().map(|s| s.to_string()).collect()
}

pub fn builtin_rules() -> Vec<ConventionRule> {
    let mut rules = vec![
        ConventionRule::exact(EDX_PLATFORM_DIR, openedx(), "/openedx/edx-platform"),
        ConventionRule::exact(SHARED_VENV_DIR, openedx(), VENV_CONTAINER_PATH),
    ];
    rules.extend(
        PLATFORM_PACKAGES
            .iter()
            .map(|name| ConventionRule::exact(name, openedx(), "{root}/{name}")),
    );
    rules.push(ConventionRule {
        matcher: Matcher::Parametrized("venv-".to_string()),
        services: ServiceTarget::ParamWithJob,
        container_path: VENV_CONTAINER_PATH.to_string(),
    });
    for prefix in ["xblock-", "platform-plugin-"] {
        rules.push(ConventionRule {
            matcher: Matcher::Prefix(prefix.to_string()),
            services: ServiceTarget::Fixed(openedx()),
            container_path: "{root}/{name}".to_string(),
        });
    }
    rules.push(ConventionRule {
        matcher: Matcher::Prefix("frontend-app-".to_string()),
        services: ServiceTarget::Param,
        container_path: MFE_CONTAINER_PATH.to_string(),
    });
    rules.push(ConventionRule {
        matcher: Matcher::ServiceSuffix("-repository".to_string()),
        services: ServiceTarget::Param,
        container_path: "{root}/{name}".to_string(),
    });
    rules
}
