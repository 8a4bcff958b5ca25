//! `--mount` argument parsing and host path normalization.
//!
//! Two forms are accepted:
//!
//! - explicit: `service1[,service2...]:/host/path:/container/path`
//! - implicit: `/host/path`, resolved later from the folder name
//!
//! Colons are the field separator, so neither path may contain one.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use crate::core::error::MountctlError;

pub const EXPLICIT_FORM: &str = "service1[,service2...]:/host/path:/container/path";

/// A fully qualified bind-mount request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountDirective {
    pub services: BTreeSet<String>,
    pub host_path: PathBuf,
    pub container_path: String,
    /// Argument this directive was parsed from.
    pub source: String,
}

impl MountDirective {
    pub fn new<I, S>(
        services: I,
        host_path: impl Into<PathBuf>,
        container_path: impl Into<String>,
        source: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let container_path: String = container_path.into();
        MountDirective {
            services: services.into_iter().map(Into::into).collect(),
            host_path: host_path.into(),
            container_path: clean_container_path(&container_path),
            source: source.into(),
        }
    }

    /// `(service, container_path)` pairs claimed by this directive.
    pub fn targets(&self) -> impl Iterator<Item = (&str, &str)> {
        self.services
            .iter()
            .map(move |s| (s.as_str(), self.container_path.as_str()))
    }
}

/// Result of parsing one `--mount` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedMount {
    Explicit(MountDirective),
    /// Host path only; services and container path come from conventions.
    Implicit { host_path: PathBuf },
}

fn service_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("static regex"))
}

pub fn is_valid_service_name(name: &str) -> bool {
    service_name_re().is_match(name)
}

/// Fold `.`, `..`, repeated and trailing slashes of an absolute container
/// path, so `/openedx/app/` and `/openedx/./app` name the same target.
/// Container paths are POSIX whatever the host platform is.
pub fn clean_container_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    format!("/{}", parts.join("/"))
}

pub fn parse_mount(raw: &str) -> Result<ParsedMount, MountctlError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(MountctlError::parse(raw, "empty mount"));
    }

    let segments: Vec<&str> = value.split(':').collect();
    match segments.as_slice() {
        [path] => Ok(ParsedMount::Implicit {
            host_path: PathBuf::from(path),
        }),
        [services, host_path, container_path] => {
            let services = parse_services(raw, services)?;
            let host_path = host_path.trim();
            if host_path.is_empty() {
                return Err(MountctlError::parse(raw, "empty host path"));
            }
            let container_path = container_path.trim();
            if container_path.is_empty() {
                return Err(MountctlError::parse(raw, "empty container path"));
            }
            if !container_path.starts_with('/') {
                return Err(MountctlError::parse(
                    raw,
                    format!("container path '{}' must be absolute", container_path),
                ));
            }
            Ok(ParsedMount::Explicit(MountDirective {
                services,
                host_path: PathBuf::from(host_path),
                container_path: clean_container_path(container_path),
                source: value.to_string(),
            }))
        }
        other => Err(MountctlError::parse(
            raw,
            format!(
                "expected '{}' (3 ':'-separated fields), got {} fields",
                EXPLICIT_FORM,
                other.len()
            ),
        )),
    }
}

fn parse_services(raw: &str, list: &str) -> Result<BTreeSet<String>, MountctlError> {
    if list.trim().is_empty() {
        return Err(MountctlError::parse(raw, "empty service list"));
    }
    let mut services = BTreeSet::new();
    for service in list.split(',').map(str::trim) {
        if service.is_empty() {
            return Err(MountctlError::parse(
                raw,
                format!("incorrect services syntax: '{}'", list),
            ));
        }
        if !is_valid_service_name(service) {
            return Err(MountctlError::parse(
                raw,
                format!("invalid service name '{}'", service),
            ));
        }
        services.insert(service.to_string());
    }
    Ok(services)
}

/// Whether an argument uses the explicit three-field form.
pub fn is_explicit(raw: &str) -> bool {
    raw.contains(':')
}

/// Working directory and home used to make host paths absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathContext {
    pub cwd: PathBuf,
    pub home: Option<PathBuf>,
}

impl PathContext {
    pub fn new(cwd: impl Into<PathBuf>, home: Option<PathBuf>) -> Self {
        PathContext {
            cwd: cwd.into(),
            home,
        }
    }

    pub fn from_env() -> Result<Self, MountctlError> {
        Ok(PathContext {
            cwd: std::env::current_dir()?,
            home: dirs::home_dir(),
        })
    }

    /// Expand `~`, anchor relative paths at `cwd`, then fold `.`/`..`.
    /// The path does not need to exist.
    pub fn normalize(&self, raw: &Path) -> Result<PathBuf, MountctlError> {
        let expanded = match raw.strip_prefix("~") {
            Ok(rest) => {
                let home = self.home.as_ref().ok_or_else(|| {
                    MountctlError::PathError(format!(
                        "cannot expand '{}': home directory is unknown",
                        raw.display()
                    ))
                })?;
                home.join(rest)
            }
            Err(_) => raw.to_path_buf(),
        };
        let absolute = if expanded.is_absolute() {
            expanded
        } else {
            self.cwd.join(expanded)
        };
        Ok(lexical_clean(&absolute))
    }
}

fn lexical_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                if out.parent().is_some() {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> PathContext {
        PathContext::new("/work/project", Some(PathBuf::from("/home/dev")))
    }

    #[test]
    fn explicit_form_splits_services_and_paths() {
        let parsed = parse_mount("s1,s2:a/b:/c/d").unwrap();
        let ParsedMount::Explicit(d) = parsed else {
            panic!("expected explicit mount");
        };
        assert_eq!(d.services, BTreeSet::from(["s1".to_string(), "s2".to_string()]));
        assert_eq!(d.host_path, PathBuf::from("a/b"));
        assert_eq!(d.container_path, "/c/d");
        assert_eq!(d.source, "s1,s2:a/b:/c/d");
    }

    #[test]
    fn explicit_form_trims_service_names() {
        let ParsedMount::Explicit(d) = parse_mount("lms, cms-worker:/src:/dst").unwrap() else {
            panic!("expected explicit mount");
        };
        assert!(d.services.contains("cms-worker"));
        assert_eq!(d.services.len(), 2);
    }

    #[test]
    fn container_path_is_folded() {
        let ParsedMount::Explicit(d) = parse_mount("lms:/src:/openedx/edx-platform/").unwrap() else {
            panic!("expected explicit mount");
        };
        assert_eq!(d.container_path, "/openedx/edx-platform");
        assert_eq!(clean_container_path("/"), "/");
        assert_eq!(clean_container_path("//openedx/./venv/../app//"), "/openedx/app");
        assert_eq!(clean_container_path("/.."), "/");
    }

    #[test]
    fn single_path_is_implicit() {
        assert_eq!(
            parse_mount("~/src/edx-platform").unwrap(),
            ParsedMount::Implicit {
                host_path: PathBuf::from("~/src/edx-platform")
            }
        );
    }

    #[test]
    fn wrong_segment_counts_are_rejected() {
        for raw in ["lms:/src", "lms:/a:/b:/c"] {
            let err = parse_mount(raw).unwrap_err();
            assert!(
                matches!(err, MountctlError::ParseError { .. }),
                "{raw} should fail to parse"
            );
        }
    }

    #[test]
    fn empty_fields_are_rejected() {
        for raw in ["", "   ", ":/src:/dst", "lms,,cms:/src:/dst", "lms::/dst", "lms:/src:"] {
            assert!(parse_mount(raw).is_err(), "{raw:?} should fail to parse");
        }
    }

    #[test]
    fn relative_container_path_is_rejected() {
        let err = parse_mount("lms:/src:openedx").unwrap_err();
        assert!(err.to_string().contains("must be absolute"));
    }

    #[test]
    fn invalid_service_characters_are_rejected() {
        let err = parse_mount("lms/x:/src:/dst").unwrap_err();
        assert!(err.to_string().contains("invalid service name"));
    }

    #[test]
    fn normalize_expands_home_and_anchors_relative_paths() {
        let c = ctx();
        assert_eq!(
            c.normalize(Path::new("~/edx-platform")).unwrap(),
            PathBuf::from("/home/dev/edx-platform")
        );
        assert_eq!(
            c.normalize(Path::new("../xblock-drag/./")).unwrap(),
            PathBuf::from("/work/xblock-drag")
        );
        assert_eq!(
            c.normalize(Path::new("/../../tmp")).unwrap(),
            PathBuf::from("/tmp")
        );
    }

    #[test]
    fn normalize_without_home_fails_on_tilde() {
        let c = PathContext::new("/work", None);
        assert!(matches!(
            c.normalize(Path::new("~/x")),
            Err(MountctlError::PathError(_))
        ));
    }

    #[test]
    fn targets_pair_each_service_with_container_path() {
        let d = MountDirective::new(["lms", "cms"], "/src", "/dst", "lms,cms:/src:/dst");
        let pairs: Vec<_> = d.targets().collect();
        assert_eq!(pairs, vec![("cms", "/dst"), ("lms", "/dst")]);
    }
}
