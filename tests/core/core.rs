use mountctl::core::config::{ProjectConfig, ServiceCatalog};
use mountctl::core::error::MountctlError;
use mountctl::core::store::{EnvMode, Store};
use mountctl::mounts::conventions::ConventionTable;
use mountctl::mounts::directive::{MountDirective, ParsedMount, PathContext, parse_mount};
use mountctl::mounts::state::{MountState, load_state, save_state};
use mountctl::mounts::{Resolver, merge, process_invocation};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn resolver(cwd: &Path) -> Resolver {
    Resolver::new(
        ConventionTable::builtin(ServiceCatalog::default(), "/mnt"),
        PathContext::new(cwd, Some(PathBuf::from("/home/dev"))),
    )
    .with_missing_path_warnings(false)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn explicit_directive_parses_into_services_and_paths() {
    for (raw, services, host, container) in [
        ("s1,s2:a/b:/c/d", vec!["s1", "s2"], "a/b", "/c/d"),
        ("lms:/src/theme:/openedx/themes/theme", vec!["lms"], "/src/theme", "/openedx/themes/theme"),
        ("cms-worker,lms-worker:~/x:/y", vec!["cms-worker", "lms-worker"], "~/x", "/y"),
    ] {
        let Ok(ParsedMount::Explicit(d)) = parse_mount(raw) else {
            panic!("{raw} should parse as explicit");
        };
        let expected: BTreeSet<String> = services.iter().map(|s| s.to_string()).collect();
        assert_eq!(d.services, expected, "{raw}");
        assert_eq!(d.host_path, PathBuf::from(host), "{raw}");
        assert_eq!(d.container_path, container, "{raw}");
    }
}

#[test]
fn implicit_conventions_resolve_to_documented_targets() {
    let r = resolver(Path::new("/work"));

    let platform = r.resolve_one("~/src/edx-platform").unwrap();
    assert_eq!(platform.host_path, PathBuf::from("/home/dev/src/edx-platform"));
    assert_eq!(platform.container_path, "/openedx/edx-platform");
    assert_eq!(
        platform.services,
        ["lms", "cms", "lms-worker", "cms-worker", "lms-job", "cms-job"]
            .iter()
            .map(|s| s.to_string())
            .collect::<BTreeSet<_>>()
    );

    let venv = r.resolve_one("./venv-lms").unwrap();
    assert_eq!(venv.host_path, PathBuf::from("/work/venv-lms"));
    assert_eq!(venv.container_path, "/openedx/venv");
    assert_eq!(
        venv.services.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["lms", "lms-job"]
    );
}

#[test]
fn unrecognized_folder_is_unresolved() {
    let r = resolver(Path::new("/work"));
    let err = r.resolve_one("random-folder").unwrap_err();
    assert!(matches!(err, MountctlError::UnresolvedMountError { .. }));
    assert!(err.to_string().contains("xblock-*"));
}

#[test]
fn carry_forward_when_no_mounts_supplied() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path(), EnvMode::Local);
    let r = resolver(tmp.path());

    process_invocation(&store, &r, &strings(&["lms:/a:/openedx/a"]), false).unwrap();
    let before = load_state(&store).unwrap();
    let bytes_before = fs::read(store.mounts_state_path()).unwrap();

    let outcome = process_invocation(&store, &r, &[], false).unwrap();
    assert_eq!(outcome.state, before);
    assert_eq!(fs::read(store.mounts_state_path()).unwrap(), bytes_before);
}

#[test]
fn latest_invocation_replaces_same_target() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path(), EnvMode::Dev);
    let r = resolver(tmp.path());

    process_invocation(&store, &r, &strings(&["lms:/old:/openedx/edx-platform"]), false).unwrap();
    process_invocation(&store, &r, &strings(&["lms:/new:/openedx/edx-platform"]), false).unwrap();

    let state = load_state(&store).unwrap();
    assert_eq!(state.directives.len(), 1);
    assert_eq!(state.directives[0].host_path, PathBuf::from("/new"));
    assert_eq!(state.generation, 2);
}

#[test]
fn unrelated_mount_does_not_keep_previous_ones() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path(), EnvMode::Dev);
    let r = resolver(tmp.path());

    process_invocation(&store, &r, &strings(&["edx-platform"]), false).unwrap();
    process_invocation(&store, &r, &strings(&["cms:/theme:/openedx/themes/theme"]), false).unwrap();

    let state = load_state(&store).unwrap();
    assert_eq!(state.directives.len(), 1);
    assert_eq!(state.directives[0].source, "cms:/theme:/openedx/themes/theme");
}

#[test]
fn modes_do_not_share_state() {
    let tmp = tempdir().unwrap();
    let local = Store::new(tmp.path(), EnvMode::Local);
    let dev = Store::new(tmp.path(), EnvMode::Dev);
    let r = resolver(tmp.path());

    process_invocation(&dev, &r, &strings(&["edx-platform"]), false).unwrap();
    assert!(load_state(&local).unwrap().is_empty());
    assert!(!load_state(&dev).unwrap().is_empty());
}

#[test]
fn state_round_trip_keeps_order() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path(), EnvMode::Local);
    let directives = vec![
        MountDirective::new(["cms"], "/z", "/openedx/z", "cms:/z:/openedx/z"),
        MountDirective::new(["lms"], "/a", "/openedx/a", "lms:/a:/openedx/a"),
        MountDirective::new(["lms", "lms-job"], "/v/venv-lms", "/openedx/venv", "venv-lms"),
    ];
    let state = merge::next_state(&MountState::default(), directives.clone());
    save_state(&store, &state).unwrap();
    let loaded = load_state(&store).unwrap();
    assert_eq!(loaded, state);
    assert_eq!(loaded.directives, directives);
}

#[test]
fn intra_invocation_duplicates_resolve_to_last_argument() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path(), EnvMode::Dev);
    let r = resolver(tmp.path());

    let outcome = process_invocation(
        &store,
        &r,
        &strings(&["/first/edx-platform", "lms:/second:/openedx/edx-platform"]),
        false,
    )
    .unwrap();

    let lms: Vec<_> = outcome
        .plan
        .binds()
        .iter()
        .filter(|b| b.service == "lms" && b.container_path == "/openedx/edx-platform")
        .collect();
    assert_eq!(lms.len(), 1);
    assert_eq!(lms[0].host_path, PathBuf::from("/second"));
    // other services still come from the implicit mount
    assert!(outcome
        .plan
        .binds()
        .iter()
        .any(|b| b.service == "cms" && b.host_path == Path::new("/first/edx-platform")));
}

#[test]
fn config_limits_enabled_services_for_venv_mounts() {
    let tmp = tempdir().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        "[services]\nenabled = [\"lms\", \"lms-job\"]\n",
    )
    .unwrap();
    let config = mountctl::core::config::load_config(&tmp.path().join("config.toml")).unwrap();
    let r = Resolver::from_config(&config, PathContext::new(tmp.path(), None)).unwrap();

    assert!(r.resolve_one("venv-lms").is_ok());
    assert!(matches!(
        r.resolve_one("venv-cms"),
        Err(MountctlError::AmbiguousServiceError { .. })
    ));
    assert_eq!(config, ProjectConfig {
        services: mountctl::core::config::ServicesConfig {
            enabled: Some(strings(&["lms", "lms-job"])),
            known: None,
        },
        ..ProjectConfig::default()
    });
}

#[test]
fn trailing_slash_container_paths_collapse_to_one_bind() {
    let tmp = tempdir().unwrap();
    let store = Store::new(tmp.path(), EnvMode::Dev);
    let r = resolver(tmp.path());

    let outcome = process_invocation(
        &store,
        &r,
        &strings(&["lms:/a:/openedx/edx-platform/", "lms:/b:/openedx/./edx-platform"]),
        false,
    )
    .unwrap();

    assert_eq!(outcome.plan.binds().len(), 1);
    assert_eq!(outcome.plan.binds()[0].host_path, PathBuf::from("/b"));
    assert_eq!(outcome.plan.binds()[0].container_path, "/openedx/edx-platform");
}

#[test]
fn frontend_app_must_name_a_known_service() {
    let r = resolver(Path::new("/work"));
    let learning = r.resolve_one("frontend-app-learning").unwrap();
    assert_eq!(
        learning.services.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["learning"]
    );
    for raw in ["frontend-app-nosuchapp", "frontend-app-foo bar"] {
        assert!(
            matches!(r.resolve_one(raw), Err(MountctlError::UnresolvedMountError { .. })),
            "{raw}"
        );
    }
}
