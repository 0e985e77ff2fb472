//! Loading `openspec/config.yaml` from disk.

use openspec_config::{load_project_config, ProjectConfig, Warnings, MAX_CONTEXT_BYTES};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_config(root: &Path, name: &str, body: &str) {
    let dir = root.join("openspec");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(name), body).unwrap();
}

#[test]
fn missing_file_is_not_an_error() {
    let tmp = TempDir::new().unwrap();
    let mut warnings = Warnings::new();
    assert_eq!(load_project_config(tmp.path(), &mut warnings).unwrap(), None);
    assert!(warnings.is_empty());
}

#[test]
fn yaml_preferred_over_yml() {
    let tmp = TempDir::new().unwrap();
    write_config(tmp.path(), "config.yml", "schema: from-yml\n");
    write_config(tmp.path(), "config.yaml", "schema: from-yaml\n");

    let config = load_project_config(tmp.path(), &mut Warnings::new()).unwrap().unwrap();
    assert_eq!(config.schema.as_deref(), Some("from-yaml"));
}

#[test]
fn yml_used_when_yaml_absent() {
    let tmp = TempDir::new().unwrap();
    write_config(tmp.path(), "config.yml", "schema: from-yml\n");

    let config = load_project_config(tmp.path(), &mut Warnings::new()).unwrap().unwrap();
    assert_eq!(config.schema.as_deref(), Some("from-yml"));
}

#[test]
fn valid_fields_survive_invalid_siblings() {
    let tmp = TempDir::new().unwrap();
    let big = "x".repeat(MAX_CONTEXT_BYTES + 10);
    write_config(
        tmp.path(),
        "config.yaml",
        &format!(
            "schema: spec-driven\ncontext: {big}\n\
             rules:\n  proposal: 7\n  design:\n    - Use ADR format\n"
        ),
    );

    let mut warnings = Warnings::new();
    let config = load_project_config(tmp.path(), &mut warnings).unwrap().unwrap();

    let mut expected_rules = indexmap::IndexMap::new();
    expected_rules.insert("design".to_string(), vec!["Use ADR format".to_string()]);
    assert_eq!(
        config,
        ProjectConfig {
            schema: Some("spec-driven".into()),
            context: None,
            rules: Some(expected_rules),
        }
    );
    assert_eq!(warnings.len(), 2);
    assert!(warnings.contains("'context' is"));
    assert!(warnings.contains("rules for 'proposal'"));
}

#[test]
fn repeated_loads_warn_once() {
    let tmp = TempDir::new().unwrap();
    write_config(tmp.path(), "config.yaml", "schema: ''\ncontext: ok\n");

    let mut warnings = Warnings::new();
    let first = load_project_config(tmp.path(), &mut warnings).unwrap();
    let second = load_project_config(tmp.path(), &mut warnings).unwrap();
    assert_eq!(first, second);
    assert_eq!(warnings.len(), 1);
}

#[test]
fn edits_apply_on_next_load() {
    let tmp = TempDir::new().unwrap();
    write_config(tmp.path(), "config.yaml", "schema: first\n");
    let mut warnings = Warnings::new();
    let before = load_project_config(tmp.path(), &mut warnings).unwrap().unwrap();

    write_config(tmp.path(), "config.yaml", "schema: second\n");
    let after = load_project_config(tmp.path(), &mut warnings).unwrap().unwrap();

    assert_eq!(before.schema.as_deref(), Some("first"));
    assert_eq!(after.schema.as_deref(), Some("second"));
}

#[test]
fn empty_file_warns_and_yields_none() {
    let tmp = TempDir::new().unwrap();
    write_config(tmp.path(), "config.yaml", "");
    let mut warnings = Warnings::new();
    assert_eq!(load_project_config(tmp.path(), &mut warnings).unwrap(), None);
    assert_eq!(warnings.len(), 1);
}

#[cfg(unix)]
#[test]
fn unreadable_file_is_an_io_error() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new().unwrap();
    write_config(tmp.path(), "config.yaml", "schema: x\n");
    let path = tmp.path().join("openspec/config.yaml");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

    // root ignores permission bits
    if fs::read_to_string(&path).is_ok() {
        return;
    }

    let err = load_project_config(tmp.path(), &mut Warnings::new()).unwrap_err();
    assert!(err.to_string().contains("config.yaml"));
}
