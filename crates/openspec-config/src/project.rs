//! Project config loader
//!
//! Parse-then-validate: the document is parsed into a generic YAML value and
//! each known field is run through its own validator returning a
//! [`FieldResult`]. Failed fields become warnings; the rest are composed into
//! a [`ProjectConfig`]. Nothing is cached: every call reads the file again so
//! an edit applies to the very next command.

use crate::error::ConfigError;
use crate::warnings::Warnings;
use indexmap::IndexMap;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Maximum size of `context`, in UTF-8 bytes
pub const MAX_CONTEXT_BYTES: usize = 50 * 1024;

/// Config file names, in preference order
const CONFIG_FILES: [&str; 2] = ["config.yaml", "config.yml"];

/// Outcome of validating one field; `Err` carries the reason it was dropped
type FieldResult<T> = Result<T, String>;

/// Validated project configuration
///
/// Only fields that passed validation are `Some`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectConfig {
    /// Default schema for new changes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Free text injected before every template, verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Per-artifact rules, keyed by artifact id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<IndexMap<String, Vec<String>>>,
}

impl ProjectConfig {
    /// Whether no field survived validation
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schema.is_none() && self.context.is_none() && self.rules.is_none()
    }

    /// Rules for `artifact_id`, empty if none
    #[must_use]
    pub fn rules_for(&self, artifact_id: &str) -> &[String] {
        self.rules
            .as_ref()
            .and_then(|rules| rules.get(artifact_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// `<projectRoot>/openspec`
#[must_use]
pub fn config_dir(project_root: &Path) -> PathBuf {
    project_root.join("openspec")
}

/// `config.yaml` if present, else `config.yml`
#[must_use]
pub fn find_config_file(project_root: &Path) -> Option<PathBuf> {
    let dir = config_dir(project_root);
    CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Load the project config
///
/// Returns `Ok(None)` when there is no config file or nothing in it is valid.
///
/// # Errors
/// [`ConfigError::Io`] when the file exists but cannot be read.
pub fn load_project_config(
    project_root: &Path,
    warnings: &mut Warnings,
) -> Result<Option<ProjectConfig>, ConfigError> {
    let Some(path) = find_config_file(project_root) else {
        debug!(root = %project_root.display(), "no project config");
        return Ok(None);
    };

    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            warnings.warn(format!("{}: not valid UTF-8; ignoring file", path.display()));
            return Ok(None);
        }
        Err(e) => return Err(ConfigError::io_error(path, e)),
    };

    Ok(parse_project_config(&raw, &path, warnings))
}

/// Validate config text; `source` only labels warnings
#[must_use]
pub fn parse_project_config(
    raw: &str,
    source: &Path,
    warnings: &mut Warnings,
) -> Option<ProjectConfig> {
    let label = source.display();

    let document: Value = match serde_yaml::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warnings.warn(format!("{label}: failed to parse YAML ({e}); ignoring file"));
            return None;
        }
    };

    let Value::Mapping(root) = document else {
        warnings.warn(format!("{label}: config must be a YAML mapping; ignoring file"));
        return None;
    };

    let config = ProjectConfig {
        schema: field(&root, "schema")
            .map(schema_field)
            .and_then(|r| keep(r, &label, warnings)),
        context: field(&root, "context")
            .map(context_field)
            .and_then(|r| keep(r, &label, warnings)),
        rules: field(&root, "rules")
            .map(|v| rules_field(v, &label, warnings))
            .and_then(|r| keep(r, &label, warnings)),
    };

    if config.is_empty() {
        debug!(path = %label, "project config has no usable fields");
        return None;
    }
    Some(config)
}

/// Present, non-null field value
fn field<'a>(root: &'a Mapping, key: &str) -> Option<&'a Value> {
    root.get(key).filter(|v| !v.is_null())
}

/// Turn a failed field into a warning
fn keep<T>(
    result: FieldResult<T>,
    label: &impl std::fmt::Display,
    warnings: &mut Warnings,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(reason) => {
            warnings.warn(format!("{label}: {reason}"));
            None
        }
    }
}

fn schema_field(value: &Value) -> FieldResult<String> {
    match value.as_str() {
        Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
        _ => Err("'schema' must be a non-empty string; ignoring it".to_string()),
    }
}

fn context_field(value: &Value) -> FieldResult<String> {
    let Some(context) = value.as_str() else {
        return Err("'context' must be a string; ignoring it".to_string());
    };
    if context.len() > MAX_CONTEXT_BYTES {
        return Err(format!(
            "'context' is {} bytes, exceeding the {MAX_CONTEXT_BYTES} byte limit; ignoring it",
            context.len()
        ));
    }
    Ok(context.to_string())
}

/// Validate `rules` key by key; a bad key is skipped, not the whole field
fn rules_field(
    value: &Value,
    label: &impl std::fmt::Display,
    warnings: &mut Warnings,
) -> FieldResult<IndexMap<String, Vec<String>>> {
    let Some(map) = value.as_mapping() else {
        return Err(
            "'rules' must be a mapping of artifact id to a list of strings; ignoring it"
                .to_string(),
        );
    };

    let mut rules = IndexMap::new();
    for (key, entries) in map {
        let Some(artifact_id) = key.as_str() else {
            warnings.warn(format!(
                "{label}: rules keys must be artifact ids (strings); skipping {key:?}"
            ));
            continue;
        };

        match rule_list(entries) {
            Ok((kept, dropped)) => {
                if dropped > 0 {
                    warnings.warn(format!(
                        "{label}: dropped {dropped} empty rule(s) for '{artifact_id}'"
                    ));
                }
                if !kept.is_empty() {
                    rules.insert(artifact_id.to_string(), kept);
                }
            }
            Err(reason) => {
                warnings.warn(format!(
                    "{label}: rules for '{artifact_id}' {reason}; skipping them"
                ));
            }
        }
    }

    if rules.is_empty() {
        return Err("'rules' contains no usable entries; ignoring it".to_string());
    }
    Ok(rules)
}

/// Non-empty rule strings plus the count of empty ones dropped
fn rule_list(value: &Value) -> FieldResult<(Vec<String>, usize)> {
    let Some(items) = value.as_sequence() else {
        return Err("must be a list of strings".to_string());
    };

    let mut kept = Vec::with_capacity(items.len());
    let mut dropped = 0;
    for item in items {
        match item.as_str() {
            Some("") => dropped += 1,
            Some(rule) => kept.push(rule.to_string()),
            None => return Err("must contain only strings".to_string()),
        }
    }
    Ok((kept, dropped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(raw: &str) -> (Option<ProjectConfig>, Warnings) {
        let mut warnings = Warnings::new();
        let config = parse_project_config(raw, Path::new("config.yaml"), &mut warnings);
        (config, warnings)
    }

    #[test]
    fn full_config() {
        let (config, warnings) = parse(
            "schema: spec-driven\ncontext: |\n  Tech stack: Rust\nrules:\n  proposal:\n    - Keep it short\n  tasks: [Small steps]\n",
        );
        let config = config.unwrap();
        assert_eq!(config.schema.as_deref(), Some("spec-driven"));
        assert_eq!(config.context.as_deref(), Some("Tech stack: Rust\n"));
        assert_eq!(config.rules_for("proposal"), ["Keep it short"]);
        assert_eq!(config.rules_for("tasks"), ["Small steps"]);
        assert!(config.rules_for("design").is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn invalid_yaml_yields_none() {
        let (config, warnings) = parse("schema: [unclosed");
        assert_eq!(config, None);
        assert!(warnings.contains("failed to parse YAML"));
    }

    #[test]
    fn non_mapping_root_yields_none() {
        let (config, warnings) = parse("- a\n- b\n");
        assert_eq!(config, None);
        assert!(warnings.contains("must be a YAML mapping"));
    }

    #[test]
    fn empty_schema_dropped_alone() {
        let (config, warnings) = parse("schema: ''\ncontext: hello\n");
        assert_eq!(
            config,
            Some(ProjectConfig {
                context: Some("hello".into()),
                ..ProjectConfig::default()
            })
        );
        assert!(warnings.contains("'schema' must be a non-empty string"));
    }

    #[test]
    fn whitespace_schema_counts_as_empty() {
        let (config, warnings) = parse("schema: '   '\n");
        assert_eq!(config, None);
        assert!(warnings.contains("'schema' must be a non-empty string"));
    }

    #[test]
    fn non_string_context_dropped() {
        let (config, warnings) = parse("schema: x\ncontext: 42\n");
        assert_eq!(config.unwrap().context, None);
        assert!(warnings.contains("'context' must be a string"));
    }

    #[test]
    fn oversize_context_reports_sizes() {
        let big = "a".repeat(MAX_CONTEXT_BYTES + 1);
        let (config, warnings) = parse(&format!("schema: x\ncontext: {big}\n"));
        assert_eq!(config.unwrap().context, None);
        assert!(warnings.contains(&format!("{} bytes", MAX_CONTEXT_BYTES + 1)));
        assert!(warnings.contains(&format!("{MAX_CONTEXT_BYTES} byte limit")));
    }

    #[test]
    fn context_at_limit_is_kept() {
        let exact = "b".repeat(MAX_CONTEXT_BYTES);
        let (config, _) = parse(&format!("context: {exact}\n"));
        assert_eq!(config.unwrap().context.unwrap().len(), MAX_CONTEXT_BYTES);
    }

    #[test]
    fn context_limit_counts_bytes_not_chars() {
        // 3 bytes per char
        let wide = "€".repeat(MAX_CONTEXT_BYTES / 3 + 1);
        let (config, warnings) = parse(&format!("context: {wide}\n"));
        assert_eq!(config, None);
        assert!(warnings.contains("exceeding"));
    }

    #[test]
    fn context_preserved_verbatim() {
        let (config, _) = parse("context: \"  <b>&amp;</b>\\n\\tend  \"\n");
        assert_eq!(config.unwrap().context.as_deref(), Some("  <b>&amp;</b>\n\tend  "));
    }

    #[test]
    fn empty_rule_strings_filtered() {
        let (config, warnings) = parse("rules:\n  proposal: ['', 'R1', '']\n");
        assert_eq!(config.unwrap().rules_for("proposal"), ["R1"]);
        assert!(warnings.contains("dropped 2 empty rule(s) for 'proposal'"));
    }

    #[test]
    fn invalid_rule_keys_skipped_individually() {
        let (config, warnings) =
            parse("rules:\n  proposal: not-a-list\n  design: [ok]\n  tasks: [1, 2]\n");
        let rules = config.unwrap().rules.unwrap();
        assert_eq!(rules.keys().collect::<Vec<_>>(), ["design"]);
        assert!(warnings.contains("rules for 'proposal' must be a list of strings"));
        assert!(warnings.contains("rules for 'tasks' must contain only strings"));
    }

    #[test]
    fn rules_not_a_mapping() {
        let (config, warnings) = parse("schema: x\nrules: [a, b]\n");
        assert_eq!(config.unwrap().rules, None);
        assert!(warnings.contains("'rules' must be a mapping"));
    }

    #[test]
    fn all_invalid_yields_none() {
        let (config, warnings) = parse("schema: 1\ncontext: [x]\nrules: nope\n");
        assert_eq!(config, None);
        assert_eq!(warnings.len(), 3);
    }

    #[test]
    fn unknown_and_null_keys_ignored() {
        let (config, warnings) = parse("schema: x\ncontext:\nextra: true\n");
        assert_eq!(
            config,
            Some(ProjectConfig {
                schema: Some("x".into()),
                ..ProjectConfig::default()
            })
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn rule_order_preserved() {
        let (config, _) = parse("rules:\n  tasks: [t]\n  proposal: [p]\n  design: [d]\n");
        let keys: Vec<_> = config.unwrap().rules.unwrap().into_keys().collect();
        assert_eq!(keys, ["tasks", "proposal", "design"]);
    }
}
