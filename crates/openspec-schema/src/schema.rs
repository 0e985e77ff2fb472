//! Schema model and validator
//!
//! [`parse_schema`] is a pure function over YAML text. Validation runs in a
//! fixed order and stops at the first failure:
//! 1. structural shape (serde + non-empty / positive checks)
//! 2. unique artifact ids
//! 3. every `requires` entry names an existing artifact
//! 4. no cycles over `requires` (DFS with recursion-stack tracking)

use crate::error::{SchemaError, SchemaValidationError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// One kind of document produced by a workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Identifier, unique within the schema
    pub id: String,
    /// Output path or glob, relative to the change directory
    pub generates: String,
    /// Template path, relative to the schema directory
    pub template: String,
    /// Human readable description
    pub description: String,
    /// Artifacts that must exist before this one
    #[serde(default)]
    pub requires: Vec<String>,
    /// Optional authoring guidance shown next to the template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
}

/// Validated workflow schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema name
    pub name: String,
    /// Positive schema version
    pub version: i64,
    /// Human readable description
    pub description: String,
    /// Artifacts in declaration order
    pub artifacts: Vec<Artifact>,
}

impl Schema {
    /// Look up an artifact by id
    #[must_use]
    pub fn artifact(&self, id: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.id == id)
    }

    /// Whether the schema defines `id`
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.artifact(id).is_some()
    }

    /// Artifact ids in declaration order
    #[must_use]
    pub fn artifact_ids(&self) -> Vec<&str> {
        self.artifacts.iter().map(|a| a.id.as_str()).collect()
    }

    /// Artifact ids sorted alphabetically
    #[must_use]
    pub fn sorted_artifact_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.artifacts.iter().map(|a| a.id.clone()).collect();
        ids.sort();
        ids
    }
}

/// Parse and validate schema YAML
///
/// # Errors
/// Returns the first validation failure in the order documented on the module.
pub fn parse_schema(raw: &str) -> Result<Schema, SchemaValidationError> {
    let schema: Schema =
        serde_yaml::from_str(raw).map_err(|e| SchemaValidationError::Malformed(e.to_string()))?;

    validate_shape(&schema)?;
    validate_unique_ids(&schema)?;
    validate_requires(&schema)?;
    validate_acyclic(&schema)?;

    Ok(schema)
}

/// Read and parse a `schema.yaml` file
///
/// # Errors
/// [`SchemaError::Io`] if the file cannot be read, [`SchemaError::Invalid`]
/// if its content does not validate.
pub fn load_schema(path: &Path) -> Result<Schema, SchemaError> {
    let raw = std::fs::read_to_string(path).map_err(|e| SchemaError::io_error(path, e))?;
    parse_schema(&raw).map_err(|e| SchemaError::invalid(path, e))
}

fn validate_shape(schema: &Schema) -> Result<(), SchemaValidationError> {
    if schema.name.trim().is_empty() {
        return Err(SchemaValidationError::empty_field("name"));
    }
    if schema.version <= 0 {
        return Err(SchemaValidationError::InvalidVersion(schema.version));
    }
    if schema.artifacts.is_empty() {
        return Err(SchemaValidationError::NoArtifacts);
    }

    for (index, artifact) in schema.artifacts.iter().enumerate() {
        let fields = [
            ("id", &artifact.id),
            ("generates", &artifact.generates),
            ("template", &artifact.template),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(SchemaValidationError::empty_field(format!(
                    "artifacts[{index}].{field}"
                )));
            }
        }
    }

    Ok(())
}

fn validate_unique_ids(schema: &Schema) -> Result<(), SchemaValidationError> {
    let mut seen = HashSet::new();
    for artifact in &schema.artifacts {
        if !seen.insert(artifact.id.as_str()) {
            return Err(SchemaValidationError::DuplicateArtifact(artifact.id.clone()));
        }
    }
    Ok(())
}

fn validate_requires(schema: &Schema) -> Result<(), SchemaValidationError> {
    let ids: HashSet<&str> = schema.artifacts.iter().map(|a| a.id.as_str()).collect();
    for artifact in &schema.artifacts {
        if let Some(missing) = artifact.requires.iter().find(|r| !ids.contains(r.as_str())) {
            return Err(SchemaValidationError::UnknownRequirement {
                artifact: artifact.id.clone(),
                missing: missing.clone(),
            });
        }
    }
    Ok(())
}

/// Detect cycles using DFS
///
/// Nodes are visited in declaration order so the reported cycle is stable.
fn validate_acyclic(schema: &Schema) -> Result<(), SchemaValidationError> {
    let adjacency: HashMap<&str, Vec<&str>> = schema
        .artifacts
        .iter()
        .map(|a| (a.id.as_str(), a.requires.iter().map(String::as_str).collect()))
        .collect();

    let mut stack: Vec<&str> = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();

    fn dfs<'a>(
        node: &'a str,
        adjacency: &HashMap<&'a str, Vec<&'a str>>,
        stack: &mut Vec<&'a str>,
        visited: &mut HashSet<&'a str>,
    ) -> Option<Vec<String>> {
        if let Some(pos) = stack.iter().position(|n| *n == node) {
            let mut cycle: Vec<String> = stack[pos..].iter().map(|s| (*s).to_string()).collect();
            cycle.push(node.to_string());
            return Some(cycle);
        }
        if visited.contains(node) {
            return None;
        }

        stack.push(node);
        if let Some(neighbors) = adjacency.get(node) {
            for &neighbor in neighbors {
                if let Some(cycle) = dfs(neighbor, adjacency, stack, visited) {
                    return Some(cycle);
                }
            }
        }
        stack.pop();
        visited.insert(node);
        None
    }

    for artifact in &schema.artifacts {
        if let Some(cycle) = dfs(&artifact.id, &adjacency, &mut stack, &mut visited) {
            return Err(SchemaValidationError::CyclicRequires { cycle });
        }
    }

    Ok(())
}
