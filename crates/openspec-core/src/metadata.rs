//! Change-schema binding
//!
//! A change records the schema it was created with in a small YAML sidecar,
//! `<changeDir>/.openspec.yaml`. The binding is written once and only read
//! afterwards. Reading re-checks that the bound schema still resolves; a stale
//! binding is an error, not a silent fallback.

use crate::error::ChangeMetadataError;
use once_cell::sync::Lazy;
use openspec_schema::{SchemaLocator, UnknownSchema};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Sidecar file name inside a change directory
pub const METADATA_FILE: &str = ".openspec.yaml";

static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));

/// Persisted binding of a change to a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeMetadata {
    /// Bound schema name
    pub schema: String,
    /// Creation date, `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

impl ChangeMetadata {
    /// Binding without a creation date
    #[must_use]
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            created: None,
        }
    }

    /// Binding stamped with today's local date
    #[must_use]
    pub fn created_today(schema: impl Into<String>) -> Self {
        Self::new(schema).with_created(today())
    }

    /// Set the creation date
    #[must_use]
    pub fn with_created(mut self, date: impl Into<String>) -> Self {
        self.created = Some(date.into());
        self
    }

    fn validate(&self) -> Result<(), String> {
        if self.schema.trim().is_empty() {
            return Err("'schema' must be a non-empty string".to_string());
        }
        if let Some(created) = &self.created {
            if !DATE_PATTERN.is_match(created) {
                return Err(format!("'created' must be YYYY-MM-DD, got '{created}'"));
            }
        }
        Ok(())
    }
}

/// Today's local date as `YYYY-MM-DD`
#[must_use]
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// `<changeDir>/.openspec.yaml`
#[must_use]
pub fn metadata_path(change_dir: &Path) -> PathBuf {
    change_dir.join(METADATA_FILE)
}

/// Fail unless some tier provides `schema`
///
/// # Errors
/// [`ChangeMetadataError::UnknownSchema`] with close matches and every
/// visible name grouped by tier.
pub fn ensure_known_schema(
    schema: &str,
    locator: &SchemaLocator,
) -> Result<(), ChangeMetadataError> {
    let catalog = locator.catalog();
    if catalog.values().flatten().any(|name| name == schema) {
        return Ok(());
    }
    Err(ChangeMetadataError::UnknownSchema(Box::new(UnknownSchema::new(
        schema, catalog,
    ))))
}

/// Write the binding for a change
///
/// The schema must be visible through `locator`; nothing is written otherwise.
///
/// # Errors
/// [`ChangeMetadataError::UnknownSchema`] with suggestions and the catalog,
/// [`ChangeMetadataError::Invalid`] for a malformed date,
/// [`ChangeMetadataError::Io`] if the file cannot be written.
pub fn write_change_metadata(
    change_dir: &Path,
    metadata: &ChangeMetadata,
    locator: &SchemaLocator,
) -> Result<PathBuf, ChangeMetadataError> {
    ensure_known_schema(&metadata.schema, locator)?;

    let path = metadata_path(change_dir);
    metadata
        .validate()
        .map_err(|reason| ChangeMetadataError::invalid(&path, reason))?;

    let yaml = serde_yaml::to_string(metadata)
        .map_err(|e| ChangeMetadataError::invalid(&path, e.to_string()))?;
    std::fs::write(&path, yaml).map_err(|e| ChangeMetadataError::io_error(&path, e))?;

    debug!(path = %path.display(), schema = %metadata.schema, "wrote change metadata");
    Ok(path)
}

/// Read the binding for a change
///
/// `Ok(None)` when the change has no sidecar.
///
/// # Errors
/// [`ChangeMetadataError::Io`] if the sidecar cannot be read,
/// [`ChangeMetadataError::Invalid`] if it is malformed or names a schema that
/// no longer resolves.
pub fn read_change_metadata(
    change_dir: &Path,
    locator: &SchemaLocator,
) -> Result<Option<ChangeMetadata>, ChangeMetadataError> {
    let path = metadata_path(change_dir);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            return Err(ChangeMetadataError::invalid(&path, "not valid UTF-8"))
        }
        Err(e) => return Err(ChangeMetadataError::io_error(&path, e)),
    };

    let metadata: ChangeMetadata = serde_yaml::from_str(&raw)
        .map_err(|e| ChangeMetadataError::invalid(&path, format!("malformed YAML: {e}")))?;
    metadata
        .validate()
        .map_err(|reason| ChangeMetadataError::invalid(&path, reason))?;

    let available = locator.names();
    if !available.contains(&metadata.schema) {
        let available: Vec<String> = available.into_iter().collect();
        return Err(ChangeMetadataError::invalid(
            &path,
            format!(
                "schema '{}' no longer resolves (available: {})",
                metadata.schema,
                available.join(", ")
            ),
        ));
    }

    Ok(Some(metadata))
}
