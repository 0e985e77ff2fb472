//! Schema resolution precedence
//!
//! The effective schema for an operation is the first of:
//! 1. an explicit, non-empty name from the caller (never validated here)
//! 2. the change's binding (`.openspec.yaml`)
//! 3. `schema` from the project config
//! 4. [`DEFAULT_SCHEMA`]
//!
//! Lower sources are best-effort: their errors are logged and skipped so a
//! broken fallback never fails the resolution. Nothing is cached.

use crate::metadata::read_change_metadata;
use openspec_config::{load_project_config, Warnings};
use openspec_schema::{SchemaLocator, DEFAULT_SCHEMA};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Which precedence stage produced the schema name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionSource {
    /// Passed explicitly by the caller
    Explicit,
    /// Read from the change binding
    ChangeMetadata,
    /// Read from the project config
    ProjectConfig,
    /// Built-in default
    Default,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Explicit => "explicit",
            Self::ChangeMetadata => "change metadata",
            Self::ProjectConfig => "project config",
            Self::Default => "default",
        })
    }
}

/// Effective schema name and where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaResolution {
    /// Schema name
    pub name: String,
    /// Stage that produced it
    pub source: ResolutionSource,
}

impl SchemaResolution {
    fn new(name: impl Into<String>, source: ResolutionSource) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }
}

/// Resolve the effective schema for a change; never fails
///
/// `change_dir` may be `None` for operations not tied to an existing change.
/// `project_root` is explicit: it is not derived from `change_dir`.
pub fn resolve_schema(
    change_dir: Option<&Path>,
    explicit: Option<&str>,
    project_root: &Path,
    locator: &SchemaLocator,
    warnings: &mut Warnings,
) -> SchemaResolution {
    if let Some(name) = explicit.filter(|s| !s.is_empty()) {
        return SchemaResolution::new(name, ResolutionSource::Explicit);
    }

    if let Some(dir) = change_dir {
        match read_change_metadata(dir, locator) {
            Ok(Some(metadata)) => {
                return SchemaResolution::new(metadata.schema, ResolutionSource::ChangeMetadata)
            }
            Ok(None) => {}
            Err(e) => debug!(error = %e, "ignoring unusable change metadata"),
        }
    }

    match load_project_config(project_root, warnings) {
        Ok(Some(config)) => {
            if let Some(schema) = config.schema {
                return SchemaResolution::new(schema, ResolutionSource::ProjectConfig);
            }
        }
        Ok(None) => {}
        Err(e) => debug!(error = %e, "ignoring unreadable project config"),
    }

    SchemaResolution::new(DEFAULT_SCHEMA, ResolutionSource::Default)
}

/// [`resolve_schema`], name only
pub fn resolve_schema_for_change(
    change_dir: &Path,
    explicit: Option<&str>,
    project_root: &Path,
    locator: &SchemaLocator,
    warnings: &mut Warnings,
) -> String {
    resolve_schema(Some(change_dir), explicit, project_root, locator, warnings).name
}
