//! Error types for OpenSpec Core
//!
//! Provides error handling for:
//! - Change metadata (binding sidecar) read/write
//! - Change creation
//! - Instruction generation

use openspec_config::ConfigError;
use openspec_schema::{SchemaError, UnknownSchema};
use std::path::PathBuf;

/// Errors reading or writing `.openspec.yaml`
#[derive(Debug, thiserror::Error)]
pub enum ChangeMetadataError {
    /// IO error on the sidecar file
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Sidecar exists but its content is unusable (bad YAML, bad shape,
    /// bad date, or a schema that no longer resolves)
    #[error("invalid change metadata {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    /// Refused to bind a change to a schema nobody provides; carries close
    /// matches and the names each tier offers
    #[error("{0}")]
    UnknownSchema(Box<UnknownSchema>),
}

impl ChangeMetadataError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create content error for path
    pub fn invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Path of the sidecar involved, when there is one
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Io { path, .. } | Self::Invalid { path, .. } => Some(path),
            Self::UnknownSchema(_) => None,
        }
    }
}

/// Errors creating a change
#[derive(Debug, thiserror::Error)]
pub enum ChangeError {
    /// Change name is not kebab-case
    #[error("invalid change name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Change directory already exists
    #[error("change '{name}' already exists at {path}")]
    AlreadyExists { name: String, path: PathBuf },

    /// IO error creating the change directory
    #[error("io error creating {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Binding could not be written
    #[error(transparent)]
    Metadata(#[from] ChangeMetadataError),
}

/// Errors producing instructions or status for a change
#[derive(Debug, thiserror::Error)]
pub enum InstructionError {
    /// Change directory does not exist
    #[error("change '{name}' not found at {path}")]
    ChangeNotFound { name: String, path: PathBuf },

    /// Resolved schema could not be loaded or used
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Project config exists but could not be read
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for core operations
pub type CoreResult<T, E = InstructionError> = Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use openspec_schema::SchemaSource;

    #[test]
    fn unknown_schema_suggests_and_groups_by_tier() {
        let catalog = [
            (SchemaSource::Project, vec!["tdd".to_string()]),
            (SchemaSource::Package, vec!["spec-driven".to_string()]),
        ]
        .into_iter()
        .collect();
        let unknown = UnknownSchema::new("spec-drivn", catalog);
        let err = ChangeMetadataError::UnknownSchema(Box::new(unknown));

        assert_eq!(
            err.to_string(),
            "schema 'spec-drivn' not found\nDid you mean: spec-driven?\n\
             Available schemas:\n  project: tdd\n  package: spec-driven"
        );
        assert_eq!(err.path(), None);
    }

    #[test]
    fn invalid_carries_path() {
        let err = ChangeMetadataError::invalid("/c/.openspec.yaml", "bad date");
        assert_eq!(err.path(), Some(std::path::Path::new("/c/.openspec.yaml")));
        assert_eq!(err.to_string(), "invalid change metadata /c/.openspec.yaml: bad date");
    }

    #[test]
    fn metadata_error_converts() {
        let err: ChangeError = ChangeMetadataError::invalid("/x", "y").into();
        assert!(matches!(err, ChangeError::Metadata(_)));
    }
}
