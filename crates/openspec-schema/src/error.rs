//! Error types for schema parsing and resolution
//!
//! Two layers:
//! - [`SchemaValidationError`]: pure parse/validate failures over schema text
//! - [`SchemaError`]: everything that can go wrong while locating and loading
//!   a schema from disk, always carrying the offending path or name

use crate::suggest::UnknownSchema;
use std::path::PathBuf;

/// Errors produced while parsing and validating schema text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaValidationError {
    /// YAML syntax error or wrong field shape
    #[error("malformed schema: {0}")]
    Malformed(String),

    /// Required string field is empty
    #[error("field '{field}' must not be empty")]
    EmptyField { field: String },

    /// Version is zero or negative
    #[error("version must be a positive integer, got {0}")]
    InvalidVersion(i64),

    /// Artifact list is empty
    #[error("schema must define at least one artifact")]
    NoArtifacts,

    /// Two artifacts share an id
    #[error("duplicate artifact id '{0}'")]
    DuplicateArtifact(String),

    /// A `requires` entry names an artifact that does not exist
    #[error("artifact '{artifact}' requires unknown artifact '{missing}'")]
    UnknownRequirement { artifact: String, missing: String },

    /// The `requires` edges form a cycle
    #[error("cyclic requires: {}", .cycle.join(" -> "))]
    CyclicRequires { cycle: Vec<String> },
}

impl SchemaValidationError {
    /// Create empty-field error
    pub fn empty_field(field: impl Into<String>) -> Self {
        Self::EmptyField {
            field: field.into(),
        }
    }
}

/// Errors while locating, loading or using a schema
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Schema file exists but does not validate
    #[error("invalid schema {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: SchemaValidationError,
    },

    /// No tier provides the requested schema
    #[error("{0}")]
    NotFound(Box<UnknownSchema>),

    /// Template referenced by an artifact does not exist
    #[error(
        "template '{template}' for artifact '{artifact}' not found (looked in {})",
        display_paths(.candidates)
    )]
    TemplateNotFound {
        artifact: String,
        template: String,
        candidates: Vec<PathBuf>,
    },

    /// Artifact id is not part of the schema
    #[error(
        "artifact '{artifact}' not found in schema '{schema}' (valid ids: {})",
        .valid.join(", ")
    )]
    UnknownArtifact {
        artifact: String,
        schema: String,
        valid: Vec<String>,
    },
}

impl SchemaError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create validation error for path
    pub fn invalid(path: impl Into<PathBuf>, source: SchemaValidationError) -> Self {
        Self::Invalid {
            path: path.into(),
            source,
        }
    }

    /// Path of the file involved, when there is one
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Io { path, .. } | Self::Invalid { path, .. } => Some(path),
            _ => None,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
