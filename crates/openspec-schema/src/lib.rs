//! OpenSpec Schema
//!
//! Workflow schemas describe the documents a change produces and the order in
//! which they can be written. A schema is a DAG of artifacts keyed by id.
//!
//! # Core Concepts
//!
//! - [`Schema`]: parsed and validated `schema.yaml` (ids unique, `requires`
//!   resolvable, no cycles)
//! - [`SchemaLocator`]: ordered project → user → package lookup with shadowing
//! - [`ArtifactGraph`]: build order and readiness over a validated schema
//!
//! # Example
//!
//! ```rust,ignore
//! use openspec_schema::SchemaLocator;
//!
//! let locator = SchemaLocator::from_env().with_project_root(".");
//! let resolved = locator.resolve("spec-driven")?;
//! for id in resolved.graph().build_order() {
//!     println!("{id}");
//! }
//! ```

#![warn(unreachable_pub)]

pub mod completion;
pub mod error;
pub mod graph;
pub mod locator;
pub mod schema;
pub mod suggest;
pub mod template;

pub use completion::detect_completed;
pub use error::{SchemaError, SchemaResult, SchemaValidationError};
pub use graph::ArtifactGraph;
pub use locator::{
    ResolvedSchema, SchemaInfo, SchemaLocation, SchemaLocator, SchemaSource, SCHEMA_FILE,
};
pub use schema::{load_schema, parse_schema, Artifact, Schema};
pub use suggest::UnknownSchema;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the schema used when nothing else selects one
pub const DEFAULT_SCHEMA: &str = "spec-driven";
