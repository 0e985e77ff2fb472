//! OpenSpec Core
//!
//! Per-change workflow on top of schemas and project config:
//!
//! - [`create_change`] and the `.openspec.yaml` binding ([`ChangeMetadata`])
//! - [`resolve_schema`]: explicit → binding → project config → default
//! - [`generate_instructions`]: context, rules and template for one artifact
//! - [`change_status`]: done / ready / blocked per artifact
//!
//! [`Project`] bundles a project root with its schema locator and is the
//! usual entry point.

#![warn(unreachable_pub)]

pub mod change;
pub mod error;
pub mod instructions;
pub mod metadata;
pub mod project;
pub mod resolution;
pub mod status;

pub use change::{changes_dir, create_change, validate_change_name};
pub use error::{ChangeError, ChangeMetadataError, CoreResult, InstructionError};
pub use instructions::{
    assemble_instruction, generate_instructions, render_instruction, validate_config_rules,
    ArtifactInstructions, DependencyInfo,
};
pub use metadata::{
    ensure_known_schema, read_change_metadata, write_change_metadata, ChangeMetadata, METADATA_FILE,
};
pub use project::Project;
pub use resolution::{resolve_schema, resolve_schema_for_change, ResolutionSource, SchemaResolution};
pub use status::{change_status, ArtifactState, ArtifactStatus, ChangeStatus};
