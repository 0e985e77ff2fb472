//! Change status: which artifacts are done, ready or blocked

use crate::error::InstructionError;
use crate::project::Project;
use crate::resolution::ResolutionSource;
use openspec_config::Warnings;
use openspec_schema::{detect_completed, SchemaSource};
use serde::Serialize;
use std::fmt;

/// Progress state of one artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactState {
    /// Output exists
    Done,
    /// All prerequisites done
    Ready,
    /// Waiting on at least one prerequisite
    Blocked,
}

impl fmt::Display for ArtifactState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Done => "done",
            Self::Ready => "ready",
            Self::Blocked => "blocked",
        })
    }
}

/// Status of one artifact within a change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactStatus {
    /// Artifact id
    pub id: String,
    /// Output path or glob
    pub output_path: String,
    /// Progress state
    pub state: ArtifactState,
    /// Unfinished prerequisites; empty unless blocked
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

/// Progress of a change against its schema
#[derive(Debug, Clone, Serialize)]
pub struct ChangeStatus {
    /// Change name
    pub change: String,
    /// Effective schema name
    pub schema: String,
    /// Tier the schema was loaded from
    pub schema_source: SchemaSource,
    /// Precedence stage that chose the schema
    pub resolved_by: ResolutionSource,
    /// Artifacts in build order
    pub artifacts: Vec<ArtifactStatus>,
    /// Whether every artifact is done
    pub is_complete: bool,
}

impl ChangeStatus {
    /// Ids currently ready to generate
    #[must_use]
    pub fn next(&self) -> Vec<&str> {
        self.artifacts
            .iter()
            .filter(|a| a.state == ArtifactState::Ready)
            .map(|a| a.id.as_str())
            .collect()
    }

    /// Number of finished artifacts
    #[must_use]
    pub fn done_count(&self) -> usize {
        self.artifacts
            .iter()
            .filter(|a| a.state == ArtifactState::Done)
            .count()
    }
}

/// Compute status for `change`
///
/// # Errors
/// Missing change or unresolvable schema.
pub fn change_status(
    project: &Project,
    change: &str,
    explicit_schema: Option<&str>,
    warnings: &mut Warnings,
) -> Result<ChangeStatus, InstructionError> {
    let change_dir = project.existing_change_dir(change)?;
    let resolution = project.resolve_schema(Some(change), explicit_schema, warnings);
    let resolved = project.locator().resolve(&resolution.name)?;

    let graph = resolved.graph();
    let completed = detect_completed(&graph, &change_dir);
    let blocked = graph.blocked(&completed);

    let artifacts = graph
        .build_order()
        .into_iter()
        .filter_map(|id| graph.get(id))
        .map(|artifact| {
            let (state, missing) = if completed.contains(&artifact.id) {
                (ArtifactState::Done, Vec::new())
            } else if let Some(missing) = blocked.get(&artifact.id) {
                (ArtifactState::Blocked, missing.clone())
            } else {
                (ArtifactState::Ready, Vec::new())
            };
            ArtifactStatus {
                id: artifact.id.clone(),
                output_path: artifact.generates.clone(),
                state,
                missing,
            }
        })
        .collect();

    Ok(ChangeStatus {
        change: change.to_string(),
        schema: resolved.schema.name.clone(),
        schema_source: resolved.source,
        resolved_by: resolution.source,
        artifacts,
        is_complete: graph.is_complete(&completed),
    })
}
