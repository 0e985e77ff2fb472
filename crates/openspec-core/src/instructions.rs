//! Instruction assembly
//!
//! The text handed to a generator for one artifact is built from up to three
//! sections, always in this order:
//!
//! ```text
//! <context>          project context, verbatim    (only if non-empty)
//! </context>
//!
//! <rules>            one "- " line per rule       (only if this artifact has rules)
//! </rules>
//!
//! <template>         schema template, verbatim    (always)
//! </template>
//! ```
//!
//! Nothing is escaped. Downstream consumers depend on this layout byte for
//! byte.

use crate::error::InstructionError;
use crate::project::Project;
use crate::resolution::ResolutionSource;
use openspec_config::{ProjectConfig, Warnings};
use openspec_schema::{detect_completed, ResolvedSchema, Schema, SchemaError, SchemaSource};
use serde::Serialize;

/// Marker prefixed to every rule line
pub const RULE_PREFIX: &str = "- ";

fn push_section(out: &mut String, tag: &str, body: &str) {
    out.push('<');
    out.push_str(tag);
    out.push_str(">\n");
    out.push_str(body);
    out.push_str("\n</");
    out.push_str(tag);
    out.push('>');
}

/// Layer context and rules for `artifact_id` on top of `template`
#[must_use]
pub fn render_instruction(
    artifact_id: &str,
    template: &str,
    config: Option<&ProjectConfig>,
) -> String {
    let mut out = String::new();

    if let Some(context) = config
        .and_then(|c| c.context.as_deref())
        .filter(|c| !c.is_empty())
    {
        push_section(&mut out, "context", context);
        out.push_str("\n\n");
    }

    let rules = config.map(|c| c.rules_for(artifact_id)).unwrap_or_default();
    if !rules.is_empty() {
        let body = rules
            .iter()
            .map(|rule| format!("{RULE_PREFIX}{rule}"))
            .collect::<Vec<_>>()
            .join("\n");
        push_section(&mut out, "rules", &body);
        out.push_str("\n\n");
    }

    push_section(&mut out, "template", template);
    out
}

/// Load the template for `artifact_id` from `schema` and render it
///
/// # Errors
/// Unknown artifact or unreadable template.
pub fn assemble_instruction(
    artifact_id: &str,
    schema: &ResolvedSchema,
    config: Option<&ProjectConfig>,
) -> Result<String, SchemaError> {
    let template = schema.load_template(artifact_id)?;
    Ok(render_instruction(artifact_id, &template, config))
}

/// Warn about rule keys that name no artifact in `schema`
///
/// Returns the unknown ids in config order.
pub fn validate_config_rules(
    config: &ProjectConfig,
    schema: &Schema,
    warnings: &mut Warnings,
) -> Vec<String> {
    let Some(rules) = &config.rules else {
        return Vec::new();
    };

    let unknown: Vec<String> = rules
        .keys()
        .filter(|id| !schema.contains(id))
        .cloned()
        .collect();
    if unknown.is_empty() {
        return unknown;
    }

    let valid = schema.sorted_artifact_ids().join(", ");
    for id in &unknown {
        warnings.warn(format!(
            "rules reference unknown artifact '{id}' for schema '{}' (valid ids: {valid})",
            schema.name
        ));
    }
    unknown
}

/// A prerequisite of the requested artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyInfo {
    /// Artifact id
    pub id: String,
    /// Whether its output exists
    pub done: bool,
    /// Its output path or glob
    pub path: String,
}

/// Everything a generator needs to produce one artifact
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactInstructions {
    /// Change name
    pub change: String,
    /// Artifact id
    pub artifact: String,
    /// Effective schema name
    pub schema: String,
    /// Tier the schema was loaded from
    pub schema_source: SchemaSource,
    /// Precedence stage that chose the schema
    pub resolved_by: ResolutionSource,
    /// Artifact description from the schema
    pub description: String,
    /// Output path or glob, relative to the change directory
    pub output_path: String,
    /// Schema-authored guidance, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    /// Direct prerequisites and whether each is done
    pub dependencies: Vec<DependencyInfo>,
    /// Artifacts that directly require this one
    pub unlocks: Vec<String>,
    /// Assembled context, rules and template
    pub text: String,
}

/// Build instructions for `artifact_id` in `change`
///
/// # Errors
/// Missing change, unresolvable schema, unknown artifact, missing template, or
/// an unreadable project config.
pub fn generate_instructions(
    project: &Project,
    change: &str,
    artifact_id: &str,
    explicit_schema: Option<&str>,
    warnings: &mut Warnings,
) -> Result<ArtifactInstructions, InstructionError> {
    let change_dir = project.existing_change_dir(change)?;
    let resolution = project.resolve_schema(Some(change), explicit_schema, warnings);
    let resolved = project.locator().resolve(&resolution.name)?;
    let artifact = resolved.artifact(artifact_id)?.clone();

    let config = project.load_config(warnings)?;
    if let Some(config) = &config {
        validate_config_rules(config, &resolved.schema, warnings);
    }
    let text = assemble_instruction(artifact_id, &resolved, config.as_ref())?;

    let graph = resolved.graph();
    let completed = detect_completed(&graph, &change_dir);
    let dependencies = artifact
        .requires
        .iter()
        .filter_map(|id| graph.get(id))
        .map(|dep| DependencyInfo {
            id: dep.id.clone(),
            done: completed.contains(&dep.id),
            path: dep.generates.clone(),
        })
        .collect();
    let unlocks = graph
        .dependents(artifact_id)
        .into_iter()
        .map(str::to_string)
        .collect();

    Ok(ArtifactInstructions {
        change: change.to_string(),
        artifact: artifact.id,
        schema: resolved.schema.name.clone(),
        schema_source: resolved.source,
        resolved_by: resolution.source,
        description: artifact.description,
        output_path: artifact.generates,
        instruction: artifact.instruction,
        dependencies,
        unlocks,
        text,
    })
}
