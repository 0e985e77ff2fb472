//! Instruction generation and change status against real directories.

use openspec_config::Warnings;
use openspec_core::{
    change_status, generate_instructions, ArtifactState, InstructionError, Project,
    ResolutionSource,
};
use openspec_schema::{SchemaError, SchemaSource};
use openspec_test_utils::{write_file, TestEnv};
use pretty_assertions::assert_eq;

const WORKFLOW: &str = "\
name: workflow
version: 1
description: test workflow
artifacts:
  - id: proposal
    generates: proposal.md
    template: proposal.md
    description: Why
    instruction: Start with the motivation.
  - id: specs
    generates: specs/**/*.md
    template: spec.md
    description: What
    requires: [proposal]
  - id: design
    generates: design.md
    template: design.md
    description: How
    requires: [proposal]
  - id: tasks
    generates: tasks.md
    template: tasks.md
    description: Steps
    requires: [specs, design]
";

fn setup() -> (TestEnv, Project) {
    let env = TestEnv::new();
    let dir = env.write_schema(SchemaSource::Package, "workflow", WORKFLOW);
    for (file, body) in [
        ("proposal.md", "## Why\n"),
        ("spec.md", "## Requirements\n"),
        ("design.md", "## Decisions\n"),
        ("tasks.md", "- [ ] task\n"),
    ] {
        write_file(&dir.join("templates").join(file), body);
    }
    env.write_binding("c", "schema: workflow\n");
    let project = Project::new(&env.project, env.two_tier_locator());
    (env, project)
}

#[test]
fn injection_order_is_byte_exact() {
    let (env, project) = setup();
    env.write_config(
        "config.yaml",
        "context: \"A\\nB\"\nrules:\n  proposal:\n    - R1\n",
    );

    let out = generate_instructions(&project, "c", "proposal", None, &mut Warnings::new()).unwrap();
    assert_eq!(
        out.text,
        "<context>\nA\nB\n</context>\n\n<rules>\n- R1\n</rules>\n\n<template>\n## Why\n\n</template>"
    );
    assert_eq!(out.instruction.as_deref(), Some("Start with the motivation."));
    assert_eq!(out.resolved_by, ResolutionSource::ChangeMetadata);
    assert_eq!(out.schema_source, SchemaSource::Package);
}

#[test]
fn rules_only_for_their_artifact() {
    let (env, project) = setup();
    env.write_config("config.yaml", "rules:\n  proposal:\n    - R1\n");

    let out = generate_instructions(&project, "c", "design", None, &mut Warnings::new()).unwrap();
    assert_eq!(out.text, "<template>\n## Decisions\n\n</template>");
}

#[test]
fn unknown_rule_keys_warn_once_per_run() {
    let (env, project) = setup();
    env.write_config("config.yaml", "rules:\n  plan:\n    - x\n  tasks:\n    - y\n");

    let mut warnings = Warnings::new();
    generate_instructions(&project, "c", "proposal", None, &mut warnings).unwrap();
    generate_instructions(&project, "c", "design", None, &mut warnings).unwrap();

    assert_eq!(warnings.len(), 1);
    assert!(warnings.contains("'plan'"));
    assert!(warnings.contains("design, proposal, specs, tasks"));
}

#[test]
fn dependencies_and_unlocks() {
    let (env, project) = setup();
    write_file(&env.change_dir("c").join("proposal.md"), "# p\n");
    write_file(&env.change_dir("c").join("specs/auth/spec.md"), "# s\n");

    let out = generate_instructions(&project, "c", "tasks", None, &mut Warnings::new()).unwrap();
    let deps: Vec<(&str, bool)> = out.dependencies.iter().map(|d| (d.id.as_str(), d.done)).collect();
    assert_eq!(deps, vec![("specs", true), ("design", false)]);
    assert!(out.unlocks.is_empty());

    let out = generate_instructions(&project, "c", "proposal", None, &mut Warnings::new()).unwrap();
    assert_eq!(out.unlocks, vec!["specs", "design"]);
}

#[test]
fn missing_change_is_an_error() {
    let (_env, project) = setup();
    let err = generate_instructions(&project, "nope", "proposal", None, &mut Warnings::new()).unwrap_err();
    assert!(matches!(err, InstructionError::ChangeNotFound { .. }));

    let err = generate_instructions(&project, "../c", "proposal", None, &mut Warnings::new()).unwrap_err();
    assert!(matches!(err, InstructionError::ChangeNotFound { .. }));
}

#[test]
fn unknown_artifact_lists_valid_ids() {
    let (_env, project) = setup();
    let err = generate_instructions(&project, "c", "plan", None, &mut Warnings::new()).unwrap_err();
    match err {
        InstructionError::Schema(SchemaError::UnknownArtifact { artifact, .. }) => {
            assert_eq!(artifact, "plan");
        }
        other => panic!("expected UnknownArtifact, got {other:?}"),
    }
}

#[test]
fn unknown_explicit_schema_fails_with_suggestions() {
    let (_env, project) = setup();
    let err = generate_instructions(&project, "c", "proposal", Some("workflw"), &mut Warnings::new())
        .unwrap_err();
    assert!(matches!(err, InstructionError::Schema(SchemaError::NotFound(_))));
    assert!(err.to_string().contains("Did you mean: workflow?"), "{err}");
}

#[test]
fn status_tracks_progress() {
    let (env, project) = setup();
    let status = change_status(&project, "c", None, &mut Warnings::new()).unwrap();

    let states: Vec<(&str, ArtifactState)> =
        status.artifacts.iter().map(|a| (a.id.as_str(), a.state)).collect();
    assert_eq!(
        states,
        vec![
            ("proposal", ArtifactState::Ready),
            ("specs", ArtifactState::Blocked),
            ("design", ArtifactState::Blocked),
            ("tasks", ArtifactState::Blocked),
        ]
    );
    assert_eq!(status.artifacts[3].missing, vec!["specs", "design"]);
    assert!(!status.is_complete);

    for file in ["proposal.md", "design.md", "tasks.md", "specs/a/spec.md"] {
        write_file(&env.change_dir("c").join(file), "x\n");
    }
    let status = change_status(&project, "c", None, &mut Warnings::new()).unwrap();
    assert_eq!(status.done_count(), 4);
    assert!(status.next().is_empty());
    assert!(status.is_complete);
}

#[test]
fn status_next_after_proposal() {
    let (env, project) = setup();
    write_file(&env.change_dir("c").join("proposal.md"), "x\n");

    let status = change_status(&project, "c", None, &mut Warnings::new()).unwrap();
    assert_eq!(status.next(), vec!["specs", "design"]);
}
