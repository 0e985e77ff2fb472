//! Subcommand handlers

use anyhow::{anyhow, Context as _};
use clap::ArgMatches;
use openspec_config::Warnings;
use openspec_core::{
    change_status, generate_instructions, ArtifactState, Project, ResolutionSource,
};
use openspec_schema::{SchemaLocation, SchemaSource, UnknownSchema};
use serde::Serialize;
use std::path::PathBuf;

/// Project plus the warnings gathered during one invocation
pub(crate) struct Context {
    project: Project,
    warnings: Warnings,
}

impl Context {
    pub(crate) fn new(project_root: PathBuf) -> Self {
        Self {
            project: Project::from_env(project_root),
            warnings: Warnings::new(),
        }
    }

    pub(crate) fn flush_warnings(&self) {
        for message in self.warnings.messages() {
            eprintln!("warning: {message}");
        }
    }
}

pub(crate) fn required<'a>(args: &'a ArgMatches, id: &str) -> anyhow::Result<&'a str> {
    optional(args, id).ok_or_else(|| anyhow!("missing required argument '{id}'"))
}

pub(crate) fn optional<'a>(args: &'a ArgMatches, id: &str) -> Option<&'a str> {
    args.get_one::<String>(id).map(String::as_str)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("serializing output")?;
    println!("{json}");
    Ok(())
}

pub(crate) fn schemas(ctx: &Context, json: bool) -> anyhow::Result<()> {
    let infos = ctx.project.locator().list_all();
    if json {
        return print_json(&infos);
    }

    if infos.is_empty() {
        println!("No schemas found.");
        return Ok(());
    }
    for info in infos {
        let description = info.description.as_deref().unwrap_or("(unreadable)");
        println!("{} [{}]  {description}", info.name, info.source);
        if !info.artifacts.is_empty() {
            println!("    artifacts: {}", info.artifacts.join(" -> "));
        }
        if !info.shadows.is_empty() {
            let shadows: Vec<&str> = info.shadows.iter().map(|s| s.as_str()).collect();
            println!("    shadows: {}", shadows.join(", "));
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct WhichOutput<'a> {
    name: &'a str,
    winner: Option<&'a SchemaLocation>,
    locations: &'a [SchemaLocation],
}

pub(crate) fn which(ctx: &Context, name: &str, json: bool) -> anyhow::Result<()> {
    let locator = ctx.project.locator();
    let locations = locator.locations(name);
    let Some(winner) = locations.iter().find(|loc| loc.exists) else {
        return Err(anyhow!(UnknownSchema::new(name, locator.catalog()).to_string()));
    };

    if json {
        return print_json(&WhichOutput {
            name,
            winner: Some(winner),
            locations: &locations,
        });
    }

    println!("{name}: {} ({})", winner.source, winner.path.display());
    for loc in locations.iter().filter(|loc| loc.exists && loc.source != winner.source) {
        println!("  shadows {} ({})", loc.source, loc.path.display());
    }
    Ok(())
}

#[derive(Serialize)]
struct ResolveOutput {
    schema: String,
    resolved_by: ResolutionSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    tier: Option<SchemaSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
}

pub(crate) fn resolve(
    ctx: &mut Context,
    change: Option<&str>,
    explicit: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let resolution = ctx.project.resolve_schema(change, explicit, &mut ctx.warnings);
    let location = ctx
        .project
        .locator()
        .locations(&resolution.name)
        .into_iter()
        .find(|loc| loc.exists);

    let output = ResolveOutput {
        schema: resolution.name,
        resolved_by: resolution.source,
        tier: location.as_ref().map(|loc| loc.source),
        path: location.map(|loc| loc.path),
    };
    if json {
        return print_json(&output);
    }

    match (output.tier, &output.path) {
        (Some(tier), Some(path)) => println!(
            "{} (from {}; {tier} schema at {})",
            output.schema,
            output.resolved_by,
            path.display()
        ),
        _ => println!("{} (from {}; not found in any tier)", output.schema, output.resolved_by),
    }
    Ok(())
}

pub(crate) fn new_change(
    ctx: &mut Context,
    name: &str,
    explicit: Option<&str>,
) -> anyhow::Result<()> {
    let (dir, resolution) = ctx
        .project
        .create_change(name, explicit, &mut ctx.warnings)
        .with_context(|| format!("creating change '{name}'"))?;
    println!(
        "Created change '{name}' at {} (schema: {}, from {})",
        dir.display(),
        resolution.name,
        resolution.source
    );
    Ok(())
}

pub(crate) fn status(
    ctx: &mut Context,
    change: &str,
    explicit: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let status = change_status(&ctx.project, change, explicit, &mut ctx.warnings)?;
    if json {
        return print_json(&status);
    }

    println!(
        "Change '{}' ({} schema '{}', from {})",
        status.change, status.schema_source, status.schema, status.resolved_by
    );
    println!("Progress: {}/{}", status.done_count(), status.artifacts.len());
    for artifact in &status.artifacts {
        let mark = match artifact.state {
            ArtifactState::Done => "[x]",
            ArtifactState::Ready => "[ ]",
            ArtifactState::Blocked => "[-]",
        };
        print!("  {mark} {} ({})", artifact.id, artifact.output_path);
        if artifact.missing.is_empty() {
            println!();
        } else {
            println!("  needs: {}", artifact.missing.join(", "));
        }
    }
    if status.is_complete {
        println!("All artifacts complete.");
    } else {
        let next = status.next();
        if !next.is_empty() {
            println!("Next: {}", next.join(", "));
        }
    }
    Ok(())
}

pub(crate) fn instructions(
    ctx: &mut Context,
    artifact: &str,
    change: &str,
    explicit: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let out = generate_instructions(&ctx.project, change, artifact, explicit, &mut ctx.warnings)?;
    if json {
        return print_json(&out);
    }

    let pending: Vec<&str> = out
        .dependencies
        .iter()
        .filter(|d| !d.done)
        .map(|d| d.id.as_str())
        .collect();
    if !pending.is_empty() {
        ctx.warnings.warn(format!(
            "'{artifact}' depends on unfinished artifacts: {}",
            pending.join(", ")
        ));
    }
    println!("{}", out.text);
    Ok(())
}
