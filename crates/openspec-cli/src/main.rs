//! `openspec` command line

mod commands;

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn change_arg() -> Arg {
    Arg::new("change")
        .long("change")
        .short('c')
        .value_name("NAME")
        .help("Change name under openspec/changes")
}

fn schema_arg() -> Arg {
    Arg::new("schema")
        .long("schema")
        .value_name("NAME")
        .help("Use this schema instead of the change binding or project config")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

fn cli() -> Command {
    Command::new("openspec")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Spec-driven change workflows: schemas, changes and generator instructions")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("project")
                .long("project")
                .short('p')
                .global(true)
                .value_name("DIR")
                .default_value(".")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Project root"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .subcommand(
            Command::new("schemas")
                .about("List every visible schema and the tier it comes from")
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("schema")
                .about("Inspect schemas")
                .subcommand_required(true)
                .subcommand(
                    Command::new("which")
                        .about("Show where a schema is found and what it shadows")
                        .arg(Arg::new("name").required(true).help("Schema name"))
                        .arg(json_arg()),
                ),
        )
        .subcommand(
            Command::new("resolve")
                .about("Show the effective schema and which rule selected it")
                .arg(change_arg())
                .arg(schema_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("new")
                .about("Create a change bound to a schema")
                .arg(Arg::new("name").required(true).help("Kebab-case change name"))
                .arg(schema_arg()),
        )
        .subcommand(
            Command::new("status")
                .about("Show which artifacts of a change are done, ready or blocked")
                .arg(change_arg().required(true))
                .arg(schema_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("instructions")
                .about("Print generator instructions for one artifact")
                .arg(Arg::new("artifact").required(true).help("Artifact id"))
                .arg(change_arg().required(true))
                .arg(schema_arg())
                .arg(json_arg()),
        )
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let project_root = matches
        .get_one::<PathBuf>("project")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));
    let mut ctx = commands::Context::new(project_root);

    let result = match matches.subcommand() {
        Some(("schemas", args)) => commands::schemas(&ctx, args.get_flag("json")),
        Some(("schema", args)) => match args.subcommand() {
            Some(("which", args)) => {
                commands::which(&ctx, commands::required(args, "name")?, args.get_flag("json"))
            }
            _ => unreachable!("subcommand_required"),
        },
        Some(("resolve", args)) => commands::resolve(
            &mut ctx,
            commands::optional(args, "change"),
            commands::optional(args, "schema"),
            args.get_flag("json"),
        ),
        Some(("new", args)) => commands::new_change(
            &mut ctx,
            commands::required(args, "name")?,
            commands::optional(args, "schema"),
        ),
        Some(("status", args)) => commands::status(
            &mut ctx,
            commands::required(args, "change")?,
            commands::optional(args, "schema"),
            args.get_flag("json"),
        ),
        Some(("instructions", args)) => commands::instructions(
            &mut ctx,
            commands::required(args, "artifact")?,
            commands::required(args, "change")?,
            commands::optional(args, "schema"),
            args.get_flag("json"),
        ),
        _ => unreachable!("subcommand_required"),
    };

    ctx.flush_warnings();
    result
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
