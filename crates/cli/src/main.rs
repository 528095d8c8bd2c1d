mod demo;
mod dynamic;
mod schema;

use anyhow::{Context, Result, bail};
use argdecl::{Command, DescriptorSet, Error, ParseOutcome, help};
use argdecl_metadata::SchemaDocumentV1;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};

use crate::demo::Pkg;
use crate::dynamic::build_definition;
use crate::schema::{load_schema, write_schema};

#[derive(Parser)]
#[command(name = "argdecl")]
#[command(version, about = "Check, render and exercise argdecl command schemas", long_about = None)]
#[command(disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a command schema
    Check(CheckArgs),

    /// Print the help text of a command or one of its subcommands
    Help(HelpArgs),

    /// Parse arguments against a command schema and print the values as JSON
    Parse(ParseArgs),

    /// Print the schema of the built-in demo command
    ExportDemo(ExportDemoArgs),

    /// Run the built-in demo command
    Demo(DemoArgs),
}

#[derive(Parser)]
struct CheckArgs {
    /// Path to a command schema JSON file
    #[arg(value_name = "SCHEMA")]
    schema: PathBuf,
}

#[derive(Parser)]
struct HelpArgs {
    /// Path to a command schema JSON file
    #[arg(value_name = "SCHEMA")]
    schema: PathBuf,

    /// Subcommand names leading to the command to describe
    #[arg(value_name = "PATH")]
    path: Vec<String>,
}

#[derive(Parser)]
struct ParseArgs {
    /// Path to a command schema JSON file
    #[arg(value_name = "SCHEMA")]
    schema: PathBuf,

    /// Arguments to parse, after `--`
    #[arg(last = true, value_name = "ARGS")]
    args: Vec<String>,
}

#[derive(Parser)]
struct ExportDemoArgs {
    /// Write the schema to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Parser)]
struct DemoArgs {
    /// Arguments for the demo command, after `--`
    #[arg(last = true, value_name = "ARGS")]
    args: Vec<String>,
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check(args) => check(args),
        Commands::Help(args) => help_command(args),
        Commands::Parse(args) => parse(args),
        Commands::ExportDemo(args) => export_demo(args),
        Commands::Demo(args) => Ok(exit_code(argdecl::run::<Pkg, _, _>(args.args))),
    }
}

fn check(args: CheckArgs) -> Result<ExitCode> {
    tracing::debug!("executing check command");

    let loaded = load_schema(&args.schema)?;
    let definition = build_definition(&loaded.document.command);
    definition
        .validate()
        .with_context(|| format!("invalid schema: {}", loaded.path.display()))?;

    println!("ok: {}", definition.descriptors().name());
    Ok(ExitCode::SUCCESS)
}

fn help_command(args: HelpArgs) -> Result<ExitCode> {
    let loaded = load_schema(&args.schema)?;
    let definition = build_definition(&loaded.document.command);
    definition
        .validate()
        .with_context(|| format!("invalid schema: {}", loaded.path.display()))?;

    let (set, ancestors) = descend(definition.descriptors(), &args.path)?;
    println!("{}", help::render(set, &ancestors));
    Ok(ExitCode::SUCCESS)
}

/// Walk `path` through subcommand names, collecting the ancestor chain.
fn descend<'a>(
    root: &'a DescriptorSet,
    path: &[String],
) -> Result<(&'a DescriptorSet, Vec<String>)> {
    let mut set = root;
    let mut ancestors = Vec::new();
    for name in path {
        ancestors.push(set.name().to_string());
        let Some((_, sub)) = set.subcommand(name) else {
            bail!(
                "command \"{name}\" is not defined under \"{}\"",
                ancestors.join(" ")
            );
        };
        set = sub.descriptors().as_ref();
    }
    Ok((set, ancestors))
}

fn parse(args: ParseArgs) -> Result<ExitCode> {
    let loaded = load_schema(&args.schema)?;
    let definition = build_definition(&loaded.document.command);
    tracing::debug!(tokens = args.args.len(), "parsing against schema");

    match definition.parse(args.args) {
        Ok(ParseOutcome::Parsed(values)) => {
            println!("{}", serde_json::to_string_pretty(&values.to_json())?);
            Ok(ExitCode::SUCCESS)
        }
        Ok(ParseOutcome::Help(text)) | Ok(ParseOutcome::Version(text)) => {
            println!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        Err(Error::Parse(err)) => {
            eprintln!("parse error: {err}\n\n{}", err.help());
            Ok(exit_code(err.exit_code()))
        }
        Err(Error::Definition(err)) => {
            bail!("invalid schema {}: {err}", loaded.path.display())
        }
    }
}

fn export_demo(args: ExportDemoArgs) -> Result<ExitCode> {
    let document = SchemaDocumentV1::from_descriptors(Pkg::definition().descriptors());
    match args.output {
        Some(path) => {
            write_schema(&path, &document)?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{}", document.to_json_string()?),
    }
    Ok(ExitCode::SUCCESS)
}

fn exit_code(code: i32) -> ExitCode {
    u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
