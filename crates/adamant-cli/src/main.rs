//! # adamant CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use adamant_cli::compile::{run_compile, CompileArgs};
use adamant_cli::export::{run_export, ExportArgs};
use adamant_cli::header::{run_header, HeaderArgs};
use adamant_cli::inspect::{run_blueprint, run_inspect, BlueprintArgs, InspectArgs};
use adamant_cli::load_config;
use adamant_cli::scratch::{run_new, NewArgs};

/// Adamant schema editor engine
///
/// Inspects, checks and re-headers JSON Schema documents, and validates
/// form data against them.
#[derive(Parser, Debug)]
#[command(name = "adamant", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML engine configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the editable representation of a schema.
    Inspect(InspectArgs),

    /// Check a schema document.
    Compile(CompileArgs),

    /// Print the initial data instance of a schema.
    Blueprint(BlueprintArgs),

    /// Validate a data file and write it under its content address.
    Export(ExportArgs),

    /// Rewrite the header of a schema document.
    Header(HeaderArgs),

    /// Write the metadata template as a new schema.
    New(NewArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = load_config(cli.config.as_deref()).and_then(|config| match &cli.command {
        Commands::Inspect(args) => run_inspect(args, &config),
        Commands::Compile(args) => run_compile(args, &config),
        Commands::Blueprint(args) => run_blueprint(args, &config),
        Commands::Export(args) => run_export(args, &config),
        Commands::Header(args) => run_header(args, &config),
        Commands::New(args) => run_new(args, &config, chrono::Utc::now()),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
