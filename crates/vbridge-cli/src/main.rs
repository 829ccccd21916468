//! # vbridge CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use std::process::ExitCode;

use clap::Parser;

/// Validation bridge: attribute backend validation errors to configuration
/// attributes.
#[derive(Parser, Debug)]
#[command(name = "vbridge", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Validate a configuration against a backend JSON Schema.
    Check(vbridge_cli::check::CheckArgs),
    /// Print a schema's path expression table.
    Expressions(vbridge_cli::expressions::ExpressionsArgs),
}

fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr so JSON output on stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check(args) => vbridge_cli::check::run_check(&args),
        Commands::Expressions(args) => {
            vbridge_cli::expressions::run_expressions(&args)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
