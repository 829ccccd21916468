//! # Expressions Subcommand
//!
//! Prints the path expression table of a schema: every backend path
//! expression with the configuration path where it is declared.

use std::path::PathBuf;

use clap::Args;
use vbridge_schema::{load_schema, walk};

/// Arguments for the expressions subcommand.
#[derive(Args, Debug)]
pub struct ExpressionsArgs {
    /// Attribute schema (`.yaml`, `.yml`, or `.json`).
    #[arg(long)]
    pub schema: PathBuf,
}

/// Render the table, one `expression => path` line per entry.
pub fn expressions(args: &ExpressionsArgs) -> anyhow::Result<String> {
    let schema = load_schema(&args.schema)?;
    let table = walk(&schema);
    let lines: Vec<String> = table
        .iter()
        .map(|(expr, path)| format!("{expr} => {path}"))
        .collect();
    Ok(lines.join("\n"))
}

/// Handler for `vbridge expressions`.
pub fn run_expressions(args: &ExpressionsArgs) -> anyhow::Result<()> {
    let rendered = expressions(args)?;
    if !rendered.is_empty() {
        println!("{rendered}");
    }
    Ok(())
}
