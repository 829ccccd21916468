//! # Check Subcommand
//!
//! Validates a JSON configuration document against a backend JSON Schema.
//! Every attribute carrying a store path expression is validated, and each
//! backend error is reported on the attribute it belongs to.
//!
//! Exits non-zero when any error diagnostic is produced.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, ValueEnum};
use serde_json::Value;
use vbridge_core::{BridgeOptions, ConfigValue, Diagnostics};
use vbridge_schema::load_schema;
use vbridge_validate::{ExpressionProjection, JsonSchemaStoreValidator, ValidationBridge};

/// Arguments for the check subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Attribute schema (`.yaml`, `.yml`, or `.json`).
    #[arg(long)]
    pub schema: PathBuf,

    /// Configuration document (JSON).
    #[arg(long)]
    pub config: PathBuf,

    /// Backend JSON Schema the materialized object is validated against.
    #[arg(long)]
    pub backend_schema: PathBuf,

    /// Bridge options (YAML).
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// How diagnostics are printed.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per diagnostic.
    Text,
    /// A JSON array of diagnostics.
    Json,
}

/// Outcome of a check run.
#[derive(Debug)]
pub struct CheckReport {
    pub diagnostics: Diagnostics,
    /// True when any value was unknown and validation was deferred.
    pub deferred: bool,
}

impl CheckReport {
    pub fn passed(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.passed() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }

    /// Render the report for stdout.
    pub fn render(&self, format: OutputFormat) -> anyhow::Result<String> {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(&self.diagnostics)
                .context("failed to serialize diagnostics"),
            OutputFormat::Text if self.deferred => {
                Ok("deferred: configuration contains unknown values".to_string())
            }
            OutputFormat::Text if self.diagnostics.is_empty() => Ok("ok: no diagnostics".to_string()),
            OutputFormat::Text => Ok(self.diagnostics.to_string()),
        }
    }
}

/// Load bridge options, falling back to defaults when no file is given.
pub fn load_options(path: Option<&Path>) -> anyhow::Result<BridgeOptions> {
    let Some(path) = path else {
        return Ok(BridgeOptions::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read options file {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("invalid options file {}", path.display()))
}

/// Load a JSON configuration document, turning `unknown_marker` strings into
/// unknown values.
pub fn load_config(path: &Path, unknown_marker: &str) -> anyhow::Result<ConfigValue> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration {}", path.display()))?;
    let raw: Value = serde_json::from_str(&content)
        .with_context(|| format!("configuration {} is not valid JSON", path.display()))?;
    Ok(ConfigValue::from_json(&raw, unknown_marker))
}

/// Run the check without printing.
pub fn check(args: &CheckArgs) -> anyhow::Result<CheckReport> {
    let options = load_options(args.options.as_deref())?;
    let schema = Arc::new(load_schema(&args.schema)?);
    let config = load_config(&args.config, &options.unknown_marker)?;
    let backend = JsonSchemaStoreValidator::from_file(&args.backend_schema)?
        .with_field_prefix(options.field_prefix.clone());

    tracing::info!(
        schema = %args.schema.display(),
        config = %args.config.display(),
        attributes = schema.attributes.len(),
        "checking configuration"
    );

    let bridge = ValidationBridge::new(
        Arc::clone(&schema),
        ExpressionProjection::new(Arc::clone(&schema)),
        backend,
    )
    .with_options(options);

    let diagnostics = bridge
        .validate_all(&schema, &config)
        .context("configuration does not fit the backend model")?;

    Ok(CheckReport {
        diagnostics,
        deferred: !config.is_fully_known(),
    })
}

/// Handler for `vbridge check`.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<ExitCode> {
    let report = check(args)?;
    println!("{}", report.render(args.format)?);
    Ok(report.exit_code())
}
