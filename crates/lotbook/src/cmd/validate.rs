//! `lotbook validate`: audit a lot file.

use super::{load_lots, write_json, OutputFormat};
use anyhow::Result;
use lotbook_validate::{validate_lots_with_options, ValidationOptions};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// Check a lot file for data-integrity problems.
///
/// Exits with status 1 when any problem is found.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// JSON lot file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Accepted difference between acquisition cost and quantity times unit cost
    #[arg(long, default_value = "0.01")]
    pub tolerance: Decimal,
}

/// A validation error in JSON format.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonError {
    /// Error code (e.g., "L1001")
    pub code: String,
    /// Lot the error was found on
    pub lot_id: String,
    /// Error message
    pub message: String,
}

/// JSON output structure for a validation run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonOutput {
    /// True when no errors were found
    pub is_valid: bool,
    /// Total error count
    pub error_count: usize,
    /// Every error found
    pub errors: Vec<JsonError>,
}

/// Run the command.
pub fn run<W: Write>(args: &Args, format: OutputFormat, out: &mut W) -> Result<ExitCode> {
    let lots = load_lots(&args.file)?;
    let options = ValidationOptions {
        cost_tolerance: args.tolerance,
    };
    let report = validate_lots_with_options(&lots, &options);

    match format {
        OutputFormat::Json => {
            let output = JsonOutput {
                is_valid: report.is_valid,
                error_count: report.errors.len(),
                errors: report
                    .errors
                    .iter()
                    .map(|e| JsonError {
                        code: e.code.code().to_string(),
                        lot_id: e.lot_id.clone(),
                        message: e.message.clone(),
                    })
                    .collect(),
            };
            write_json(out, &output)?;
        }
        OutputFormat::Text => {
            for error in &report.errors {
                writeln!(out, "{error}")?;
            }
            if report.is_valid {
                writeln!(out, "{} lots, no errors", lots.len())?;
            } else {
                writeln!(out, "{} lots, {} errors", lots.len(), report.errors.len())?;
            }
        }
    }

    Ok(if report.is_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
