//! `lotbook compare`: FIFO, LIFO and HIFO side by side.

use super::{load_lots, write_json, OutputFormat};
use anyhow::Result;
use chrono::NaiveDate;
use lotbook_booking::calculate_all_methods;
use lotbook_core::{parse_date, DisposalMethod};
use rust_decimal::Decimal;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// Compare the cost basis of one disposal under each ordered method.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// JSON lot file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Asset to dispose of
    #[arg(short, long)]
    pub asset: String,

    /// Quantity to dispose of
    #[arg(short, long)]
    pub quantity: Decimal,

    /// Only lots acquired on or before this date are eligible
    #[arg(long, value_parser = parse_date)]
    pub as_of: Option<NaiveDate>,
}

/// Run the command.
pub fn run<W: Write>(args: &Args, format: OutputFormat, out: &mut W) -> Result<ExitCode> {
    let lots = load_lots(&args.file)?;
    let comparison = calculate_all_methods(&lots, &args.asset, args.quantity, args.as_of)?;

    match format {
        OutputFormat::Json => write_json(out, &comparison)?,
        OutputFormat::Text => {
            let (best, _) = comparison.highest();
            for method in DisposalMethod::ORDERED {
                let basis = comparison.get(method).unwrap_or_default();
                let marker = if method == best { "  (highest basis)" } else { "" };
                writeln!(out, "{:<5} {basis}{marker}", method.to_string())?;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
