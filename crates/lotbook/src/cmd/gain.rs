//! `lotbook gain`: gain or loss on a disposal.

use super::{write_json, OutputFormat};
use anyhow::Result;
use lotbook_core::calculate_gain_loss;
use rust_decimal::Decimal;
use std::io::Write;
use std::process::ExitCode;

/// Gain or loss of selling at the given proceeds.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Cost basis of the quantity sold
    #[arg(long, allow_negative_numbers = true)]
    pub cost_basis: Decimal,

    /// Proceeds received; negative for a fee-only disposal
    #[arg(long, allow_negative_numbers = true)]
    pub proceeds: Decimal,
}

/// Run the command.
pub fn run<W: Write>(args: &Args, format: OutputFormat, out: &mut W) -> Result<ExitCode> {
    let result = calculate_gain_loss(args.cost_basis, args.proceeds);

    match format {
        OutputFormat::Json => write_json(out, &result)?,
        OutputFormat::Text => {
            let kind = if result.is_gain { "gain" } else { "loss" };
            writeln!(out, "{kind} {}", result.gain_loss)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
