//! `lotbook basis`: cost basis of a single disposal.

use super::{load_lots, write_json, DisposalArgs, OutputFormat};
use anyhow::Result;
use lotbook_booking::calculate_cost_basis;
use lotbook_core::CostBasisResult;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// Calculate the cost basis of a disposal without changing any lot.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// JSON lot file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// The disposal
    #[command(flatten)]
    pub disposal: DisposalArgs,
}

/// Run the command.
pub fn run<W: Write>(args: &Args, format: OutputFormat, out: &mut W) -> Result<ExitCode> {
    let lots = load_lots(&args.file)?;
    let request = args.disposal.request();
    let result = calculate_cost_basis(&request, &lots)?;

    match format {
        OutputFormat::Json => write_json(out, &result)?,
        OutputFormat::Text => print_result(out, &request.asset_symbol, &result)?,
    }

    Ok(ExitCode::SUCCESS)
}

/// Print a cost basis result with its per-lot breakdown.
pub fn print_result<W: Write>(out: &mut W, asset: &str, result: &CostBasisResult) -> Result<()> {
    writeln!(out, "Method:           {}", result.method)?;
    writeln!(out, "Quantity:         {} {asset}", result.quantity)?;
    writeln!(out, "Total cost basis: {}", result.total_cost_basis)?;
    writeln!(out, "Average cost:     {}", result.average_cost_per_unit)?;
    writeln!(out)?;
    writeln!(
        out,
        "{:<12} {:<10} {:>20} {:>20} {:>20}",
        "Lot", "Acquired", "Quantity", "Cost/Unit", "Cost Basis"
    )?;

    for lot in &result.lots_used {
        writeln!(
            out,
            "{:<12} {:<10} {:>20} {:>20} {:>20}",
            lot.lot_id,
            lot.acquired_date.to_string(),
            lot.quantity_used.to_string(),
            lot.cost_per_unit.to_string(),
            lot.cost_basis.to_string()
        )?;
    }

    Ok(())
}
