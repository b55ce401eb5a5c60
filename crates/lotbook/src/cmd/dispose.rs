//! `lotbook dispose`: apply a disposal to a lot file.
//!
//! The disposal is booked against the lots, the updated lots are written
//! out, and with `--proceeds` the realized gain is reported.

use super::{basis::print_result, load_lots, save_lots, write_json, DisposalArgs, OutputFormat};
use anyhow::Result;
use lotbook_booking::{
    calculate_cost_basis, realize_disposal_with_rules, try_update_lots_after_disposal,
    RealizedDisposal,
};
use lotbook_core::{
    CostBasisResult, HoldingPeriodRules, Lot, DEFAULT_LONG_TERM_THRESHOLD_DAYS,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// Apply a disposal and print the updated lots.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// JSON lot file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// The disposal
    #[command(flatten)]
    pub disposal: DisposalArgs,

    /// Proceeds received; reports the realized gain
    #[arg(short, long)]
    pub proceeds: Option<Decimal>,

    /// A holding longer than this many days is long-term
    #[arg(long, default_value_t = DEFAULT_LONG_TERM_THRESHOLD_DAYS)]
    pub long_term_days: i64,

    /// Write the updated lots to this file instead of the output
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// JSON output of a disposal.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    result: &'a CostBasisResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    realized: Option<&'a RealizedDisposal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lots: Option<&'a [Lot]>,
}

/// Run the command.
pub fn run<W: Write>(args: &Args, format: OutputFormat, out: &mut W) -> Result<ExitCode> {
    let lots = load_lots(&args.file)?;
    let request = args.disposal.request();
    let result = calculate_cost_basis(&request, &lots)?;
    let updated = try_update_lots_after_disposal(&lots, &result)?;

    let rules = HoldingPeriodRules {
        long_term_threshold_days: args.long_term_days,
    };
    let realized = args
        .proceeds
        .map(|proceeds| realize_disposal_with_rules(&request, &result, proceeds, &rules));

    if let Some(path) = &args.output {
        save_lots(path, &updated)?;
        info!(path = %path.display(), lots = updated.len(), "wrote updated lots");
    }
    let inline_lots = args.output.is_none().then_some(updated.as_slice());

    match format {
        OutputFormat::Json => write_json(
            out,
            &JsonOutput {
                result: &result,
                realized: realized.as_ref(),
                lots: inline_lots,
            },
        )?,
        OutputFormat::Text => {
            print_result(out, &request.asset_symbol, &result)?;
            if let Some(realized) = &realized {
                writeln!(out)?;
                print_realized(out, realized)?;
            }
            if let Some(lots) = inline_lots {
                writeln!(out)?;
                for lot in lots {
                    writeln!(out, "{lot}")?;
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_realized<W: Write>(out: &mut W, realized: &RealizedDisposal) -> Result<()> {
    let kind = if realized.gain_loss.is_gain { "Gain" } else { "Loss" };
    writeln!(out, "Proceeds:         {}", realized.proceeds)?;
    writeln!(out, "{kind}:             {}", realized.gain_loss.gain_loss)?;
    writeln!(out, "  short-term:     {}", realized.short_term_gain)?;
    writeln!(out, "  long-term:      {}", realized.long_term_gain)?;
    Ok(())
}
