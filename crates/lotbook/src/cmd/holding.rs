//! `lotbook holding`: short-term / long-term classification.

use super::{write_json, OutputFormat};
use anyhow::Result;
use chrono::NaiveDate;
use lotbook_core::{
    calculate_holding_period_with_rules, parse_date, HoldingPeriodRules,
    DEFAULT_LONG_TERM_THRESHOLD_DAYS,
};
use std::io::Write;
use std::process::ExitCode;

/// Classify the holding period between two dates.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Acquisition date
    #[arg(long, value_parser = parse_date)]
    pub acquired: NaiveDate,

    /// Disposal date
    #[arg(long, value_parser = parse_date)]
    pub disposed: NaiveDate,

    /// A holding longer than this many days is long-term
    #[arg(long, default_value_t = DEFAULT_LONG_TERM_THRESHOLD_DAYS)]
    pub long_term_days: i64,
}

/// Run the command.
pub fn run<W: Write>(args: &Args, format: OutputFormat, out: &mut W) -> Result<ExitCode> {
    let rules = HoldingPeriodRules {
        long_term_threshold_days: args.long_term_days,
    };
    let period = calculate_holding_period_with_rules(args.acquired, args.disposed, &rules);

    match format {
        OutputFormat::Json => write_json(out, &period)?,
        OutputFormat::Text => {
            let term = if period.is_long_term { "long-term" } else { "short-term" };
            writeln!(out, "{} days, {term}", period.days)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
