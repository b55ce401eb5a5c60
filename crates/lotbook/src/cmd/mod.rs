//! Command implementations for the lotbook CLI.
//!
//! Each module contains the full implementation of one subcommand. [`main`]
//! parses arguments, installs logging and dispatches.

pub mod average;
pub mod basis;
pub mod compare;
pub mod dispose;
pub mod gain;
pub mod holding;
pub mod validate;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use lotbook_core::{parse_date, DisposalMethod, DisposalRequest, Lot};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// JSON output for tooling integration
    Json,
}

/// Cost basis and lot accounting for lot-tracked assets.
#[derive(Parser, Debug)]
#[command(name = "lotbook")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Output format
    #[arg(short, long, value_enum, default_value_t, global = true)]
    pub format: OutputFormat,

    /// Show debug logging on standard error
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Calculate the cost basis of a disposal
    Basis(basis::Args),
    /// Compare FIFO, LIFO and HIFO for the same disposal
    Compare(compare::Args),
    /// Apply a disposal and print the updated lots
    Dispose(dispose::Args),
    /// Check a lot file for data-integrity problems
    Validate(validate::Args),
    /// Weighted average unit cost of the open lots
    Average(average::Args),
    /// Classify a holding period as short-term or long-term
    Holding(holding::Args),
    /// Gain or loss on a disposal
    Gain(gain::Args),
}

/// Disposal arguments shared by `basis` and `dispose`.
#[derive(clap::Args, Debug)]
pub struct DisposalArgs {
    /// Asset to dispose of
    #[arg(short, long)]
    pub asset: String,

    /// Quantity to dispose of
    #[arg(short, long)]
    pub quantity: Decimal,

    /// Lot selection method: FIFO, LIFO, HIFO, SpecificID or AvgCost
    #[arg(short, long, default_value = "FIFO")]
    pub method: DisposalMethod,

    /// Lot to draw from with SpecificID (repeatable)
    #[arg(long = "lot-id", value_name = "LOT_ID")]
    pub lot_ids: Vec<String>,

    /// Disposal date (defaults to today)
    #[arg(short, long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Only lots acquired on or before this date are eligible
    #[arg(long, value_parser = parse_date)]
    pub as_of: Option<NaiveDate>,
}

impl DisposalArgs {
    /// Build the disposal request these arguments describe.
    pub fn request(&self) -> DisposalRequest {
        let date = self.date.unwrap_or_else(|| Local::now().date_naive());
        let mut request = DisposalRequest::new(&self.asset, self.quantity, date, self.method)
            .with_lot_ids(self.lot_ids.iter().cloned());
        request.as_of_date = self.as_of;
        request
    }
}

/// Main entry point.
pub fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut stdout = io::stdout().lock();
    match run(&args, &mut stdout) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

/// Run a parsed command, writing results to `out`.
pub fn run<W: Write>(args: &Args, out: &mut W) -> Result<ExitCode> {
    let format = args.format;
    match &args.command {
        Command::Basis(cmd) => basis::run(cmd, format, out),
        Command::Compare(cmd) => compare::run(cmd, format, out),
        Command::Dispose(cmd) => dispose::run(cmd, format, out),
        Command::Validate(cmd) => validate::run(cmd, format, out),
        Command::Average(cmd) => average::run(cmd, format, out),
        Command::Holding(cmd) => holding::run(cmd, format, out),
        Command::Gain(cmd) => gain::run(cmd, format, out),
    }
}

/// Send log events to standard error: everything at DEBUG with
/// `--verbose`, otherwise whatever `RUST_LOG` selects (warnings by default).
fn init_logging(verbose: bool) {
    let builder = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_span_events(FmtSpan::CLOSE);

    if verbose {
        builder.with_max_level(Level::DEBUG).init();
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        builder.with_env_filter(filter).init();
    }
}

/// Load a JSON array of lots.
pub fn load_lots(path: &Path) -> Result<Vec<Lot>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let lots: Vec<Lot> = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse lots from {}", path.display()))?;

    debug!(path = %path.display(), lots = lots.len(), "loaded lots");
    Ok(lots)
}

/// Write lots as a JSON array.
pub fn save_lots(path: &Path, lots: &[Lot]) -> Result<()> {
    let text = serde_json::to_string_pretty(lots)?;
    fs::write(path, text + "\n").with_context(|| format!("failed to write {}", path.display()))
}

/// Write a value as pretty JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_disposal_args() {
        let args = Args::parse_from([
            "lotbook",
            "basis",
            "lots.json",
            "--asset",
            "BTC",
            "--quantity",
            "0.5",
            "--method",
            "specificid",
            "--lot-id",
            "lot3",
            "--date",
            "2024-01-01",
            "--format",
            "json",
        ]);

        assert_eq!(args.format, OutputFormat::Json);
        let Command::Basis(cmd) = args.command else {
            panic!("expected basis command");
        };
        let request = cmd.disposal.request();
        assert_eq!(request.method, DisposalMethod::SpecificId);
        assert_eq!(request.specific_lot_ids, vec!["lot3".to_string()]);
        assert_eq!(request.quantity.to_string(), "0.5");
        assert_eq!(request.as_of_date, None);
    }

    #[test]
    fn test_rejects_unknown_method() {
        let parsed = Args::try_parse_from([
            "lotbook", "basis", "lots.json", "-a", "BTC", "-q", "1", "-m", "MAGIC",
        ]);
        assert!(parsed.is_err());
    }
}
