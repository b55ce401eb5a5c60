//! `lotbook average`: weighted average unit cost per asset.

use super::{load_lots, write_json, OutputFormat};
use anyhow::Result;
use lotbook_core::{calculate_weighted_average, Lot};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// Weighted average unit cost of the open lots, per asset.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// JSON lot file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Only report this asset
    #[arg(short, long)]
    pub asset: Option<String>,
}

/// Run the command.
pub fn run<W: Write>(args: &Args, format: OutputFormat, out: &mut W) -> Result<ExitCode> {
    let lots = load_lots(&args.file)?;
    let averages = averages_by_asset(&lots, args.asset.as_deref());

    match format {
        OutputFormat::Json => write_json(out, &averages)?,
        OutputFormat::Text => {
            for (asset, average) in &averages {
                writeln!(out, "{asset:<10} {average}")?;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Average per asset. A requested asset is always reported, as zero when it
/// has no open lots.
fn averages_by_asset(lots: &[Lot], only: Option<&str>) -> BTreeMap<String, Decimal> {
    let mut by_asset: BTreeMap<&str, Vec<&Lot>> = BTreeMap::new();
    if let Some(asset) = only {
        by_asset.insert(asset, Vec::new());
    }

    for lot in lots {
        if only.is_some_and(|asset| asset != lot.asset_symbol) {
            continue;
        }
        by_asset.entry(lot.asset_symbol.as_str()).or_default().push(lot);
    }

    by_asset
        .into_iter()
        .map(|(asset, lots)| (asset.to_string(), calculate_weighted_average(lots)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_averages_by_asset() {
        let lots = vec![
            Lot::new("b1", "BTC", date(2023, 1, 15), dec!(1), dec!(20000)),
            Lot::new("e1", "ETH", date(2023, 1, 15), dec!(2), dec!(3000)),
            Lot::new("b2", "BTC", date(2023, 3, 20), dec!(1), dec!(30000)),
        ];

        let all = averages_by_asset(&lots, None);
        assert_eq!(all["BTC"], dec!(25000));
        assert_eq!(all["ETH"], dec!(1500));

        let eth = averages_by_asset(&lots, Some("ETH"));
        assert_eq!(eth.len(), 1);

        let none = averages_by_asset(&lots, Some("DOGE"));
        assert_eq!(none["DOGE"], Decimal::ZERO);
    }
}
