//! Lot type representing a discrete acquisition of an asset.
//!
//! A [`Lot`] records how much of an asset was acquired, when, and at what
//! cost. Disposals draw lots down through `remaining_quantity`; a lot whose
//! remaining quantity reaches zero is closed and never selected again.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::date::{parse_date, DateParseError};

/// Free-form metadata carried through lot accounting untouched.
pub type Metadata = BTreeMap<String, String>;

/// A lot is a quantity of an asset acquired at a specific time and cost.
///
/// When you buy 1.5 BTC for 27000 USD on 2023-06-10, the lot is:
/// - quantity: 1.5
/// - `acquisition_cost`: 27000
/// - `cost_per_unit`: 18000
/// - `remaining_quantity`: 1.5 until a disposal consumes some of it
///
/// The acquisition date is kept as the text supplied by the ledger so that
/// malformed records can still be loaded and reported by validation.
///
/// # Examples
///
/// ```
/// use lotbook_core::{Lot, NaiveDate};
/// use rust_decimal_macros::dec;
///
/// let lot = Lot::new(
///     "lot3",
///     "BTC",
///     NaiveDate::from_ymd_opt(2023, 6, 10).unwrap(),
///     dec!(1.5),
///     dec!(27000),
/// );
///
/// assert_eq!(lot.cost_per_unit, dec!(18000));
/// assert_eq!(lot.remaining_quantity, dec!(1.5));
/// assert!(lot.is_open());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    /// Unique lot identifier
    pub lot_id: String,
    /// Acquisition date as ISO 8601 text
    pub acquisition_date: String,
    /// Quantity originally acquired
    pub quantity: Decimal,
    /// Quantity not yet consumed by a disposal
    pub remaining_quantity: Decimal,
    /// Total cost paid for `quantity`
    pub acquisition_cost: Decimal,
    /// Cost of a single unit
    pub cost_per_unit: Decimal,
    /// Asset this lot holds
    pub asset_symbol: String,
    /// Accounting classification (opaque)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    /// Measurement basis, e.g. fair value tracking (opaque)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement: Option<String>,
    /// Additional metadata (opaque)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: Metadata,
}

impl Lot {
    /// Create a new, fully open lot.
    ///
    /// The cost per unit is derived as `acquisition_cost / quantity`; a zero
    /// quantity yields a zero unit cost.
    #[must_use]
    pub fn new(
        lot_id: impl Into<String>,
        asset_symbol: impl Into<String>,
        acquisition_date: NaiveDate,
        quantity: Decimal,
        acquisition_cost: Decimal,
    ) -> Self {
        let cost_per_unit = acquisition_cost
            .checked_div(quantity)
            .unwrap_or(Decimal::ZERO)
            .normalize();

        Self {
            lot_id: lot_id.into(),
            acquisition_date: acquisition_date.format("%Y-%m-%d").to_string(),
            quantity,
            remaining_quantity: quantity,
            acquisition_cost,
            cost_per_unit,
            asset_symbol: asset_symbol.into(),
            classification: None,
            measurement: None,
            metadata: Metadata::new(),
        }
    }

    /// Set the remaining quantity.
    #[must_use]
    pub const fn with_remaining(mut self, remaining: Decimal) -> Self {
        self.remaining_quantity = remaining;
        self
    }

    /// Set the accounting classification.
    #[must_use]
    pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
        self.classification = Some(classification.into());
        self
    }

    /// Set the measurement basis.
    #[must_use]
    pub fn with_measurement(mut self, measurement: impl Into<String>) -> Self {
        self.measurement = Some(measurement.into());
        self
    }

    /// Add a metadata entry.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Parse the acquisition date.
    pub fn acquired_on(&self) -> Result<NaiveDate, DateParseError> {
        parse_date(&self.acquisition_date)
    }

    /// Check if any quantity is left to dispose of.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.remaining_quantity > Decimal::ZERO
    }

    /// Check if the lot has been fully consumed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        !self.is_open()
    }

    /// Cost basis of the quantity still held.
    #[must_use]
    pub fn remaining_cost(&self) -> Decimal {
        self.remaining_quantity * self.cost_per_unit
    }
}

impl fmt::Display for Lot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{} {} @ {} ({})",
            self.lot_id,
            self.remaining_quantity,
            self.quantity,
            self.asset_symbol,
            self.cost_per_unit,
            self.acquisition_date
        )
    }
}

/// Calculate the weighted average cost per unit of the open lots.
///
/// Only lots with a positive remaining quantity take part:
/// `sum(remaining * cost_per_unit) / sum(remaining)`. Returns zero when no
/// lot is open.
#[must_use]
pub fn calculate_weighted_average<'a>(lots: impl IntoIterator<Item = &'a Lot>) -> Decimal {
    let (total_quantity, total_cost) = lots
        .into_iter()
        .filter(|lot| lot.is_open())
        .fold((Decimal::ZERO, Decimal::ZERO), |(qty, cost), lot| {
            (qty + lot.remaining_quantity, cost + lot.remaining_cost())
        });

    if total_quantity.is_zero() {
        return Decimal::ZERO;
    }

    (total_cost / total_quantity).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn sample_lots() -> Vec<Lot> {
        vec![
            Lot::new("lot1", "BTC", date(2023, 1, 15), dec!(1.0), dec!(20000)),
            Lot::new("lot2", "BTC", date(2023, 3, 20), dec!(0.5), dec!(12500)),
            Lot::new("lot3", "BTC", date(2023, 6, 10), dec!(1.5), dec!(27000)),
        ]
    }

    #[test]
    fn test_new_derives_unit_cost() {
        let lots = sample_lots();
        assert_eq!(lots[0].cost_per_unit, dec!(20000));
        assert_eq!(lots[1].cost_per_unit, dec!(25000));
        assert_eq!(lots[2].cost_per_unit, dec!(18000));
        assert_eq!(lots[2].acquisition_date, "2023-06-10");
    }

    #[test]
    fn test_new_zero_quantity() {
        let lot = Lot::new("empty", "BTC", date(2023, 1, 1), dec!(0), dec!(100));
        assert_eq!(lot.cost_per_unit, Decimal::ZERO);
        assert!(lot.is_closed());
    }

    #[test]
    fn test_acquired_on() {
        let mut lot = sample_lots().remove(0);
        assert_eq!(lot.acquired_on().unwrap(), date(2023, 1, 15));

        lot.acquisition_date = "yesterday".to_string();
        assert!(lot.acquired_on().is_err());
    }

    #[test]
    fn test_weighted_average() {
        let avg = calculate_weighted_average(&sample_lots());
        // (20000 + 12500 + 27000) / 3.0
        assert_eq!(avg.round_dp(2), dec!(19833.33));
    }

    #[test]
    fn test_weighted_average_empty() {
        assert_eq!(calculate_weighted_average(&[] as &[Lot]), Decimal::ZERO);
    }

    #[test]
    fn test_weighted_average_skips_closed_lots() {
        let mut lots = sample_lots();
        lots[2] = lots[2].clone().with_remaining(dec!(0));

        // (1.0 * 20000 + 0.5 * 25000) / 1.5
        let avg = calculate_weighted_average(&lots);
        assert_eq!(avg.round_dp(2), dec!(21666.67));
    }

    #[test]
    fn test_weighted_average_uses_remaining() {
        let lots = vec![
            Lot::new("a", "ETH", date(2023, 1, 1), dec!(10), dec!(10000)).with_remaining(dec!(2)),
            Lot::new("b", "ETH", date(2023, 2, 1), dec!(2), dec!(6000)),
        ];
        // (2 * 1000 + 2 * 3000) / 4
        assert_eq!(calculate_weighted_average(&lots), dec!(2000));
    }

    #[test]
    fn test_serde_camel_case() {
        let lot = sample_lots()
            .remove(1)
            .with_classification("inventory")
            .with_meta("wallet", "cold");
        let json = serde_json::to_value(&lot).unwrap();

        assert_eq!(json["lotId"], "lot2");
        assert_eq!(json["remainingQuantity"], "0.5");
        assert_eq!(json["costPerUnit"], "25000");
        assert_eq!(json["classification"], "inventory");
        assert_eq!(json["metadata"]["wallet"], "cold");
        assert!(json.get("measurement").is_none());

        let back: Lot = serde_json::from_value(json).unwrap();
        assert_eq!(back, lot);
    }
}
