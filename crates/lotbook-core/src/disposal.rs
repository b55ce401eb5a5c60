//! Disposal requests and cost basis results.
//!
//! A [`DisposalRequest`] names the asset, quantity, date and
//! [`DisposalMethod`] of a sale. Booking it against a set of lots produces a
//! [`CostBasisResult`] listing every lot drawn from.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Disposal method determines which lots a disposal consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DisposalMethod {
    /// First In, First Out. Oldest lots are consumed first.
    #[default]
    #[serde(rename = "FIFO")]
    Fifo,
    /// Last In, First Out. Newest lots are consumed first.
    #[serde(rename = "LIFO")]
    Lifo,
    /// Highest In, First Out. Highest unit cost lots are consumed first.
    #[serde(rename = "HIFO")]
    Hifo,
    /// Lots are named explicitly by the caller, in order.
    #[serde(rename = "SpecificID")]
    SpecificId,
    /// One blended cost per unit across all eligible lots.
    #[serde(rename = "AvgCost")]
    AvgCost,
}

impl DisposalMethod {
    /// The methods that draw lots in a fixed order without caller input.
    pub const ORDERED: [Self; 3] = [Self::Fifo, Self::Lifo, Self::Hifo];
}

/// Text that does not name a disposal method.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown disposal method: {0}")]
pub struct UnknownMethodError(pub String);

impl FromStr for DisposalMethod {
    type Err = UnknownMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "FIFO" => Ok(Self::Fifo),
            "LIFO" => Ok(Self::Lifo),
            "HIFO" => Ok(Self::Hifo),
            "SPECIFICID" | "SPECIFIC_ID" | "SPECIFIC-ID" => Ok(Self::SpecificId),
            "AVGCOST" | "AVG_COST" | "AVERAGE" => Ok(Self::AvgCost),
            _ => Err(UnknownMethodError(s.to_string())),
        }
    }
}

impl fmt::Display for DisposalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fifo => write!(f, "FIFO"),
            Self::Lifo => write!(f, "LIFO"),
            Self::Hifo => write!(f, "HIFO"),
            Self::SpecificId => write!(f, "SpecificID"),
            Self::AvgCost => write!(f, "AvgCost"),
        }
    }
}

/// A sale, exchange or consumption of some quantity of an asset.
///
/// # Examples
///
/// ```
/// use lotbook_core::{DisposalMethod, DisposalRequest, NaiveDate};
/// use rust_decimal_macros::dec;
///
/// let request = DisposalRequest::new(
///     "BTC",
///     dec!(0.5),
///     NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
///     DisposalMethod::SpecificId,
/// )
/// .with_lot_ids(["lot3"]);
///
/// assert_eq!(request.specific_lot_ids, vec!["lot3".to_string()]);
/// assert!(request.as_of_date.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisposalRequest {
    /// Asset whose lots are drawn from
    pub asset_symbol: String,
    /// Quantity disposed of
    pub quantity: Decimal,
    /// Date of the disposal
    pub disposal_date: NaiveDate,
    /// Lot selection method
    pub method: DisposalMethod,
    /// Lots to consume, in order (`SpecificID` only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub specific_lot_ids: Vec<String>,
    /// Only lots acquired on or before this date are eligible
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of_date: Option<NaiveDate>,
}

impl DisposalRequest {
    /// Create a new disposal request.
    #[must_use]
    pub fn new(
        asset_symbol: impl Into<String>,
        quantity: Decimal,
        disposal_date: NaiveDate,
        method: DisposalMethod,
    ) -> Self {
        Self {
            asset_symbol: asset_symbol.into(),
            quantity,
            disposal_date,
            method,
            specific_lot_ids: Vec::new(),
            as_of_date: None,
        }
    }

    /// Name the lots to consume for a `SpecificID` disposal.
    #[must_use]
    pub fn with_lot_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.specific_lot_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict eligible lots to those acquired on or before `date`.
    #[must_use]
    pub const fn with_as_of(mut self, date: NaiveDate) -> Self {
        self.as_of_date = Some(date);
        self
    }
}

/// The part of a disposal drawn from a single lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotAllocation {
    /// Lot drawn from
    pub lot_id: String,
    /// Acquisition date of the lot
    pub acquired_date: NaiveDate,
    /// Quantity taken from the lot
    pub quantity_used: Decimal,
    /// Cost basis attributed to `quantity_used`
    pub cost_basis: Decimal,
    /// Unit cost applied
    pub cost_per_unit: Decimal,
}

/// Result of booking a disposal against a set of lots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBasisResult {
    /// Method used
    pub method: DisposalMethod,
    /// Quantity disposed of
    pub quantity: Decimal,
    /// Sum of the cost basis of every allocation
    pub total_cost_basis: Decimal,
    /// `total_cost_basis / quantity`
    pub average_cost_per_unit: Decimal,
    /// Lots consumed, in selection order
    pub lots_used: Vec<LotAllocation>,
}

impl CostBasisResult {
    /// Total quantity drawn across all allocations.
    #[must_use]
    pub fn quantity_used(&self) -> Decimal {
        self.lots_used.iter().map(|a| a.quantity_used).sum()
    }

    /// Identifiers of the lots consumed, in selection order.
    pub fn lot_ids(&self) -> impl Iterator<Item = &str> {
        self.lots_used.iter().map(|a| a.lot_id.as_str())
    }
}
