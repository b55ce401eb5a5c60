//! Lot collection validation.
//!
//! This crate audits lot snapshots for data-integrity problems before they
//! reach the booking engine. Every problem is reported; validation never
//! stops at the first one.
//!
//! # Error Codes
//!
//! | Code | Description |
//! |------|-------------|
//! | L1001 | Remaining quantity exceeds total quantity |
//! | L1002 | Negative remaining quantity |
//! | L1003 | Acquisition cost does not match quantity times unit cost |
//! | L1004 | Acquisition date cannot be parsed |
//! | L1005 | Quantity is zero or negative |
//! | L1006 | Lot id used by more than one lot |
//!
//! # Example
//!
//! ```
//! use lotbook_core::{Lot, NaiveDate};
//! use lotbook_validate::{validate_lots, ErrorCode};
//! use rust_decimal_macros::dec;
//!
//! let lot = Lot::new(
//!     "lot1",
//!     "BTC",
//!     NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
//!     dec!(1.0),
//!     dec!(20000),
//! )
//! .with_remaining(dec!(2.0));
//!
//! let report = validate_lots(&[lot]);
//! assert!(!report.is_valid);
//! assert_eq!(report.errors[0].code, ErrorCode::RemainingExceedsTotal);
//! assert!(report.messages()[0].contains("exceeds total"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use lotbook_core::Lot;
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Validation error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// L1001: Remaining quantity is greater than the quantity acquired.
    RemainingExceedsTotal,
    /// L1002: Remaining quantity is below zero.
    NegativeRemaining,
    /// L1003: Acquisition cost disagrees with quantity times unit cost.
    CostMismatch,
    /// L1004: Acquisition date cannot be parsed.
    InvalidAcquisitionDate,
    /// L1005: Quantity acquired is zero or negative.
    NonPositiveQuantity,
    /// L1006: Lot id appears more than once.
    DuplicateLotId,
}

impl ErrorCode {
    /// Get the error code string (e.g., "L1001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::RemainingExceedsTotal => "L1001",
            Self::NegativeRemaining => "L1002",
            Self::CostMismatch => "L1003",
            Self::InvalidAcquisitionDate => "L1004",
            Self::NonPositiveQuantity => "L1005",
            Self::DuplicateLotId => "L1006",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{code}] {message}")]
pub struct ValidationError {
    /// Error code.
    pub code: ErrorCode,
    /// Lot the error was found on.
    pub lot_id: String,
    /// Error message.
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    #[must_use]
    pub fn new(code: ErrorCode, lot_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            lot_id: lot_id.into(),
            message: message.into(),
        }
    }
}

/// Validation options.
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Largest accepted difference between the acquisition cost and
    /// `quantity * cost_per_unit`.
    pub cost_tolerance: Decimal,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            cost_tolerance: Decimal::new(1, 2),
        }
    }
}

/// Outcome of validating a lot collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// True when no errors were found.
    pub is_valid: bool,
    /// Every error found, grouped by lot in input order.
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Error messages as plain strings.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message.clone()).collect()
    }

    /// Errors with the given code.
    pub fn with_code(&self, code: ErrorCode) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |e| e.code == code)
    }
}

/// Validate a lot collection.
pub fn validate_lots(lots: &[Lot]) -> ValidationReport {
    validate_lots_with_options(lots, &ValidationOptions::default())
}

/// Validate a lot collection with custom options.
pub fn validate_lots_with_options(lots: &[Lot], options: &ValidationOptions) -> ValidationReport {
    let mut errors: Vec<ValidationError> = lots
        .par_iter()
        .flat_map_iter(|lot| validate_lot(lot, options))
        .collect();

    errors.extend(find_duplicate_ids(lots));

    debug!(lots = lots.len(), errors = errors.len(), "validated lots");

    ValidationReport::from_errors(errors)
}

/// Check a single lot.
fn validate_lot(lot: &Lot, options: &ValidationOptions) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let id = lot.lot_id.as_str();

    if lot.quantity <= Decimal::ZERO {
        errors.push(ValidationError::new(
            ErrorCode::NonPositiveQuantity,
            id,
            format!("Lot {id}: non-positive quantity {}", lot.quantity),
        ));
    }

    if lot.remaining_quantity > lot.quantity {
        errors.push(ValidationError::new(
            ErrorCode::RemainingExceedsTotal,
            id,
            format!(
                "Lot {id}: remaining quantity {} exceeds total quantity {}",
                lot.remaining_quantity, lot.quantity
            ),
        ));
    }

    if lot.remaining_quantity < Decimal::ZERO {
        errors.push(ValidationError::new(
            ErrorCode::NegativeRemaining,
            id,
            format!("Lot {id}: Negative remaining quantity {}", lot.remaining_quantity),
        ));
    }

    match lot.quantity.checked_mul(lot.cost_per_unit) {
        Some(expected_cost) => {
            if (lot.acquisition_cost - expected_cost).abs() > options.cost_tolerance {
                errors.push(ValidationError::new(
                    ErrorCode::CostMismatch,
                    id,
                    format!(
                        "Lot {id}: cost mismatch: acquisition cost {} but quantity * cost per unit is {}",
                        lot.acquisition_cost,
                        expected_cost.normalize()
                    ),
                ));
            }
        }
        None => errors.push(ValidationError::new(
            ErrorCode::CostMismatch,
            id,
            format!(
                "Lot {id}: cost mismatch: acquisition cost {} but quantity * cost per unit overflows",
                lot.acquisition_cost
            ),
        )),
    }

    if lot.acquired_on().is_err() {
        errors.push(ValidationError::new(
            ErrorCode::InvalidAcquisitionDate,
            id,
            format!("Lot {id}: Invalid acquisition date {:?}", lot.acquisition_date),
        ));
    }

    errors
}

/// Report every lot id used more than once, in order of first appearance.
fn find_duplicate_ids(lots: &[Lot]) -> Vec<ValidationError> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order = Vec::new();

    for lot in lots {
        let count = counts.entry(lot.lot_id.as_str()).or_insert(0);
        if *count == 0 {
            order.push(lot.lot_id.as_str());
        }
        *count += 1;
    }

    order
        .into_iter()
        .filter_map(|id| {
            let count = counts[id];
            (count > 1).then(|| {
                ValidationError::new(
                    ErrorCode::DuplicateLotId,
                    id,
                    format!("Duplicate lot id {id} used by {count} lots"),
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotbook_core::NaiveDate;
    use rust_decimal_macros::dec;

    fn lot(id: &str) -> Lot {
        Lot::new(
            id,
            "BTC",
            NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
            dec!(1.0),
            dec!(20000),
        )
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::new(ErrorCode::CostMismatch, "lot1", "cost mismatch");
        assert_eq!(err.to_string(), "[L1003] cost mismatch");
    }

    #[test]
    fn test_cost_within_tolerance() {
        let mut lot = lot("lot1");
        lot.acquisition_cost = dec!(20000.01);
        assert!(validate_lot(&lot, &ValidationOptions::default()).is_empty());

        lot.acquisition_cost = dec!(20000.02);
        let errors = validate_lot(&lot, &ValidationOptions::default());
        assert_eq!(errors[0].code, ErrorCode::CostMismatch);
    }

    #[test]
    fn test_custom_tolerance() {
        let mut lot = lot("lot1");
        lot.acquisition_cost = dec!(20005);
        let options = ValidationOptions {
            cost_tolerance: dec!(10),
        };
        assert!(validate_lot(&lot, &options).is_empty());
    }

    #[test]
    fn test_zero_quantity_lot() {
        let mut lot = lot("empty");
        lot.quantity = dec!(0);
        lot.remaining_quantity = dec!(0);
        lot.acquisition_cost = dec!(0);

        let codes: Vec<_> = validate_lot(&lot, &ValidationOptions::default())
            .into_iter()
            .map(|e| e.code)
            .collect();
        assert_eq!(codes, vec![ErrorCode::NonPositiveQuantity]);
    }

    #[test]
    fn test_duplicates_reported_once_per_id() {
        let lots = vec![lot("a"), lot("b"), lot("a"), lot("a"), lot("b"), lot("c")];
        let errors = find_duplicate_ids(&lots);

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].lot_id, "a");
        assert!(errors[0].message.contains("3 lots"));
        assert_eq!(errors[1].lot_id, "b");
    }
}
