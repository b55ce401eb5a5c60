//! Integration tests for the validation crate.
//!
//! Tests cover every validation rule and the accumulation of errors across
//! lots.

use lotbook_core::{Lot, NaiveDate};
use lotbook_validate::{validate_lots, validate_lots_with_options, ErrorCode, ValidationOptions};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ============================================================================
// Helper Functions
// ============================================================================

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn btc_lots() -> Vec<Lot> {
    vec![
        Lot::new("lot1", "BTC", date(2023, 1, 15), dec!(1.0), dec!(20000)),
        Lot::new("lot2", "BTC", date(2023, 3, 20), dec!(0.5), dec!(12500)),
        Lot::new("lot3", "BTC", date(2023, 6, 10), dec!(1.5), dec!(27000)),
    ]
}

fn validate_codes(lots: &[Lot]) -> Vec<ErrorCode> {
    validate_lots(lots).errors.iter().map(|e| e.code).collect()
}

// ============================================================================
// Single Rule Tests
// ============================================================================

#[test]
fn test_valid_lots() {
    let report = validate_lots(&btc_lots());
    assert!(report.is_valid);
    assert!(report.errors.is_empty());
}

#[test]
fn test_empty_collection_is_valid() {
    assert!(validate_lots(&[]).is_valid);
}

#[test]
fn test_l1001_remaining_exceeds_total() {
    let lots = vec![btc_lots().remove(0).with_remaining(dec!(2.0))];
    let report = validate_lots(&lots);

    assert!(!report.is_valid);
    assert_eq!(validate_codes(&lots), vec![ErrorCode::RemainingExceedsTotal]);
    assert!(report.messages()[0].contains("exceeds total"));
    assert_eq!(report.errors[0].lot_id, "lot1");
}

#[test]
fn test_l1002_negative_remaining() {
    let lots = vec![btc_lots().remove(0).with_remaining(dec!(-0.1))];
    let report = validate_lots(&lots);

    assert_eq!(validate_codes(&lots), vec![ErrorCode::NegativeRemaining]);
    assert!(report.messages()[0].contains("Negative"));
}

#[test]
fn test_l1003_cost_mismatch() {
    let mut lot = btc_lots().remove(1);
    lot.acquisition_cost = dec!(13000);
    let report = validate_lots(&[lot]);

    assert_eq!(report.errors[0].code, ErrorCode::CostMismatch);
    assert!(report.messages()[0].contains("mismatch"));
}

#[test]
fn test_l1003_respects_tolerance() {
    let mut lot = btc_lots().remove(1);
    lot.acquisition_cost = dec!(12500.5);

    assert!(!validate_lots(std::slice::from_ref(&lot)).is_valid);

    let lenient = ValidationOptions {
        cost_tolerance: dec!(1),
    };
    assert!(validate_lots_with_options(&[lot], &lenient).is_valid);
}

#[test]
fn test_l1003_overflowing_unit_cost() {
    let mut lot = Lot::new("huge", "PEPE", date(2023, 1, 1), dec!(1000000000000000), dec!(10));
    lot.cost_per_unit = dec!(1000000000000000);
    let report = validate_lots(&[lot, btc_lots().remove(0)]);

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].code, ErrorCode::CostMismatch);
    assert_eq!(report.errors[0].lot_id, "huge");
    assert!(report.messages()[0].contains("mismatch"));
    assert!(report.messages()[0].contains("overflows"));
}

#[test]
fn test_l1004_invalid_acquisition_date() {
    let mut lot = btc_lots().remove(2);
    lot.acquisition_date = "2023-13-45".to_string();
    let report = validate_lots(&[lot]);

    assert_eq!(report.errors[0].code, ErrorCode::InvalidAcquisitionDate);
    assert!(report.messages()[0].contains("Invalid acquisition date"));
}

#[test]
fn test_rfc3339_acquisition_date_accepted() {
    let mut lot = btc_lots().remove(2);
    lot.acquisition_date = "2023-06-10T14:30:00Z".to_string();
    assert!(validate_lots(&[lot]).is_valid);
}

#[test]
fn test_l1005_non_positive_quantity() {
    let mut lot = btc_lots().remove(0);
    lot.quantity = dec!(0);
    lot.remaining_quantity = dec!(0);
    lot.acquisition_cost = dec!(0);

    assert_eq!(validate_codes(&[lot]), vec![ErrorCode::NonPositiveQuantity]);
}

#[test]
fn test_l1006_duplicate_lot_id() {
    let mut lots = btc_lots();
    lots[2].lot_id = "lot1".to_string();
    let report = validate_lots(&lots);

    assert_eq!(validate_codes(&lots), vec![ErrorCode::DuplicateLotId]);
    assert!(report.messages()[0].contains("Duplicate lot id lot1"));
}

#[test]
fn test_closed_lot_is_valid() {
    let lots = vec![btc_lots().remove(0).with_remaining(dec!(0))];
    assert!(validate_lots(&lots).is_valid);
}

// ============================================================================
// Accumulation Tests
// ============================================================================

#[test]
fn test_all_violations_reported() {
    let mut lots = btc_lots();
    lots[0] = lots[0].clone().with_remaining(dec!(2.0));
    lots[1].remaining_quantity = dec!(-1);
    lots[1].acquisition_cost = dec!(99);
    lots[2].acquisition_date = "not a date".to_string();

    let report = validate_lots(&lots);
    assert!(!report.is_valid);
    assert_eq!(
        validate_codes(&lots),
        vec![
            ErrorCode::RemainingExceedsTotal,
            ErrorCode::NegativeRemaining,
            ErrorCode::CostMismatch,
            ErrorCode::InvalidAcquisitionDate,
        ]
    );

    let lot_ids: Vec<&str> = report.errors.iter().map(|e| e.lot_id.as_str()).collect();
    assert_eq!(lot_ids, vec!["lot1", "lot2", "lot2", "lot3"]);
}

#[test]
fn test_errors_keep_lot_order() {
    let lots: Vec<Lot> = (0..200)
        .map(|i| {
            Lot::new(format!("lot{i}"), "BTC", date(2023, 1, 1), dec!(1), dec!(100))
                .with_remaining(dec!(5))
        })
        .collect();

    let report = validate_lots(&lots);
    assert_eq!(report.errors.len(), 200);
    for (i, error) in report.errors.iter().enumerate() {
        assert_eq!(error.lot_id, format!("lot{i}"));
    }
}

#[test]
fn test_with_code_filter() {
    let mut lots = btc_lots();
    lots[0] = lots[0].clone().with_remaining(dec!(-1));
    lots[2] = lots[2].clone().with_remaining(dec!(-1));

    let report = validate_lots(&lots);
    assert_eq!(report.with_code(ErrorCode::NegativeRemaining).count(), 2);
    assert_eq!(report.with_code(ErrorCode::CostMismatch).count(), 0);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Lots built from their own quantity and cost always validate
    #[test]
    fn prop_consistent_lots_are_valid(
        quantity in 1i64..1_000_000i64,
        cost in 1i64..100_000_000i64,
        consumed_pct in 0u32..=100u32,
    ) {
        let quantity = Decimal::new(quantity, 3);
        let remaining = quantity * Decimal::from(100 - consumed_pct) / Decimal::from(100);
        let lot = Lot::new("lot", "BTC", date(2024, 1, 1), quantity, Decimal::new(cost, 2))
            .with_remaining(remaining);

        let report = validate_lots(&[lot]);
        prop_assert!(report.is_valid, "{:?}", report.errors);
    }
}
