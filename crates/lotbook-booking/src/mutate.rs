//! Applying disposals to lot collections.
//!
//! A disposal is applied by reading back the `lots_used` of its
//! [`CostBasisResult`] and reducing each referenced lot's remaining quantity.
//! The input collection is never modified; a new collection is returned in
//! the same order.

use lotbook_core::{CostBasisResult, Lot};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::warn;

use crate::BookingError;

/// Sum the quantity drawn from each lot.
fn usage_by_lot(result: &CostBasisResult) -> HashMap<&str, Decimal> {
    let mut usage: HashMap<&str, Decimal> = HashMap::new();
    for allocation in &result.lots_used {
        *usage.entry(allocation.lot_id.as_str()).or_default() += allocation.quantity_used;
    }
    usage
}

/// Apply a disposal to a lot collection.
///
/// Every lot referenced by `result` comes back with its remaining quantity
/// reduced by the quantity used; other lots come back unchanged. A
/// remaining quantity never goes below zero.
///
/// A result computed from the same lots always fits. Overdrawing a lot or
/// referencing a lot missing from `lots` is a consistency error: it is
/// logged, and debug builds panic. Use [`try_update_lots_after_disposal`] to
/// receive these as errors instead.
pub fn update_lots_after_disposal(lots: &[Lot], result: &CostBasisResult) -> Vec<Lot> {
    let mut usage = usage_by_lot(result);

    let updated = lots
        .iter()
        .map(|lot| {
            let Some(used) = usage.remove(lot.lot_id.as_str()) else {
                return lot.clone();
            };

            let next = lot.remaining_quantity - used;
            if next < Decimal::ZERO {
                warn!(
                    lot = %lot.lot_id,
                    remaining = %lot.remaining_quantity,
                    used = %used,
                    "disposal overdraws lot, clamping remaining quantity to zero"
                );
            }
            debug_assert!(
                next >= Decimal::ZERO,
                "disposal overdraws lot {}: remaining {}, used {}",
                lot.lot_id,
                lot.remaining_quantity,
                used
            );

            lot.clone().with_remaining(next.max(Decimal::ZERO).normalize())
        })
        .collect();

    for lot_id in usage.keys() {
        warn!(lot = %lot_id, "disposal references a lot missing from the collection");
    }
    debug_assert!(
        usage.is_empty(),
        "disposal references unknown lots: {:?}",
        usage.keys().collect::<Vec<_>>()
    );

    updated
}

/// Apply a disposal to a lot collection, failing on any inconsistency.
///
/// Like [`update_lots_after_disposal`], but returns
/// [`BookingError::Overdrawn`] or [`BookingError::UnknownLot`] rather than
/// clamping or skipping.
pub fn try_update_lots_after_disposal(
    lots: &[Lot],
    result: &CostBasisResult,
) -> Result<Vec<Lot>, BookingError> {
    let mut usage = usage_by_lot(result);
    let mut updated = Vec::with_capacity(lots.len());

    for lot in lots {
        let Some(used) = usage.remove(lot.lot_id.as_str()) else {
            updated.push(lot.clone());
            continue;
        };

        if used > lot.remaining_quantity {
            return Err(BookingError::Overdrawn {
                lot_id: lot.lot_id.clone(),
                remaining: lot.remaining_quantity,
                used,
            });
        }

        updated.push(
            lot.clone()
                .with_remaining((lot.remaining_quantity - used).normalize()),
        );
    }

    // Report the first unknown lot in selection order
    if let Some(missing) = result
        .lots_used
        .iter()
        .find(|a| usage.contains_key(a.lot_id.as_str()))
    {
        return Err(BookingError::UnknownLot {
            lot_id: missing.lot_id.clone(),
        });
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use lotbook_core::{DisposalMethod, LotAllocation};
    use rust_decimal_macros::dec;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn lots() -> Vec<Lot> {
        vec![
            Lot::new("lot1", "BTC", date(2023, 1, 15), dec!(1.0), dec!(20000)),
            Lot::new("lot2", "BTC", date(2023, 3, 20), dec!(0.5), dec!(12500)),
        ]
    }

    fn result_using(entries: &[(&str, Decimal)]) -> CostBasisResult {
        let lots_used: Vec<LotAllocation> = entries
            .iter()
            .map(|(id, qty)| LotAllocation {
                lot_id: (*id).to_string(),
                acquired_date: date(2023, 1, 15),
                quantity_used: *qty,
                cost_basis: Decimal::ZERO,
                cost_per_unit: Decimal::ZERO,
            })
            .collect();
        CostBasisResult {
            method: DisposalMethod::SpecificId,
            quantity: lots_used.iter().map(|a| a.quantity_used).sum(),
            total_cost_basis: Decimal::ZERO,
            average_cost_per_unit: Decimal::ZERO,
            lots_used,
        }
    }

    #[test]
    fn test_repeated_lot_entries_accumulate() {
        let updated = update_lots_after_disposal(
            &lots(),
            &result_using(&[("lot1", dec!(0.25)), ("lot1", dec!(0.25))]),
        );
        assert_eq!(updated[0].remaining_quantity, dec!(0.5));
    }

    #[test]
    fn test_input_untouched() {
        let original = lots();
        let _ = update_lots_after_disposal(&original, &result_using(&[("lot2", dec!(0.5))]));
        assert_eq!(original, lots());
    }

    #[test]
    fn test_try_update_overdrawn() {
        let err = try_update_lots_after_disposal(&lots(), &result_using(&[("lot2", dec!(0.6))]))
            .unwrap_err();
        assert_eq!(
            err,
            BookingError::Overdrawn {
                lot_id: "lot2".to_string(),
                remaining: dec!(0.5),
                used: dec!(0.6),
            }
        );
    }

    #[test]
    fn test_try_update_unknown_lot() {
        let err = try_update_lots_after_disposal(
            &lots(),
            &result_using(&[("lot1", dec!(0.1)), ("ghost", dec!(0.1))]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            BookingError::UnknownLot {
                lot_id: "ghost".to_string()
            }
        );
    }

    #[test]
    fn test_try_update_ok() {
        let updated =
            try_update_lots_after_disposal(&lots(), &result_using(&[("lot2", dec!(0.5))])).unwrap();
        assert_eq!(updated[0], lots()[0]);
        assert!(updated[1].is_closed());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "overdraws lot lot2")]
    fn test_overdraw_panics_in_debug() {
        let _ = update_lots_after_disposal(&lots(), &result_using(&[("lot2", dec!(1))]));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "unknown lots")]
    fn test_unknown_lot_panics_in_debug() {
        let _ = update_lots_after_disposal(&lots(), &result_using(&[("ghost", dec!(1))]));
    }
}
