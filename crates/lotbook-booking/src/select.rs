//! Lot selection.
//!
//! Filters a lot collection down to the lots a disposal may draw from, orders
//! them according to the disposal method, and walks the ordering to cover
//! the requested quantity.

use chrono::NaiveDate;
use lotbook_core::{DisposalMethod, DisposalRequest, Lot};
use rust_decimal::{Decimal, RoundingStrategy};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

use crate::BookingError;

/// Decimal places kept when splitting a disposal across lots by share.
pub const ALLOCATION_SCALE: u32 = 18;

/// `value * part / whole`.
///
/// Multiplies first when the product fits, so exact ratios stay exact; for
/// very large amounts it divides first instead of overflowing.
pub(crate) fn pro_rata(value: Decimal, part: Decimal, whole: Decimal) -> Decimal {
    value
        .checked_mul(part)
        .map_or_else(|| value / whole * part, |product| product / whole)
}

/// A lot that may take part in a disposal.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// The lot.
    pub lot: &'a Lot,
    /// Parsed acquisition date.
    pub acquired: NaiveDate,
}

/// Quantity drawn from one lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation<'a> {
    /// The lot drawn from.
    pub lot: &'a Lot,
    /// Parsed acquisition date.
    pub acquired: NaiveDate,
    /// Quantity taken.
    pub quantity: Decimal,
}

/// Collect the lots eligible for a disposal of `asset`.
///
/// A lot is eligible when it holds `asset`, is still open, and (with a
/// cutoff) was acquired on or before `as_of`. The result keeps input order.
pub fn eligible_lots<'a>(
    lots: &'a [Lot],
    asset: &str,
    as_of: Option<NaiveDate>,
) -> Result<Vec<Candidate<'a>>, BookingError> {
    let mut candidates = Vec::new();

    for lot in lots {
        if lot.asset_symbol != asset || !lot.is_open() {
            continue;
        }

        let acquired = lot
            .acquired_on()
            .map_err(|_| BookingError::InvalidLotDate {
                lot_id: lot.lot_id.clone(),
                value: lot.acquisition_date.clone(),
            })?;

        if as_of.is_some_and(|cutoff| acquired > cutoff) {
            continue;
        }

        candidates.push(Candidate { lot, acquired });
    }

    Ok(candidates)
}

/// Order candidates for a method that draws lots in a fixed order.
///
/// Ties always fall back to the lot id so results are reproducible.
/// `SpecificID` and `AvgCost` leave the order unchanged.
pub fn order_candidates(candidates: &mut [Candidate<'_>], method: DisposalMethod) {
    let by_id = |a: &Candidate<'_>, b: &Candidate<'_>| a.lot.lot_id.cmp(&b.lot.lot_id);

    match method {
        DisposalMethod::Fifo => {
            candidates.sort_by(|a, b| a.acquired.cmp(&b.acquired).then_with(|| by_id(a, b)));
        }
        DisposalMethod::Lifo => {
            candidates.sort_by(|a, b| b.acquired.cmp(&a.acquired).then_with(|| by_id(a, b)));
        }
        DisposalMethod::Hifo => {
            candidates.sort_by(|a, b| {
                b.lot
                    .cost_per_unit
                    .cmp(&a.lot.cost_per_unit)
                    .then_with(|| a.acquired.cmp(&b.acquired))
                    .then_with(|| by_id(a, b))
            });
        }
        DisposalMethod::SpecificId | DisposalMethod::AvgCost => {}
    }
}

/// Select lots to cover `request.quantity`.
///
/// Returns one [`Allocation`] per lot drawn from, in selection order. The
/// allocated quantities always sum to the requested quantity; if the
/// eligible lots cannot cover it, nothing is returned.
///
/// `AvgCost` draws every eligible lot in proportion to its remaining
/// quantity.
pub fn select_lots<'a>(
    request: &DisposalRequest,
    lots: &'a [Lot],
) -> Result<Vec<Allocation<'a>>, BookingError> {
    if request.quantity <= Decimal::ZERO {
        return Err(BookingError::NonPositiveQuantity {
            quantity: request.quantity,
        });
    }

    if request.method == DisposalMethod::SpecificId && request.specific_lot_ids.is_empty() {
        return Err(BookingError::SpecificLotIdsRequired);
    }

    let mut candidates = eligible_lots(lots, &request.asset_symbol, request.as_of_date)?;

    debug!(
        asset = %request.asset_symbol,
        method = %request.method,
        eligible = candidates.len(),
        "selecting lots"
    );

    if candidates.is_empty() {
        return Err(BookingError::NoMatchingLots {
            asset: request.asset_symbol.clone(),
            missing_ids: request.specific_lot_ids.clone(),
        });
    }

    match request.method {
        DisposalMethod::SpecificId => {
            let named = pick_specific(&candidates, request)?;
            allocate_in_order(&named, request.quantity, &request.asset_symbol)
        }
        DisposalMethod::AvgCost => {
            order_candidates(&mut candidates, DisposalMethod::Fifo);
            allocate_proportionally(&candidates, request.quantity, &request.asset_symbol)
        }
        method => {
            order_candidates(&mut candidates, method);
            allocate_in_order(&candidates, request.quantity, &request.asset_symbol)
        }
    }
}

/// Resolve the lot ids of a `SpecificID` request against the candidates.
fn pick_specific<'a>(
    candidates: &[Candidate<'a>],
    request: &DisposalRequest,
) -> Result<Vec<Candidate<'a>>, BookingError> {
    let mut seen = HashSet::new();
    let mut picked = Vec::new();
    let mut missing = Vec::new();

    for id in &request.specific_lot_ids {
        if !seen.insert(id.as_str()) {
            continue;
        }
        match candidates.iter().find(|c| &c.lot.lot_id == id) {
            Some(candidate) => picked.push(*candidate),
            None => missing.push(id.clone()),
        }
    }

    if !missing.is_empty() {
        return Err(BookingError::NoMatchingLots {
            asset: request.asset_symbol.clone(),
            missing_ids: missing,
        });
    }

    Ok(picked)
}

/// Greedily draw from the candidates in the given order.
fn allocate_in_order<'a>(
    ordered: &[Candidate<'a>],
    quantity: Decimal,
    asset: &str,
) -> Result<Vec<Allocation<'a>>, BookingError> {
    let mut needed = quantity;
    let mut allocations = Vec::new();

    for candidate in ordered {
        if needed.is_zero() {
            break;
        }

        let take = needed.min(candidate.lot.remaining_quantity);
        allocations.push(Allocation {
            lot: candidate.lot,
            acquired: candidate.acquired,
            quantity: take,
        });
        needed -= take;
    }

    if !needed.is_zero() {
        return Err(BookingError::InsufficientQuantity {
            asset: asset.to_string(),
            requested: quantity,
            available: quantity - needed,
        });
    }

    Ok(allocations)
}

/// Draw from every candidate in proportion to its remaining quantity.
///
/// Each share is truncated to [`ALLOCATION_SCALE`] places; the residual is
/// then placed from the last candidate backwards so the shares sum exactly
/// to `quantity` without exceeding any lot or going negative.
fn allocate_proportionally<'a>(
    candidates: &[Candidate<'a>],
    quantity: Decimal,
    asset: &str,
) -> Result<Vec<Allocation<'a>>, BookingError> {
    let available: Decimal = candidates.iter().map(|c| c.lot.remaining_quantity).sum();

    match quantity.cmp(&available) {
        Ordering::Greater => {
            return Err(BookingError::InsufficientQuantity {
                asset: asset.to_string(),
                requested: quantity,
                available,
            });
        }
        Ordering::Equal => {
            return Ok(candidates
                .iter()
                .map(|c| Allocation {
                    lot: c.lot,
                    acquired: c.acquired,
                    quantity: c.lot.remaining_quantity,
                })
                .collect());
        }
        Ordering::Less => {}
    }

    let mut takes: Vec<Decimal> = candidates
        .iter()
        .map(|c| {
            pro_rata(c.lot.remaining_quantity, quantity, available)
                .round_dp_with_strategy(ALLOCATION_SCALE, RoundingStrategy::ToZero)
        })
        .collect();

    let mut residual = quantity - takes.iter().copied().sum::<Decimal>();
    for (take, candidate) in takes.iter_mut().zip(candidates).rev() {
        if residual.is_zero() {
            break;
        }
        let extra = if residual.is_sign_positive() {
            residual.min(candidate.lot.remaining_quantity - *take)
        } else {
            residual.max(-*take)
        };
        *take += extra;
        residual -= extra;
    }

    Ok(candidates
        .iter()
        .zip(takes)
        .filter(|(_, take)| !take.is_zero())
        .map(|(c, take)| Allocation {
            lot: c.lot,
            acquired: c.acquired,
            quantity: take,
        })
        .collect())
}
