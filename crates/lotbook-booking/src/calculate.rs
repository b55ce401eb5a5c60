//! Cost basis calculation.

use chrono::NaiveDate;
use lotbook_core::{
    calculate_weighted_average, CostBasisResult, DisposalMethod, DisposalRequest, Lot,
    LotAllocation,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::select::{eligible_lots, pro_rata, select_lots, Allocation, ALLOCATION_SCALE};
use crate::BookingError;

/// Calculate the cost basis of a disposal.
///
/// Lot-by-lot methods (FIFO, LIFO, HIFO, `SpecificID`) charge each allocation
/// at its lot's unit cost. `AvgCost` charges the whole disposal at the
/// weighted average unit cost of the eligible lots, while still recording
/// the proportional draw on every lot so the disposal can be applied.
///
/// Fails without a partial result if the lots cannot cover the request.
///
/// # Example
///
/// ```
/// use lotbook_booking::calculate_cost_basis;
/// use lotbook_core::{DisposalMethod, DisposalRequest, Lot, NaiveDate};
/// use rust_decimal_macros::dec;
///
/// let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
/// let lots = vec![
///     Lot::new("lot1", "BTC", date(2023, 1, 15), dec!(1.0), dec!(20000)),
///     Lot::new("lot2", "BTC", date(2023, 3, 20), dec!(0.5), dec!(12500)),
/// ];
///
/// let request = DisposalRequest::new("BTC", dec!(1.0), date(2024, 1, 1), DisposalMethod::Fifo);
/// let result = calculate_cost_basis(&request, &lots).unwrap();
///
/// assert_eq!(result.total_cost_basis.to_string(), "20000");
/// assert_eq!(result.lots_used.len(), 1);
/// ```
pub fn calculate_cost_basis(
    request: &DisposalRequest,
    lots: &[Lot],
) -> Result<CostBasisResult, BookingError> {
    let allocations = select_lots(request, lots)?;

    let result = match request.method {
        DisposalMethod::AvgCost => {
            let pool = eligible_lots(lots, &request.asset_symbol, request.as_of_date)?;
            let unit_cost = calculate_weighted_average(pool.iter().map(|c| c.lot));
            let pool_quantity: Decimal = pool.iter().map(|c| c.lot.remaining_quantity).sum();
            let pool_cost: Decimal = pool.iter().map(|c| c.lot.remaining_cost()).sum();

            // Charged as one blended allocation, not the sum of rounded parts
            let total = pro_rata(pool_cost, request.quantity, pool_quantity).normalize();

            // Per-lot shares of the total; the last lot absorbs the rounding
            let mut costs: Vec<Decimal> = allocations
                .iter()
                .map(|a| (a.quantity * unit_cost).round_dp(ALLOCATION_SCALE))
                .collect();
            let charged: Decimal = costs.iter().copied().sum();
            if let Some(last) = costs.last_mut() {
                *last += total - charged;
            }

            build_result(request, &allocations, |_| unit_cost, costs, total)
        }
        _ => {
            let costs: Vec<Decimal> = allocations
                .iter()
                .map(|a| a.quantity * a.lot.cost_per_unit)
                .collect();
            let total = costs.iter().copied().sum();
            build_result(request, &allocations, |a| a.lot.cost_per_unit, costs, total)
        }
    };

    debug!(
        asset = %request.asset_symbol,
        method = %request.method,
        quantity = %request.quantity,
        total_cost_basis = %result.total_cost_basis,
        lots = result.lots_used.len(),
        "calculated cost basis"
    );

    Ok(result)
}

fn build_result(
    request: &DisposalRequest,
    allocations: &[Allocation<'_>],
    unit_cost: impl Fn(&Allocation<'_>) -> Decimal,
    costs: Vec<Decimal>,
    total_cost_basis: Decimal,
) -> CostBasisResult {
    let lots_used = allocations
        .iter()
        .zip(costs)
        .map(|(a, cost_basis)| LotAllocation {
            lot_id: a.lot.lot_id.clone(),
            acquired_date: a.acquired,
            quantity_used: a.quantity.normalize(),
            cost_basis: cost_basis.normalize(),
            cost_per_unit: unit_cost(a).normalize(),
        })
        .collect();

    let total_cost_basis = total_cost_basis.normalize();

    CostBasisResult {
        method: request.method,
        quantity: request.quantity,
        total_cost_basis,
        average_cost_per_unit: (total_cost_basis / request.quantity).normalize(),
        lots_used,
    }
}

/// Total cost basis of the same disposal under FIFO, LIFO and HIFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodComparison {
    /// Cost basis under FIFO.
    #[serde(rename = "FIFO")]
    pub fifo: Decimal,
    /// Cost basis under LIFO.
    #[serde(rename = "LIFO")]
    pub lifo: Decimal,
    /// Cost basis under HIFO.
    #[serde(rename = "HIFO")]
    pub hifo: Decimal,
}

impl MethodComparison {
    /// Cost basis for one of the compared methods.
    #[must_use]
    pub const fn get(&self, method: DisposalMethod) -> Option<Decimal> {
        match method {
            DisposalMethod::Fifo => Some(self.fifo),
            DisposalMethod::Lifo => Some(self.lifo),
            DisposalMethod::Hifo => Some(self.hifo),
            DisposalMethod::SpecificId | DisposalMethod::AvgCost => None,
        }
    }

    /// The compared method with the highest cost basis (lowest gain).
    #[must_use]
    pub fn highest(&self) -> (DisposalMethod, Decimal) {
        DisposalMethod::ORDERED
            .into_iter()
            .filter_map(|m| self.get(m).map(|v| (m, v)))
            .fold((DisposalMethod::Fifo, self.fifo), |best, next| {
                if next.1 > best.1 {
                    next
                } else {
                    best
                }
            })
    }
}

/// Compare FIFO, LIFO and HIFO for disposing of `quantity` of `asset`.
///
/// Nothing is mutated. If any method fails, the comparison fails with that
/// method's error.
pub fn calculate_all_methods(
    lots: &[Lot],
    asset: &str,
    quantity: Decimal,
    as_of: Option<NaiveDate>,
) -> Result<MethodComparison, BookingError> {
    let disposal_date = as_of.unwrap_or(NaiveDate::MAX);
    let basis = |method| {
        let mut request = DisposalRequest::new(asset, quantity, disposal_date, method);
        request.as_of_date = as_of;
        calculate_cost_basis(&request, lots).map(|r| r.total_cost_basis)
    };

    Ok(MethodComparison {
        fifo: basis(DisposalMethod::Fifo)?,
        lifo: basis(DisposalMethod::Lifo)?,
        hifo: basis(DisposalMethod::Hifo)?,
    })
}

/// Compare methods over a lot collection holding a single asset.
///
/// Every lot in the collection takes part. An empty collection fails with
/// [`BookingError::NoMatchingLots`]; a collection holding more than one
/// asset fails with [`BookingError::MixedAssets`].
pub fn calculate_all_methods_for(
    lots: &[Lot],
    quantity: Decimal,
    as_of: Option<NaiveDate>,
) -> Result<MethodComparison, BookingError> {
    let mut assets: Vec<&str> = Vec::new();
    for lot in lots {
        if !assets.contains(&lot.asset_symbol.as_str()) {
            assets.push(&lot.asset_symbol);
        }
    }

    match assets.as_slice() {
        [] => Err(BookingError::NoMatchingLots {
            asset: String::new(),
            missing_ids: Vec::new(),
        }),
        [asset] => calculate_all_methods(lots, asset, quantity, as_of),
        _ => Err(BookingError::MixedAssets {
            assets: assets.into_iter().map(str::to_string).collect(),
        }),
    }
}

/// Total remaining quantity available to a disposal of `asset`.
pub fn available_quantity(
    lots: &[Lot],
    asset: &str,
    as_of: Option<NaiveDate>,
) -> Result<Decimal, BookingError> {
    Ok(eligible_lots(lots, asset, as_of)?
        .iter()
        .map(|c| c.lot.remaining_quantity)
        .sum())
}
