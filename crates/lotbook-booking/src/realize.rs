//! Realized gains.
//!
//! Pairs a booked disposal with its proceeds to produce per-lot gains and
//! holding periods, and rolls realized disposals up into tax-year totals.

use chrono::{Datelike, NaiveDate};
use lotbook_core::{
    calculate_gain_loss, calculate_holding_period_with_rules, CostBasisResult, DisposalMethod,
    DisposalRequest, GainLoss, HoldingPeriod, HoldingPeriodRules,
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::select::{pro_rata, ALLOCATION_SCALE};

/// Gain realized on the part of a disposal drawn from one lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealizedLot {
    /// Lot drawn from
    pub lot_id: String,
    /// Acquisition date of the lot
    pub acquired_date: NaiveDate,
    /// Quantity drawn
    pub quantity: Decimal,
    /// Share of the disposal proceeds
    pub proceeds: Decimal,
    /// Cost basis of the quantity drawn
    pub cost_basis: Decimal,
    /// Gain or loss on this lot
    pub gain_loss: GainLoss,
    /// Holding period of this lot
    pub holding_period: HoldingPeriod,
}

/// A disposal with its proceeds and realized gain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealizedDisposal {
    /// Asset disposed of
    pub asset_symbol: String,
    /// Date of the disposal
    pub disposal_date: NaiveDate,
    /// Method used
    pub method: DisposalMethod,
    /// Quantity disposed of
    pub quantity: Decimal,
    /// Total proceeds
    pub proceeds: Decimal,
    /// Total cost basis
    pub cost_basis: Decimal,
    /// Overall gain or loss
    pub gain_loss: GainLoss,
    /// Gain or loss on lots held short-term
    pub short_term_gain: Decimal,
    /// Gain or loss on lots held long-term
    pub long_term_gain: Decimal,
    /// Per-lot breakdown
    pub lots: Vec<RealizedLot>,
}

/// Realize a booked disposal at `proceeds`.
///
/// Proceeds are split across the lots used in proportion to quantity.
pub fn realize_disposal(
    request: &DisposalRequest,
    result: &CostBasisResult,
    proceeds: Decimal,
) -> RealizedDisposal {
    realize_disposal_with_rules(request, result, proceeds, &HoldingPeriodRules::default())
}

/// Realize a booked disposal with custom holding period rules.
pub fn realize_disposal_with_rules(
    request: &DisposalRequest,
    result: &CostBasisResult,
    proceeds: Decimal,
    rules: &HoldingPeriodRules,
) -> RealizedDisposal {
    let shares = split_proceeds(result, proceeds);

    let lots: Vec<RealizedLot> = result
        .lots_used
        .iter()
        .zip(shares)
        .map(|(allocation, share)| RealizedLot {
            lot_id: allocation.lot_id.clone(),
            acquired_date: allocation.acquired_date,
            quantity: allocation.quantity_used,
            proceeds: share.normalize(),
            cost_basis: allocation.cost_basis,
            gain_loss: calculate_gain_loss(allocation.cost_basis, share),
            holding_period: calculate_holding_period_with_rules(
                allocation.acquired_date,
                request.disposal_date,
                rules,
            ),
        })
        .collect();

    let (short_term_gain, long_term_gain) =
        lots.iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(short, long), lot| {
                if lot.holding_period.is_long_term {
                    (short, long + lot.gain_loss.gain_loss)
                } else {
                    (short + lot.gain_loss.gain_loss, long)
                }
            });

    RealizedDisposal {
        asset_symbol: request.asset_symbol.clone(),
        disposal_date: request.disposal_date,
        method: result.method,
        quantity: result.quantity,
        proceeds,
        cost_basis: result.total_cost_basis,
        gain_loss: calculate_gain_loss(result.total_cost_basis, proceeds),
        short_term_gain: short_term_gain.normalize(),
        long_term_gain: long_term_gain.normalize(),
        lots,
    }
}

/// Split proceeds by quantity, residual to the last lot.
fn split_proceeds(result: &CostBasisResult, proceeds: Decimal) -> Vec<Decimal> {
    let quantity = result.quantity_used();
    if quantity.is_zero() {
        return vec![Decimal::ZERO; result.lots_used.len()];
    }

    let mut shares: Vec<Decimal> = result
        .lots_used
        .iter()
        .map(|a| {
            pro_rata(proceeds, a.quantity_used, quantity)
                .round_dp_with_strategy(ALLOCATION_SCALE, RoundingStrategy::ToZero)
        })
        .collect();

    let allocated: Decimal = shares.iter().copied().sum();
    if let Some(last) = shares.last_mut() {
        *last += proceeds - allocated;
    }
    shares
}

/// Realized totals for one calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxYearSummary {
    /// Calendar year
    pub year: i32,
    /// Number of disposals dated in the year
    pub disposal_count: usize,
    /// Total proceeds
    pub proceeds: Decimal,
    /// Total cost basis
    pub cost_basis: Decimal,
    /// Net short-term gain or loss
    pub short_term_gain: Decimal,
    /// Net long-term gain or loss
    pub long_term_gain: Decimal,
    /// Net gain or loss
    pub net_gain: Decimal,
}

impl TaxYearSummary {
    /// Total the disposals dated in `year`; other disposals are ignored.
    #[must_use]
    pub fn from_disposals(year: i32, disposals: &[RealizedDisposal]) -> Self {
        let mut summary = Self {
            year,
            disposal_count: 0,
            proceeds: Decimal::ZERO,
            cost_basis: Decimal::ZERO,
            short_term_gain: Decimal::ZERO,
            long_term_gain: Decimal::ZERO,
            net_gain: Decimal::ZERO,
        };

        for disposal in disposals.iter().filter(|d| d.disposal_date.year() == year) {
            summary.disposal_count += 1;
            summary.proceeds += disposal.proceeds;
            summary.cost_basis += disposal.cost_basis;
            summary.short_term_gain += disposal.short_term_gain;
            summary.long_term_gain += disposal.long_term_gain;
        }

        summary.net_gain = summary.short_term_gain + summary.long_term_gain;
        summary
    }
}
