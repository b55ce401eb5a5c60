//! Gain and loss calculation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Realized gain or loss of a disposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GainLoss {
    /// Proceeds minus cost basis
    pub gain_loss: Decimal,
    /// True unless the disposal lost money; a zero result counts as a gain
    pub is_gain: bool,
}

/// Calculate the gain or loss of selling at `proceeds` what cost `cost_basis`.
///
/// ```
/// use lotbook_core::calculate_gain_loss;
/// use rust_decimal_macros::dec;
///
/// let result = calculate_gain_loss(dec!(20000), dec!(20000));
/// assert_eq!(result.gain_loss.to_string(), "0");
/// assert!(result.is_gain);
/// ```
#[must_use]
pub fn calculate_gain_loss(cost_basis: Decimal, proceeds: Decimal) -> GainLoss {
    let gain_loss = (proceeds - cost_basis).normalize();
    GainLoss {
        gain_loss,
        is_gain: gain_loss >= Decimal::ZERO,
    }
}
