//! Booking errors.

use lotbook_core::UnknownMethodError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Error that can occur while booking a disposal.
///
/// All variants describe bad caller input; none are transient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    /// The eligible lots hold less than the requested quantity.
    #[error("insufficient quantity of {asset}: requested {requested}, available {available}")]
    InsufficientQuantity {
        /// The asset being disposed of.
        asset: String,
        /// Quantity requested.
        requested: Decimal,
        /// Quantity held by eligible lots.
        available: Decimal,
    },

    /// The disposal method is not one of the supported methods.
    #[error("unknown disposal method: {method}")]
    UnknownMethod {
        /// The rejected method name.
        method: String,
    },

    /// A `SpecificID` disposal named no lots.
    #[error("specific lot ids are required for SpecificID disposals")]
    SpecificLotIdsRequired,

    /// No eligible lot matches the disposal.
    #[error("no matching lots for {asset}{}", describe_missing(.missing_ids))]
    NoMatchingLots {
        /// The asset being disposed of.
        asset: String,
        /// Requested lot ids absent from the eligible set (`SpecificID` only).
        missing_ids: Vec<String>,
    },

    /// A single-asset operation was given lots of several assets.
    #[error("lots hold more than one asset: {}", .assets.join(", "))]
    MixedAssets {
        /// Assets found, in order of first appearance.
        assets: Vec<String>,
    },

    /// The disposal quantity is zero or negative.
    #[error("disposal quantity must be positive, got {quantity}")]
    NonPositiveQuantity {
        /// The rejected quantity.
        quantity: Decimal,
    },

    /// An eligible lot carries an unparseable acquisition date.
    #[error("lot {lot_id} has an invalid acquisition date: {value:?}")]
    InvalidLotDate {
        /// The lot.
        lot_id: String,
        /// The raw date text.
        value: String,
    },

    /// Applying a disposal would drive a lot below zero.
    #[error("lot {lot_id} overdrawn: remaining {remaining}, used {used}")]
    Overdrawn {
        /// The lot.
        lot_id: String,
        /// Quantity remaining before the disposal.
        remaining: Decimal,
        /// Quantity the disposal draws.
        used: Decimal,
    },

    /// A disposal references a lot that is not in the collection.
    #[error("disposal references unknown lot {lot_id}")]
    UnknownLot {
        /// The missing lot.
        lot_id: String,
    },
}

fn describe_missing(ids: &[String]) -> String {
    if ids.is_empty() {
        String::new()
    } else {
        format!(" (not found: {})", ids.join(", "))
    }
}

impl From<UnknownMethodError> for BookingError {
    fn from(err: UnknownMethodError) -> Self {
        Self::UnknownMethod { method: err.0 }
    }
}
