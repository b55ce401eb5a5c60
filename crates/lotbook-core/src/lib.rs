//! Core types for lotbook
//!
//! This crate provides the data model shared by the lotbook crates and the
//! calculators that need nothing beyond it:
//!
//! - [`Lot`] - A discrete acquisition of a fungible asset at a known cost
//! - [`DisposalMethod`] - How lots are drawn down when disposing
//! - [`DisposalRequest`] - A sale, exchange or consumption of an asset
//! - [`CostBasisResult`] - The lots consumed by a disposal and their cost
//! - [`calculate_holding_period`] - Short-term / long-term classification
//! - [`calculate_gain_loss`] - Proceeds minus cost basis
//! - [`calculate_weighted_average`] - Blended cost per unit across open lots
//!
//! # Example
//!
//! ```
//! use lotbook_core::{calculate_holding_period, calculate_weighted_average, Lot, NaiveDate};
//! use rust_decimal_macros::dec;
//!
//! let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
//! let lots = vec![
//!     Lot::new("lot1", "BTC", date(2023, 1, 15), dec!(1.0), dec!(20000)),
//!     Lot::new("lot2", "BTC", date(2023, 3, 20), dec!(1.0), dec!(30000)),
//! ];
//!
//! assert_eq!(calculate_weighted_average(&lots), dec!(25000));
//!
//! let held = calculate_holding_period(date(2023, 1, 1), date(2024, 1, 2));
//! assert_eq!(held.days, 366);
//! assert!(held.is_long_term);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod date;
pub mod disposal;
pub mod gain;
pub mod holding;
pub mod lot;

pub use date::{parse_date, DateParseError};
pub use disposal::{
    CostBasisResult, DisposalMethod, DisposalRequest, LotAllocation, UnknownMethodError,
};
pub use gain::{calculate_gain_loss, GainLoss};
pub use holding::{
    calculate_holding_period, calculate_holding_period_with_rules, HoldingPeriod,
    HoldingPeriodRules, DEFAULT_LONG_TERM_THRESHOLD_DAYS,
};
pub use lot::{calculate_weighted_average, Lot, Metadata};

// Re-export commonly used external types
pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;
