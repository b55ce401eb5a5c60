//! Lot booking engine for lotbook.
//!
//! This crate provides:
//! - Lot selection under FIFO, LIFO, HIFO, specific identification and
//!   average cost
//! - Cost basis calculation for a single disposal, or a side by side
//!   comparison of the ordered methods
//! - Applying a disposal to a lot collection
//! - Realized gains and tax-year totals
//!
//! # Booking a disposal
//!
//! A disposal is computed first and applied second. Computing never touches
//! the lots; applying returns a new collection.
//!
//! ```
//! use lotbook_booking::{calculate_cost_basis, update_lots_after_disposal};
//! use lotbook_core::{DisposalMethod, DisposalRequest, Lot, NaiveDate};
//! use rust_decimal_macros::dec;
//!
//! let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
//! let lots = vec![
//!     Lot::new("lot1", "BTC", date(2023, 1, 15), dec!(1.0), dec!(20000)),
//!     Lot::new("lot3", "BTC", date(2023, 6, 10), dec!(1.5), dec!(27000)),
//! ];
//!
//! let request = DisposalRequest::new("BTC", dec!(0.5), date(2024, 1, 1), DisposalMethod::Lifo);
//! let result = calculate_cost_basis(&request, &lots).unwrap();
//! assert_eq!(result.total_cost_basis, dec!(9000));
//!
//! let lots = update_lots_after_disposal(&lots, &result);
//! assert_eq!(lots[1].remaining_quantity, dec!(1.0));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod calculate;
mod error;
mod mutate;
mod realize;
pub mod select;

pub use calculate::{
    available_quantity, calculate_all_methods, calculate_all_methods_for, calculate_cost_basis,
    MethodComparison,
};
pub use error::BookingError;
pub use mutate::{try_update_lots_after_disposal, update_lots_after_disposal};
pub use realize::{
    realize_disposal, realize_disposal_with_rules, RealizedDisposal, RealizedLot, TaxYearSummary,
};
pub use select::{select_lots, Allocation, Candidate};
