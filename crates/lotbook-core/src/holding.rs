//! Holding period classification.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Days a lot must be held, exclusive, before a disposal is long-term.
pub const DEFAULT_LONG_TERM_THRESHOLD_DAYS: i64 = 365;

/// How long a lot was held before disposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingPeriod {
    /// Calendar days from acquisition to disposal
    pub days: i64,
    /// Whether the holding exceeds the long-term threshold
    pub is_long_term: bool,
}

/// Rules for classifying holding periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingPeriodRules {
    /// A holding is long-term when it lasts strictly more than this many days.
    pub long_term_threshold_days: i64,
}

impl Default for HoldingPeriodRules {
    fn default() -> Self {
        Self {
            long_term_threshold_days: DEFAULT_LONG_TERM_THRESHOLD_DAYS,
        }
    }
}

/// Calculate the holding period between acquisition and disposal.
///
/// A holding of exactly 365 days is short-term; 366 days or more is
/// long-term. A disposal dated before the acquisition yields a negative day
/// count and is short-term.
///
/// ```
/// use lotbook_core::{calculate_holding_period, NaiveDate};
///
/// let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
///
/// let year = calculate_holding_period(date(2023, 1, 1), date(2024, 1, 1));
/// assert_eq!(year.days, 365);
/// assert!(!year.is_long_term);
/// ```
#[must_use]
pub fn calculate_holding_period(acquired: NaiveDate, disposed: NaiveDate) -> HoldingPeriod {
    calculate_holding_period_with_rules(acquired, disposed, &HoldingPeriodRules::default())
}

/// Calculate the holding period with a custom long-term threshold.
#[must_use]
pub fn calculate_holding_period_with_rules(
    acquired: NaiveDate,
    disposed: NaiveDate,
    rules: &HoldingPeriodRules,
) -> HoldingPeriod {
    let days = disposed.signed_duration_since(acquired).num_days();
    HoldingPeriod {
        days,
        is_long_term: days > rules.long_term_threshold_days,
    }
}
