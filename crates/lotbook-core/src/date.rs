//! Calendar date parsing.
//!
//! Lot records arrive from the ledger layer with ISO 8601 dates as text.
//! Only the calendar date matters for lot accounting, so timestamps are
//! truncated to their date.

use chrono::{DateTime, NaiveDate};
use thiserror::Error;

/// A date string that is neither `YYYY-MM-DD` nor an RFC 3339 timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date: {input:?}")]
pub struct DateParseError {
    /// The rejected input.
    pub input: String,
}

/// Parse a calendar date.
///
/// Accepts `2023-01-15` and RFC 3339 timestamps such as
/// `2023-01-15T10:30:00Z`, which are truncated to the date in their own
/// offset.
///
/// ```
/// use lotbook_core::{parse_date, NaiveDate};
///
/// let expected = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap();
/// assert_eq!(parse_date("2023-01-15").unwrap(), expected);
/// assert_eq!(parse_date("2023-01-15T23:59:59+02:00").unwrap(), expected);
/// assert!(parse_date("2023-02-30").is_err());
/// ```
pub fn parse_date(input: &str) -> Result<NaiveDate, DateParseError> {
    let trimmed = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.date_naive())
        .map_err(|_| DateParseError {
            input: input.to_string(),
        })
}
