//! Epoch-second date ranges and parsing of user supplied bounds.

use crate::core::error::FetchError;
use chrono::{NaiveDate, NaiveTime};

/// A validated query range. Both bounds are positive and `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: i64,
    end: i64,
}

impl DateRange {
    pub fn new(start: i64, end: i64) -> Result<Self, FetchError> {
        if Self::is_valid(start, end) {
            Ok(Self { start, end })
        } else {
            Err(FetchError::InvalidRange { start, end })
        }
    }

    /// Builds a range from bounds the user may not have picked yet. A missing
    /// bound counts as zero and therefore fails validation.
    pub fn from_bounds(start: Option<i64>, end: Option<i64>) -> Result<Self, FetchError> {
        Self::new(start.unwrap_or(0), end.unwrap_or(0))
    }

    pub fn is_valid(start: i64, end: i64) -> bool {
        start > 0 && end > 0 && start <= end
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }
}

/// Parses a date bound into epoch seconds at midnight UTC.
///
/// Accepts `dd/mm/yyyy`, ISO `yyyy-mm-dd`, or a raw epoch-second integer.
pub fn parse_bound(input: &str) -> anyhow::Result<i64> {
    let input = input.trim();
    if let Ok(seconds) = input.parse::<i64>() {
        return Ok(seconds);
    }

    let date = NaiveDate::parse_from_str(input, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(input, "%Y-%m-%d"))
        .map_err(|_| {
            anyhow::anyhow!(
                "Invalid date '{}': expected dd/mm/yyyy, yyyy-mm-dd or epoch seconds",
                input
            )
        })?;

    Ok(date.and_time(NaiveTime::MIN).and_utc().timestamp())
}
