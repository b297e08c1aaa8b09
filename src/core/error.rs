//! Recoverable failures of a fetch-render cycle.

use thiserror::Error;

/// Errors reported to the user as a notice. Neither ends the process.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// Start or end is missing, non-positive, or the bounds are inverted.
    #[error("Invalid date range: start={start}, end={end}")]
    InvalidRange { start: i64, end: i64 },

    /// The source was unreachable or returned something unusable.
    #[error("Query failed: {0}")]
    QueryFailure(String),
}
