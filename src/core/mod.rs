//! Core business logic abstractions

pub mod config;
pub mod currency;
pub mod error;
pub mod log;
pub mod pipeline;
pub mod range;
pub mod rate;

// Re-export main types for cleaner imports
pub use currency::CurrencyCode;
pub use error::FetchError;
pub use pipeline::{ChartPoint, ChartSeries, FetchOutcome, PointIndexing, RateQueryPipeline};
pub use range::DateRange;
pub use rate::{RateQuery, RateRow, RateSource};
