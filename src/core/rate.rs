//! Rate source abstractions and row types

use crate::core::currency::CurrencyCode;
use crate::core::range::DateRange;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Ordering requested from the source. Rows come back oldest first.
pub const DATE_ASCENDING: &str = "date ASC";

/// A single record returned by a rate source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRow {
    pub rate: f64,
    #[serde(default)]
    pub date: Option<i64>,
}

/// Parameters of one query against a rate source.
#[derive(Debug, Clone, PartialEq)]
pub struct RateQuery {
    pub currency: CurrencyCode,
    pub range: DateRange,
}

impl RateQuery {
    pub fn new(currency: CurrencyCode, range: DateRange) -> Self {
        Self { currency, range }
    }

    pub fn sort_order(&self) -> &'static str {
        DATE_ASCENDING
    }
}

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Runs the query once and returns rows in the order the source produced them.
    async fn query(&self, query: &RateQuery) -> Result<Vec<RateRow>>;
}
