//! Fetch, map and classify exchange-rate rows for charting.

use crate::core::currency::CurrencyCode;
use crate::core::error::FetchError;
use crate::core::range::DateRange;
use crate::core::rate::{RateQuery, RateRow, RateSource};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
}

/// How a row is placed on the x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointIndexing {
    /// x is the row's `date`. Falls back to ordinal when the source has no date column.
    #[default]
    Timestamp,
    /// x is the row's position in the result set.
    Ordinal,
}

impl Display for PointIndexing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PointIndexing::Timestamp => "timestamp",
                PointIndexing::Ordinal => "ordinal",
            }
        )
    }
}

impl FromStr for PointIndexing {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "timestamp" | "date" => Ok(PointIndexing::Timestamp),
            "ordinal" | "index" => Ok(PointIndexing::Ordinal),
            _ => Err(anyhow::anyhow!("Invalid indexing: {}", s)),
        }
    }
}

impl PointIndexing {
    /// Maps rows to points in the order given. Any unusable row fails the whole set.
    ///
    /// Returns the indexing that was actually applied along with the points.
    pub fn map_rows(
        &self,
        rows: &[RateRow],
    ) -> Result<(PointIndexing, Vec<ChartPoint>), FetchError> {
        if let Some(pos) = rows.iter().position(|r| !r.rate.is_finite()) {
            return Err(FetchError::QueryFailure(format!(
                "Row {} has a non-numeric rate: {}",
                pos, rows[pos].rate
            )));
        }

        let dated = rows.iter().filter(|r| r.date.is_some()).count();
        let use_dates = match self {
            PointIndexing::Ordinal => false,
            PointIndexing::Timestamp if dated == rows.len() => true,
            PointIndexing::Timestamp if dated == 0 => {
                debug!("Source returned no date column, using ordinal positions");
                false
            }
            PointIndexing::Timestamp => {
                return Err(FetchError::QueryFailure(format!(
                    "Only {} of {} rows have a date",
                    dated,
                    rows.len()
                )));
            }
        };

        let points = rows
            .iter()
            .enumerate()
            .map(|(i, row)| ChartPoint {
                x: match (use_dates, row.date) {
                    (true, Some(ts)) => ts as f64,
                    _ => i as f64,
                },
                y: row.rate,
            })
            .collect();

        let applied = if use_dates {
            PointIndexing::Timestamp
        } else {
            PointIndexing::Ordinal
        };
        Ok((applied, points))
    }
}

/// A labelled line series ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub indexing: PointIndexing,
    pub points: Vec<ChartPoint>,
}

/// Result of one fetch. Callers render each case differently.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Populated(ChartSeries),
    Empty,
    Failed(FetchError),
}

pub struct RateQueryPipeline<'a> {
    source: &'a dyn RateSource,
    indexing: PointIndexing,
    base_currency: String,
}

impl<'a> RateQueryPipeline<'a> {
    pub fn new(source: &'a dyn RateSource, indexing: PointIndexing, base_currency: &str) -> Self {
        Self {
            source,
            indexing,
            base_currency: base_currency.to_string(),
        }
    }

    pub fn indexing(&self) -> PointIndexing {
        self.indexing
    }

    /// Series label for a currency, e.g. `USD/MXN`.
    pub fn label(&self, currency: &CurrencyCode) -> String {
        format!("{}/{}", currency, self.base_currency)
    }

    /// Issues exactly one query and classifies its result.
    pub async fn fetch(&self, currency: &CurrencyCode, range: &DateRange) -> FetchOutcome {
        let query = RateQuery::new(currency.clone(), *range);
        let rows = match self.source.query(&query).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(currency = %currency, "Rate query failed: {e:#}");
                return FetchOutcome::Failed(FetchError::QueryFailure(format!("{e:#}")));
            }
        };
        debug!(currency = %currency, rows = rows.len(), "Rate query returned");

        if rows.is_empty() {
            return FetchOutcome::Empty;
        }

        match self.indexing.map_rows(&rows) {
            Ok((indexing, points)) => FetchOutcome::Populated(ChartSeries {
                label: self.label(currency),
                indexing,
                points,
            }),
            Err(e) => FetchOutcome::Failed(e),
        }
    }
}
