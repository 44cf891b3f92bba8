//! A collection of time-series bars for a specific symbol and cadence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{bar::Bar, cadence::Cadence};

/// Represents a complete set of time-series data for a single symbol.
///
/// This struct groups a vector of [`Bar`]s with their corresponding symbol
/// and [`Cadence`], making the data set self-describing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    /// The symbol this data represents (e.g., "AAPL", "PLTR").
    pub symbol: String,
    /// The aggregation of each bar in the series.
    pub cadence: Cadence,
    /// The collection of OHLCV bars, ascending by timestamp.
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(symbol: impl Into<String>, cadence: Cadence, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            cadence,
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Index of the first bar at or after `start`, or `len()` if there is none.
    pub fn first_index_since(&self, start: DateTime<Utc>) -> usize {
        self.bars.partition_point(|b| b.timestamp < start)
    }
}
