//! Canonical in-memory representation of a time-series bar (OHLCV).
//!
//! This struct is the standard output of every
//! [`MarketDataProvider`](crate::providers::MarketDataProvider) and the input of
//! the indicator engine, regardless of where the data came from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single time-series bar (OHLCV) for a given timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// The timestamp for this bar (UTC).
    pub timestamp: DateTime<Utc>,

    /// Opening price.
    pub open: f64,

    /// Highest price during the bar interval.
    pub high: f64,

    /// Lowest price during the bar interval.
    pub low: f64,

    /// Closing price.
    pub close: f64,

    /// Volume traded during the bar interval.
    pub volume: f64,
}

impl Bar {
    /// Intra-bar range ratio, `high / low - 1`.
    ///
    /// `None` when the low is not a positive finite number.
    pub fn range_ratio(&self) -> Option<f64> {
        if self.low > 0.0 && self.low.is_finite() && self.high.is_finite() {
            Some(self.high / self.low - 1.0)
        } else {
            None
        }
    }
}
