use std::{fmt, str::FromStr};

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CadenceError {
    #[error("Invalid cadence: {input:?} (expected daily or weekly)")]
    InvalidInput { input: String },
}

/// Bar aggregation of a chart: one bar per trading day, or one per week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    #[default]
    Daily,
    Weekly,
}

impl Cadence {
    pub fn from_weekly_flag(weekly: bool) -> Self {
        if weekly { Self::Weekly } else { Self::Daily }
    }

    pub fn is_weekly(self) -> bool {
        matches!(self, Self::Weekly)
    }

    /// Short label used in chart watermarks.
    pub fn label(self) -> &'static str {
        match self {
            Self::Daily => "1D",
            Self::Weekly => "1W",
        }
    }

    /// Default lookback window, in months, shown for this cadence.
    pub fn default_lookback_months(self) -> u32 {
        match self {
            Self::Daily => 9,
            Self::Weekly => 40,
        }
    }
}

/// First instant kept by a lookback of `months` calendar months ending at `as_of`.
///
/// Falls back to the Unix epoch when the subtraction underflows the calendar.
pub fn lookback_start(as_of: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    as_of
        .checked_sub_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Cadence {
    type Err = CadenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "d" | "day" | "daily" | "1d" => Ok(Self::Daily),
            "w" | "wk" | "week" | "weekly" | "1w" => Ok(Self::Weekly),
            _ => Err(CadenceError::InvalidInput {
                input: s.to_string(),
            }),
        }
    }
}
