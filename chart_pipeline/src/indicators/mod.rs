//! Indicator engine: derives every overlay series a chart can show from a raw
//! [`BarSeries`].
//!
//! All derived series share the bar index. Values that need more history than
//! is available are `None`, never zero, and no window looks ahead of the bar it
//! is computed for.
//!
//! ```
//! use chart_pipeline::indicators::{enrich, SeriesKey};
//! use chart_pipeline::models::{bar::Bar, bar_series::BarSeries, cadence::Cadence};
//! use chrono::{Duration, TimeZone, Utc};
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let bars = (0..60)
//!     .map(|i| Bar {
//!         timestamp: start + Duration::days(i),
//!         open: 10.0, high: 11.0, low: 9.0, close: 10.0, volume: 1_000.0,
//!     })
//!     .collect();
//! let enriched = enrich(BarSeries::new("DEMO", Cadence::Daily, bars)).unwrap();
//! assert_eq!(enriched.get(SeriesKey::Sma50)[48], None);
//! assert_eq!(enriched.get(SeriesKey::Sma50)[49], Some(10.0));
//! ```

pub mod ema;
pub mod sma;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    errors::Error,
    models::{bar::Bar, bar_series::BarSeries},
};

pub use ema::ema;
pub use sma::sma;

/// A bar-aligned numeric series; `None` marks an undefined value.
pub type Series = Vec<Option<f64>>;

/// Window used by the relative-volume baseline.
pub const RELATIVE_VOLUME_BASELINE: usize = 50;

/// Closed set of derived series the engine produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKey {
    Sma10,
    Sma20,
    Sma30,
    Sma50,
    Ema9,
    Ema21,
    Ema65,
    /// 20-span EWMA of `high / low - 1`.
    Adr20,
    VolumeSma10,
    VolumeSma50,
    /// Volume divided by its 50-period average.
    RelativeVolume,
}

impl SeriesKey {
    pub const ALL: [SeriesKey; 11] = [
        SeriesKey::Sma10,
        SeriesKey::Sma20,
        SeriesKey::Sma30,
        SeriesKey::Sma50,
        SeriesKey::Ema9,
        SeriesKey::Ema21,
        SeriesKey::Ema65,
        SeriesKey::Adr20,
        SeriesKey::VolumeSma10,
        SeriesKey::VolumeSma50,
        SeriesKey::RelativeVolume,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SeriesKey::Sma10 => "sma10",
            SeriesKey::Sma20 => "sma20",
            SeriesKey::Sma30 => "sma30",
            SeriesKey::Sma50 => "sma50",
            SeriesKey::Ema9 => "ema9",
            SeriesKey::Ema21 => "ema21",
            SeriesKey::Ema65 => "ema65",
            SeriesKey::Adr20 => "adr20",
            SeriesKey::VolumeSma10 => "volume_sma10",
            SeriesKey::VolumeSma50 => "volume_sma50",
            SeriesKey::RelativeVolume => "relative_volume",
        }
    }
}

/// Every derived series, one field per [`SeriesKey`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicators {
    pub sma10: Series,
    pub sma20: Series,
    pub sma30: Series,
    pub sma50: Series,
    pub ema9: Series,
    pub ema21: Series,
    pub ema65: Series,
    pub adr20: Series,
    pub volume_sma10: Series,
    pub volume_sma50: Series,
    pub relative_volume: Series,
}

impl Indicators {
    /// Computes all indicators for `bars`.
    pub fn compute(bars: &[Bar]) -> Self {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
        let ranges: Vec<f64> = bars
            .iter()
            .map(|b| b.range_ratio().unwrap_or(f64::NAN))
            .collect();

        let volume_sma50 = sma(&volumes, RELATIVE_VOLUME_BASELINE);
        let relative_volume = volumes
            .iter()
            .zip(&volume_sma50)
            .map(|(&volume, baseline)| match baseline {
                Some(avg) if *avg > 0.0 => Some(volume / avg),
                _ => None,
            })
            .collect();

        Self {
            sma10: sma(&closes, 10),
            sma20: sma(&closes, 20),
            sma30: sma(&closes, 30),
            sma50: sma(&closes, 50),
            ema9: ema(&closes, 9),
            ema21: ema(&closes, 21),
            ema65: ema(&closes, 65),
            adr20: ema(&ranges, 20),
            volume_sma10: sma(&volumes, 10),
            volume_sma50,
            relative_volume,
        }
    }

    pub fn get(&self, key: SeriesKey) -> &Series {
        match key {
            SeriesKey::Sma10 => &self.sma10,
            SeriesKey::Sma20 => &self.sma20,
            SeriesKey::Sma30 => &self.sma30,
            SeriesKey::Sma50 => &self.sma50,
            SeriesKey::Ema9 => &self.ema9,
            SeriesKey::Ema21 => &self.ema21,
            SeriesKey::Ema65 => &self.ema65,
            SeriesKey::Adr20 => &self.adr20,
            SeriesKey::VolumeSma10 => &self.volume_sma10,
            SeriesKey::VolumeSma50 => &self.volume_sma50,
            SeriesKey::RelativeVolume => &self.relative_volume,
        }
    }

    fn slice_from(&self, start: usize) -> Self {
        let tail = |s: &Series| s[start.min(s.len())..].to_vec();
        Self {
            sma10: tail(&self.sma10),
            sma20: tail(&self.sma20),
            sma30: tail(&self.sma30),
            sma50: tail(&self.sma50),
            ema9: tail(&self.ema9),
            ema21: tail(&self.ema21),
            ema65: tail(&self.ema65),
            adr20: tail(&self.adr20),
            volume_sma10: tail(&self.volume_sma10),
            volume_sma50: tail(&self.volume_sma50),
            relative_volume: tail(&self.relative_volume),
        }
    }
}

/// A bar series extended with its derived indicator columns.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedSeries {
    pub series: BarSeries,
    pub indicators: Indicators,
}

impl EnrichedSeries {
    pub fn bars(&self) -> &[Bar] {
        &self.series.bars
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn get(&self, key: SeriesKey) -> &Series {
        self.indicators.get(key)
    }

    /// Keeps only bars at or after `start`.
    ///
    /// Indicator values are sliced, not recomputed, so windows warmed up on the
    /// dropped history stay defined.
    pub fn since(&self, start: DateTime<Utc>) -> Self {
        let first = self.series.first_index_since(start);
        Self {
            series: BarSeries {
                symbol: self.series.symbol.clone(),
                cadence: self.series.cadence,
                bars: self.series.bars[first..].to_vec(),
            },
            indicators: self.indicators.slice_from(first),
        }
    }
}

/// Computes every indicator for `series` and returns the extended record.
///
/// # Errors
///
/// [`Error::DataUnavailable`] when the series has no bars.
pub fn enrich(series: BarSeries) -> Result<EnrichedSeries, Error> {
    if series.is_empty() {
        return Err(Error::DataUnavailable(series.symbol));
    }
    let indicators = Indicators::compute(&series.bars);
    log::debug!(
        "computed {} indicator series over {} {} bars of {}",
        SeriesKey::ALL.len(),
        series.len(),
        series.cadence,
        series.symbol
    );
    Ok(EnrichedSeries { series, indicators })
}

/// Mean of `high / low - 1` over the last `n` bars, skipping bars without a
/// usable range. `None` when no bar qualifies.
pub fn average_range(bars: &[Bar], n: usize) -> Option<f64> {
    let tail = &bars[bars.len().saturating_sub(n)..];
    let ranges: Vec<f64> = tail.iter().filter_map(Bar::range_ratio).collect();
    if ranges.is_empty() {
        None
    } else {
        Some(ranges.iter().sum::<f64>() / ranges.len() as f64)
    }
}
