//! Volume-spike annotations: bars whose relative volume is both above a
//! threshold and the highest in a window around them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::indicators::{EnrichedSeries, SeriesKey, Series};

/// A bar flagged as a volume spike, with its ready-to-draw label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeAnomaly {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub relative_volume: f64,
    pub volume: f64,
    /// `"<rvol%>%\n<volume in millions>M"`.
    pub label: String,
    /// Vertical anchor on the volume panel; the label sits above it.
    pub anchor_y: f64,
}

/// Spike selection rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeSpikes {
    /// Look-back and look-ahead radius of the local-maximum test.
    pub window: usize,
    /// Relative volume must be strictly greater than this.
    pub threshold: f64,
}

impl Default for VolumeSpikes {
    fn default() -> Self {
        Self {
            window: 10,
            threshold: 1.5,
        }
    }
}

/// Label offset above the bar's volume.
const LABEL_LIFT: f64 = 1.1;

impl VolumeSpikes {
    pub fn select(&self, enriched: &EnrichedSeries) -> Vec<VolumeAnomaly> {
        let rvol = enriched.get(SeriesKey::RelativeVolume);
        let bars = enriched.bars();
        let anomalies: Vec<VolumeAnomaly> = select_indices(rvol, self.window, self.threshold)
            .into_iter()
            .filter_map(|i| {
                let ratio = rvol[i]?;
                let bar = &bars[i];
                Some(VolumeAnomaly {
                    index: i,
                    timestamp: bar.timestamp,
                    relative_volume: ratio,
                    volume: bar.volume,
                    label: spike_label(ratio, bar.volume),
                    anchor_y: bar.volume * LABEL_LIFT,
                })
            })
            .collect();
        log::debug!(
            "{} volume spikes over {} bars of {}",
            anomalies.len(),
            bars.len(),
            enriched.series.symbol
        );
        anomalies
    }
}

/// Indices `i >= window` where `rvol[i] > threshold` and `rvol[i]` is at least
/// every defined value in `[i - window, i + window)`.
pub fn select_indices(rvol: &Series, window: usize, threshold: f64) -> Vec<usize> {
    let n = rvol.len();
    (window..n)
        .filter(|&i| {
            let Some(current) = rvol[i] else {
                return false;
            };
            current > threshold
                && rvol[i - window..(i + window).min(n)]
                    .iter()
                    .flatten()
                    .all(|&other| other <= current)
        })
        .collect()
}

/// Formats a spike label: whole percent on the first line, volume in
/// millions with one decimal on the second.
pub fn spike_label(relative_volume: f64, volume: f64) -> String {
    format!(
        "{}%\n{:.1}M",
        (relative_volume * 100.0).trunc() as i64,
        volume / 1e6
    )
}
