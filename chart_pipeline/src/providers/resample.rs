//! Daily-to-weekly aggregation.
//!
//! Weeks are Monday 00:00:00Z aligned: the week index of a timestamp is its
//! Unix second shifted so that Monday 1969-12-29 falls on index 0.

use chrono::{DateTime, Utc};

use crate::models::bar::Bar;

const SECS_PER_DAY: i64 = 24 * 60 * 60;
const SECS_PER_WEEK: i64 = 7 * SECS_PER_DAY;
/// 1970-01-01 was a Thursday; +3 days lands the anchor on the prior Monday.
const WEEK_MONDAY_ANCHOR_OFFSET_SECS: i64 = 3 * SECS_PER_DAY;

fn week_id(ts: DateTime<Utc>) -> i64 {
    (ts.timestamp() + WEEK_MONDAY_ANCHOR_OFFSET_SECS).div_euclid(SECS_PER_WEEK)
}

/// Start (Monday 00:00Z) of the week containing `ts`.
pub fn week_start(ts: DateTime<Utc>) -> DateTime<Utc> {
    let secs = week_id(ts) * SECS_PER_WEEK - WEEK_MONDAY_ANCHOR_OFFSET_SECS;
    DateTime::from_timestamp(secs, 0).unwrap_or(ts)
}

/// Aggregates ascending bars into one bar per week: first open, highest high,
/// lowest low, last close, summed volume, stamped with the week start.
pub fn resample_weekly(bars: &[Bar]) -> Vec<Bar> {
    bars.chunk_by(|a, b| week_id(a.timestamp) == week_id(b.timestamp))
        .filter_map(|week| {
            let (first, last) = (week.first()?, week.last()?);
            Some(Bar {
                timestamp: week_start(first.timestamp),
                open: first.open,
                high: week.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max),
                low: week.iter().map(|b| b.low).fold(f64::INFINITY, f64::min),
                close: last.close,
                volume: week.iter().map(|b| b.volume).sum(),
            })
        })
        .collect()
}
