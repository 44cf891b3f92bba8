//! Zig-zag pivot detection.
//!
//! A pivot is a running extreme that price later moved away from by at least
//! the reversal threshold. Peaks are tracked on bar highs and valleys on bar
//! lows in a single pass, so consecutive pivots always alternate direction.
//! The extreme still being tracked when the data ends is reported as the last
//! pivot.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::bar::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Peak,
    Valley,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Peak => Direction::Valley,
            Direction::Valley => Direction::Peak,
        }
    }
}

/// A pivot located by bar index only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extreme {
    pub index: usize,
    pub price: f64,
    pub direction: Direction,
}

impl Extreme {
    fn at(index: usize, price: f64, direction: Direction) -> Self {
        Self {
            index,
            price,
            direction,
        }
    }
}

/// A confirmed pivot on a bar series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PivotPoint {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub direction: Direction,
}

/// Zig-zag detector with a relative reversal threshold (0.10 = 10%).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZigZag {
    threshold: f64,
}

impl Default for ZigZag {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}

impl ZigZag {
    pub const DEFAULT_THRESHOLD: f64 = 0.10;

    /// A threshold that is not a positive finite number (or is 1.0 or more)
    /// makes every detection return no pivots.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Pivots of a bar series: peaks on highs, valleys on lows.
    pub fn detect(&self, bars: &[Bar]) -> Vec<PivotPoint> {
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
        self.extremes(&highs, &lows)
            .into_iter()
            .map(|e| PivotPoint {
                index: e.index,
                timestamp: bars[e.index].timestamp,
                price: e.price,
                direction: e.direction,
            })
            .collect()
    }

    /// Pivots of a single price series.
    pub fn detect_series(&self, prices: &[f64]) -> Vec<Extreme> {
        self.extremes(prices, prices)
    }

    /// Core pass over index-aligned `highs` and `lows`.
    ///
    /// Bars whose high or low is not a positive finite number are skipped.
    pub fn extremes(&self, highs: &[f64], lows: &[f64]) -> Vec<Extreme> {
        let n = highs.len().min(lows.len());
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Vec::new();
        }
        let up = 1.0 + self.threshold;
        let down = 1.0 - self.threshold;
        let usable = |t: usize| is_price(highs[t]) && is_price(lows[t]);

        let Some((first, confirmed_at)) = self.first_pivot(highs, lows, n) else {
            return Vec::new();
        };

        let mut pivots = vec![first];
        let mut tracking = first.direction.opposite();

        // best opposite extreme between the first pivot and its confirmation
        let mut candidate = Extreme {
            index: confirmed_at,
            price: price_for(tracking, highs[confirmed_at], lows[confirmed_at]),
            direction: tracking,
        };
        for t in (first.index + 1)..=confirmed_at {
            if usable(t) {
                let price = price_for(tracking, highs[t], lows[t]);
                if beyond(tracking, price, candidate.price) {
                    candidate = Extreme::at(t, price, tracking);
                }
            }
        }

        for t in (confirmed_at + 1)..n {
            if !usable(t) {
                continue;
            }
            let (high, low) = (highs[t], lows[t]);
            match tracking {
                Direction::Peak => {
                    if low <= candidate.price * down {
                        pivots.push(candidate);
                        tracking = Direction::Valley;
                        candidate = Extreme::at(t, low, tracking);
                    } else if high > candidate.price {
                        candidate = Extreme::at(t, high, tracking);
                    }
                }
                Direction::Valley => {
                    if high >= candidate.price * up {
                        pivots.push(candidate);
                        tracking = Direction::Peak;
                        candidate = Extreme::at(t, high, tracking);
                    } else if low < candidate.price {
                        candidate = Extreme::at(t, low, tracking);
                    }
                }
            }
        }

        pivots.push(candidate);
        pivots
    }

    /// Finds the first pivot: the running extreme that price first moved away
    /// from by the threshold. Returns it together with the confirming bar.
    fn first_pivot(&self, highs: &[f64], lows: &[f64], n: usize) -> Option<(Extreme, usize)> {
        let up = 1.0 + self.threshold;
        let down = 1.0 - self.threshold;
        let mut max: Option<(usize, f64)> = None;
        let mut min: Option<(usize, f64)> = None;

        for t in 0..n {
            let (high, low) = (highs[t], lows[t]);
            if !is_price(high) || !is_price(low) {
                continue;
            }
            if let (Some((max_t, max_x)), Some((min_t, min_x))) = (max, min) {
                let valley = Extreme::at(min_t, min_x, Direction::Valley);
                let peak = Extreme::at(max_t, max_x, Direction::Peak);
                match (high >= min_x * up, low <= max_x * down) {
                    (true, false) => return Some((valley, t)),
                    (false, true) => return Some((peak, t)),
                    (true, true) if min_t <= max_t => return Some((valley, t)),
                    (true, true) => return Some((peak, t)),
                    (false, false) => {}
                }
            }
            if max.is_none_or(|(_, x)| high > x) {
                max = Some((t, high));
            }
            if min.is_none_or(|(_, x)| low < x) {
                min = Some((t, low));
            }
        }
        None
    }
}

fn is_price(x: f64) -> bool {
    x.is_finite() && x > 0.0
}

fn price_for(direction: Direction, high: f64, low: f64) -> f64 {
    match direction {
        Direction::Peak => high,
        Direction::Valley => low,
    }
}

fn beyond(direction: Direction, price: f64, current: f64) -> bool {
    match direction {
        Direction::Peak => price > current,
        Direction::Valley => price < current,
    }
}
