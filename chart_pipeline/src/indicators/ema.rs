//! Exponential moving average with pandas `ewm(span, adjust=False)` semantics.

use super::Series;

/// Recursive EWMA: `alpha = 2 / (span + 1)`, seeded with the first finite value,
/// no bias adjustment.
///
/// Defined from the first finite input onward. A non-finite input carries the
/// previous average forward.
pub fn ema(values: &[f64], span: usize) -> Series {
    let mut result = vec![None; values.len()];
    if span == 0 {
        return result;
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev: Option<f64> = None;
    for (i, &value) in values.iter().enumerate() {
        if value.is_finite() {
            prev = Some(match prev {
                None => value,
                Some(p) => alpha * value + (1.0 - alpha) * p,
            });
        }
        result[i] = prev;
    }
    result
}
