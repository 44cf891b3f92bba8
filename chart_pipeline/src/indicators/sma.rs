//! Simple moving average over a trailing window.

use super::Series;

/// Rolling arithmetic mean of the last `period` values.
///
/// Index `i` is `None` until `period` values are available, and whenever the
/// window contains a non-finite input.
pub fn sma(values: &[f64], period: usize) -> Series {
    let mut result = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return result;
    }

    let mut sum = 0.0;
    let mut invalid = 0usize;
    for (i, &value) in values.iter().enumerate() {
        if value.is_finite() {
            sum += value;
        } else {
            invalid += 1;
        }
        if i >= period {
            let leaving = values[i - period];
            if leaving.is_finite() {
                sum -= leaving;
            } else {
                invalid -= 1;
            }
        }
        if i + 1 >= period && invalid == 0 {
            result[i] = Some(sum / period as f64);
        }
    }
    result
}
