//! True range and Wilder-smoothed ATR.

use gale_domain::Candle;

/// True range per bar. The first bar has no previous close, so its range
/// is simply high - low.
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if i == 0 {
                c.high - c.low
            } else {
                let prev_close = candles[i - 1].close;
                (c.high - c.low)
                    .max((c.high - prev_close).abs())
                    .max((c.low - prev_close).abs())
            }
        })
        .collect()
}

/// Wilder smoothing: seed with the simple mean of the first full window of
/// defined values, then smoothed[i] = (smoothed[i-1] * (n-1) + value[i]) / n.
///
/// Output is `NaN` before the seed index. A `NaN` input after the seed ends
/// the series there.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < period {
        return out;
    }

    let mut start = 0;
    while start + period <= n {
        if values[start..start + period].iter().all(|v| !v.is_nan()) {
            break;
        }
        start += 1;
    }
    if start + period > n {
        return out;
    }

    let seed_idx = start + period - 1;
    let mut prev = values[start..=seed_idx].iter().sum::<f64>() / period as f64;
    out[seed_idx] = prev;

    for i in seed_idx + 1..n {
        let v = values[i];
        if v.is_nan() {
            return out;
        }
        prev = (prev * (period as f64 - 1.0) + v) / period as f64;
        out[i] = prev;
    }
    out
}

/// Average true range: Wilder-smoothed true range.
pub fn atr(candles: &[Candle], period: usize) -> Vec<f64> {
    wilder_smooth(&true_range(candles), period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{assert_approx, candles_from_closes, EPS};

    #[test]
    fn test_true_range_first_bar() {
        let candles = candles_from_closes(&[10.0, 11.0]);
        let tr = true_range(&candles);
        // high - low = 1.0 for the synthetic spread
        assert_approx(tr[0], 1.0, EPS);
    }

    #[test]
    fn test_true_range_uses_previous_close_on_gap() {
        // Second bar gaps well above the first close: TR is high - prev_close
        let mut candles = candles_from_closes(&[10.0, 15.0]);
        candles[1].low = 14.5;
        candles[1].high = 15.5;
        let tr = true_range(&candles);
        assert_approx(tr[1], 5.5, EPS);
    }

    #[test]
    fn test_wilder_smooth_seed_is_mean() {
        let values = vec![2.0, 4.0, 6.0, 8.0];
        let smoothed = wilder_smooth(&values, 3);
        assert!(smoothed[0].is_nan());
        assert!(smoothed[1].is_nan());
        assert_approx(smoothed[2], 4.0, EPS);
        // (4 * 2 + 8) / 3
        assert_approx(smoothed[3], 16.0 / 3.0, EPS);
    }

    #[test]
    fn test_wilder_smooth_skips_leading_nan() {
        let values = vec![f64::NAN, 2.0, 4.0, 6.0, 8.0];
        let smoothed = wilder_smooth(&values, 3);
        assert!(smoothed[2].is_nan());
        assert_approx(smoothed[3], 4.0, EPS);
    }

    #[test]
    fn test_atr_constant_range() {
        // Fixed 1.0 bar range and no gaps: ATR settles at 1.0
        let candles = candles_from_closes(&[10.0; 30]);
        let result = atr(&candles, 14);
        assert_approx(result[29], 1.0, EPS);
    }

    #[test]
    fn test_atr_warmup() {
        let candles = candles_from_closes(&[10.0; 20]);
        let result = atr(&candles, 14);
        assert!(result[12].is_nan());
        assert!(!result[13].is_nan());
    }
}
