//! Average directional index (Wilder).

use gale_domain::Candle;

use crate::atr::{true_range, wilder_smooth};

/// ADX over a candle series. Needs roughly two periods of data before the
/// first value is defined (one for the DI smoothing, one for the DX
/// smoothing).
///
/// When DI+ and DI- are both zero the DX for that bar is undefined; the
/// output stays `NaN` at that index and the smoothing carries on from the
/// next defined bar, so one flat bar does not end the series.
pub fn adx(candles: &[Candle], period: usize) -> Vec<f64> {
    let n = candles.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < 2 * period {
        return out;
    }

    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];
    for i in 1..n {
        let up = candles[i].high - candles[i - 1].high;
        let down = candles[i - 1].low - candles[i].low;
        if up > down && up > 0.0 {
            plus_dm[i] = up;
        }
        if down > up && down > 0.0 {
            minus_dm[i] = down;
        }
    }

    let smooth_tr = wilder_smooth(&true_range(candles), period);
    let smooth_plus = wilder_smooth(&plus_dm, period);
    let smooth_minus = wilder_smooth(&minus_dm, period);

    let mut dx = vec![f64::NAN; n];
    for i in 0..n {
        let tr = smooth_tr[i];
        let sp = smooth_plus[i];
        let sm = smooth_minus[i];
        if tr.is_nan() || sp.is_nan() || sm.is_nan() || tr == 0.0 {
            continue;
        }
        let di_plus = 100.0 * sp / tr;
        let di_minus = 100.0 * sm / tr;
        let di_sum = di_plus + di_minus;
        if di_sum == 0.0 {
            continue;
        }
        dx[i] = 100.0 * (di_plus - di_minus).abs() / di_sum;
    }

    // Wilder-smooth DX, seeding from the first run of `period` consecutive
    // defined values and skipping undefined bars afterwards.
    let mut sum = 0.0;
    let mut count = 0;
    let mut seed_idx = None;
    for (i, &v) in dx.iter().enumerate() {
        if v.is_nan() {
            sum = 0.0;
            count = 0;
            continue;
        }
        sum += v;
        count += 1;
        if count == period {
            seed_idx = Some(i);
            break;
        }
    }
    let Some(seed_idx) = seed_idx else {
        return out;
    };

    let p = period as f64;
    let mut prev = sum / p;
    out[seed_idx] = prev;
    for i in seed_idx + 1..n {
        if dx[i].is_nan() {
            continue;
        }
        prev = (prev * (p - 1.0) + dx[i]) / p;
        out[i] = prev;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::candles_from_closes;

    #[test]
    fn test_needs_two_periods() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let candles = candles_from_closes(&closes);
        let result = adx(&candles, 14);
        assert!(result[25].is_nan());
        assert!(!result[26].is_nan());
    }

    #[test]
    fn test_strong_trend_reads_high() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 2.0).collect();
        let candles = candles_from_closes(&closes);
        let result = adx(&candles, 14);
        let last = result[59];
        assert!(last > 50.0, "strong trend should read high, got {last}");
    }

    #[test]
    fn test_flat_market_stays_undefined() {
        // No directional movement at all: DI+ and DI- are both zero, so DX
        // is never defined and ADX never seeds.
        let candles = candles_from_closes(&[100.0; 60]);
        let result = adx(&candles, 14);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_choppy_reads_lower_than_trend() {
        let trend: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let chop: Vec<f64> = (0..60)
            .map(|i| 100.0 + if i % 4 < 2 { 1.0 } else { -1.0 })
            .collect();
        let adx_trend = adx(&candles_from_closes(&trend), 14);
        let adx_chop = adx(&candles_from_closes(&chop), 14);
        assert!(adx_chop[59] < adx_trend[59]);
    }

    #[test]
    fn test_short_series_all_nan() {
        let candles = candles_from_closes(&[100.0, 101.0, 102.0]);
        let result = adx(&candles, 14);
        assert!(result.iter().all(|v| v.is_nan()));
    }
}
