//! Supertrend bands and trend direction.

use gale_domain::Candle;

use crate::atr::atr;

/// Which side of the bands the trend is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Up,
    Down,
}

/// Per-bar supertrend output. `direction` is `None` until the underlying
/// ATR is defined.
#[derive(Debug, Clone)]
pub struct SupertrendSeries {
    pub direction: Vec<Option<TrendDirection>>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

/// Supertrend over a candle series.
///
/// Basic bands are HL2 +/- multiplier * ATR. The direction flips Up when
/// close crosses above the previous bar's upper band, Down when it crosses
/// below the previous lower band, and persists otherwise. While the
/// direction persists the relevant band ratchets: in an uptrend the lower
/// band never moves down, in a downtrend the upper band never moves up.
pub fn supertrend(candles: &[Candle], period: usize, multiplier: f64) -> SupertrendSeries {
    let n = candles.len();
    let mut direction = vec![None; n];
    let mut upper = vec![f64::NAN; n];
    let mut lower = vec![f64::NAN; n];

    let atr = atr(candles, period);
    let start = atr.iter().position(|v| !v.is_nan());
    let Some(start) = start else {
        return SupertrendSeries {
            direction,
            upper,
            lower,
        };
    };

    upper[start] = candles[start].hl2() + multiplier * atr[start];
    lower[start] = candles[start].hl2() - multiplier * atr[start];
    let mut dir = TrendDirection::Up;
    direction[start] = Some(dir);

    for i in start + 1..n {
        let mid = candles[i].hl2();
        let mut band_upper = mid + multiplier * atr[i];
        let mut band_lower = mid - multiplier * atr[i];
        let close = candles[i].close;

        if close > upper[i - 1] {
            dir = TrendDirection::Up;
        } else if close < lower[i - 1] {
            dir = TrendDirection::Down;
        } else {
            // bands only ratchet while the trend persists
            if dir == TrendDirection::Up && band_lower < lower[i - 1] {
                band_lower = lower[i - 1];
            }
            if dir == TrendDirection::Down && band_upper > upper[i - 1] {
                band_upper = upper[i - 1];
            }
        }

        upper[i] = band_upper;
        lower[i] = band_lower;
        direction[i] = Some(dir);
    }

    SupertrendSeries {
        direction,
        upper,
        lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::candles_from_closes;

    #[test]
    fn test_warmup_direction_is_none() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let candles = candles_from_closes(&closes);
        let st = supertrend(&candles, 10, 3.0);
        assert!(st.direction[8].is_none());
        assert!(st.direction[9].is_some());
    }

    #[test]
    fn test_sustained_rally_reads_up() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 2.0).collect();
        let candles = candles_from_closes(&closes);
        let st = supertrend(&candles, 10, 3.0);
        assert_eq!(st.direction[59], Some(TrendDirection::Up));
    }

    #[test]
    fn test_sustained_selloff_flips_down() {
        let mut closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        closes.extend((0..30).map(|i| 129.0 - i as f64 * 3.0));
        let candles = candles_from_closes(&closes);
        let st = supertrend(&candles, 10, 3.0);
        assert_eq!(st.direction[59], Some(TrendDirection::Down));
    }

    #[test]
    fn test_lower_band_ratchets_in_uptrend() {
        // Steady climb with closes inside the bands: once the trend is Up
        // and persisting, the lower band must never move down.
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 0.1).collect();
        let candles = candles_from_closes(&closes);
        let st = supertrend(&candles, 10, 3.0);
        for i in 11..60 {
            if st.direction[i] == Some(TrendDirection::Up)
                && st.direction[i - 1] == Some(TrendDirection::Up)
                && closes[i] <= st.upper[i - 1]
            {
                assert!(
                    st.lower[i] >= st.lower[i - 1],
                    "lower band fell at {i}: {} -> {}",
                    st.lower[i - 1],
                    st.lower[i]
                );
            }
        }
    }

    #[test]
    fn test_direction_persists_between_bands() {
        // A close sitting between the previous bands keeps the prior trend
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.01)).collect();
        let candles = candles_from_closes(&closes);
        let st = supertrend(&candles, 10, 3.0);
        for i in 10..40 {
            assert_eq!(st.direction[i], Some(TrendDirection::Up));
        }
    }
}
