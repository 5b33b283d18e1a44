//! Relative strength index (Wilder).

/// RSI over a close series. Defined from index `period` onward.
///
/// Average gain/loss are seeded with the simple mean of the first `period`
/// deltas, then Wilder-smoothed. A series with no losses pins at 100, no
/// gains at 0, and a perfectly flat series reads 50 (neutral, not a signal).
pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let n = closes.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n <= period {
        return out;
    }

    let mut gains = vec![0.0; n];
    let mut losses = vec![0.0; n];
    for i in 1..n {
        let delta = closes[i] - closes[i - 1];
        if delta > 0.0 {
            gains[i] = delta;
        } else {
            losses[i] = -delta;
        }
    }

    let mut avg_gain = gains[1..=period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[1..=period].iter().sum::<f64>() / period as f64;
    out[period] = rsi_value(avg_gain, avg_loss);

    let p = period as f64;
    for i in period + 1..n {
        avg_gain = (avg_gain * (p - 1.0) + gains[i]) / p;
        avg_loss = (avg_loss * (p - 1.0) + losses[i]) / p;
        out[i] = rsi_value(avg_gain, avg_loss);
    }
    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            50.0
        } else {
            100.0
        }
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{assert_approx, EPS};

    #[test]
    fn test_warmup_is_nan() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let result = rsi(&closes, 14);
        assert!(result[13].is_nan());
        assert!(!result[14].is_nan());
    }

    #[test]
    fn test_all_gains_pins_at_100() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let result = rsi(&closes, 14);
        assert_approx(result[29], 100.0, EPS);
    }

    #[test]
    fn test_all_losses_pins_at_0() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 - i as f64 * 0.5).collect();
        let result = rsi(&closes, 14);
        assert_approx(result[29], 0.0, EPS);
    }

    #[test]
    fn test_flat_series_is_neutral() {
        let closes = vec![100.0; 30];
        let result = rsi(&closes, 14);
        assert_approx(result[29], 50.0, EPS);
    }

    #[test]
    fn test_alternating_moves_near_midline() {
        // Equal-sized up and down moves keep RSI near 50
        let closes: Vec<f64> = (0..40)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        let result = rsi(&closes, 14);
        assert!(result[39] > 40.0 && result[39] < 60.0);
    }
}
