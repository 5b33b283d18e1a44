//! Exponential moving average.

/// EMA over a series with alpha = 2 / (period + 1).
///
/// The recursion is seeded with the first raw value and runs from the start
/// of the series, but output is masked with `NaN` until index `period - 1`
/// so warm-up values never leak downstream.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n == 0 {
        return out;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev = values[0];
    if prev.is_nan() {
        return out;
    }
    if period == 1 {
        out[0] = prev;
    }

    for i in 1..n {
        let v = values[i];
        if v.is_nan() {
            return out;
        }
        prev = alpha * v + (1.0 - alpha) * prev;
        if i + 1 >= period {
            out[i] = prev;
        }
    }
    out
}
