//! Rolling volume average.

/// Simple moving average of volume. Defined from index `period - 1`.
pub fn volume_ma(volumes: &[f64], period: usize) -> Vec<f64> {
    let n = volumes.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < period {
        return out;
    }

    let mut sum: f64 = volumes[..period].iter().sum();
    out[period - 1] = sum / period as f64;
    for i in period..n {
        sum += volumes[i] - volumes[i - period];
        out[i] = sum / period as f64;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{assert_approx, EPS};

    #[test]
    fn test_rolling_mean() {
        let volumes = vec![10.0, 20.0, 30.0, 40.0];
        let result = volume_ma(&volumes, 2);
        assert!(result[0].is_nan());
        assert_approx(result[1], 15.0, EPS);
        assert_approx(result[2], 25.0, EPS);
        assert_approx(result[3], 35.0, EPS);
    }

    #[test]
    fn test_short_series_all_nan() {
        let result = volume_ma(&[10.0, 20.0], 20);
        assert!(result.iter().all(|v| v.is_nan()));
    }
}
