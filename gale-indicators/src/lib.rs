//! Gale Indicator Layer
//!
//! Pure indicator math over OHLCV candles. Series are `f64` with `NaN`
//! marking indices where a value is undefined (warm-up or degenerate
//! input); conversion to `Decimal` happens at the execution boundary,
//! never here. No I/O, no async.

#![warn(clippy::all)]

pub mod adx;
pub mod atr;
pub mod ema;
pub mod pipeline;
pub mod rsi;
pub mod supertrend;
pub mod volume;

pub use adx::adx;
pub use atr::{atr, true_range, wilder_smooth};
pub use ema::ema;
pub use pipeline::{price_range_pct, FeatureFrame, FeatureRow, IndicatorError, MIN_CANDLES};
pub use rsi::rsi;
pub use supertrend::{supertrend, SupertrendSeries, TrendDirection};
pub use volume::volume_ma;

#[cfg(test)]
pub(crate) mod testutil {
    use gale_domain::Candle;

    pub const EPS: f64 = 1e-9;

    pub fn assert_approx(actual: f64, expected: f64, eps: f64) {
        assert!(
            (actual - expected).abs() <= eps,
            "expected {expected}, got {actual}"
        );
    }

    /// Candles with a fixed 0.5 high/low spread around each close and
    /// one-minute spacing. Enough structure for most indicator tests.
    pub fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: (i as i64) * 60_000,
                open: close,
                high: close + 0.5,
                low: close - 0.5,
                close,
                volume: 100.0,
            })
            .collect()
    }
}
