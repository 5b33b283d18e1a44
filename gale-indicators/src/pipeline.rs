//! Feature pipeline: every indicator the scorer consumes, computed per bar.
//!
//! The pipeline is all-or-nothing: it refuses to run on fewer than
//! `MIN_CANDLES` bars so the slowest indicator (the 200-period EMA) is
//! always defined on the last row of a full fetch.

use gale_domain::{candle::validate_sequence, Candle, DomainError};
use thiserror::Error;

use crate::adx::adx;
use crate::atr::atr;
use crate::ema::ema;
use crate::rsi::rsi;
use crate::supertrend::{supertrend, TrendDirection};
use crate::volume::volume_ma;

/// Minimum candles the pipeline accepts.
pub const MIN_CANDLES: usize = 200;

pub const EMA_FAST_PERIOD: usize = 20;
pub const EMA_MID_PERIOD: usize = 50;
pub const EMA_LONG_PERIOD: usize = 200;
pub const RSI_PERIOD: usize = 14;
pub const ADX_PERIOD: usize = 14;
pub const ATR_PERIOD: usize = 14;
pub const SUPERTREND_PERIOD: usize = 10;
pub const SUPERTREND_MULT: f64 = 3.0;
pub const VOLUME_MA_PERIOD: usize = 20;

#[derive(Debug, Error)]
pub enum IndicatorError {
    #[error("Insufficient candles: got {got}, need {need}")]
    InsufficientData { got: usize, need: usize },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// One bar of computed features. Indicator fields are `None` where the
/// underlying series is still warming up or degenerate; downstream code
/// treats `None` as "no signal", never as zero.
#[derive(Debug, Clone, Copy)]
pub struct FeatureRow {
    pub close: f64,
    pub volume: f64,
    pub ema_fast: Option<f64>,
    pub ema_mid: Option<f64>,
    pub ema_long: Option<f64>,
    pub rsi: Option<f64>,
    pub adx: Option<f64>,
    pub atr: Option<f64>,
    /// ATR as a percentage of close.
    pub atr_pct: Option<f64>,
    pub supertrend: Option<TrendDirection>,
    pub volume_ma: Option<f64>,
}

/// Feature rows for a candle window, one per bar.
#[derive(Debug, Clone)]
pub struct FeatureFrame {
    rows: Vec<FeatureRow>,
}

impl FeatureFrame {
    /// Compute all features over a validated candle window.
    pub fn compute(candles: &[Candle]) -> Result<Self, IndicatorError> {
        if candles.len() < MIN_CANDLES {
            return Err(IndicatorError::InsufficientData {
                got: candles.len(),
                need: MIN_CANDLES,
            });
        }
        validate_sequence(candles)?;

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();

        let ema_fast = ema(&closes, EMA_FAST_PERIOD);
        let ema_mid = ema(&closes, EMA_MID_PERIOD);
        let ema_long = ema(&closes, EMA_LONG_PERIOD);
        let rsi = rsi(&closes, RSI_PERIOD);
        let adx = adx(candles, ADX_PERIOD);
        let atr = atr(candles, ATR_PERIOD);
        let st = supertrend(candles, SUPERTREND_PERIOD, SUPERTREND_MULT);
        let vol_ma = volume_ma(&volumes, VOLUME_MA_PERIOD);

        let rows = (0..candles.len())
            .map(|i| {
                let close = closes[i];
                let atr_i = mask(atr[i]);
                let atr_pct = match atr_i {
                    Some(a) if close > 0.0 => Some(a / close * 100.0),
                    _ => None,
                };
                FeatureRow {
                    close,
                    volume: volumes[i],
                    ema_fast: mask(ema_fast[i]),
                    ema_mid: mask(ema_mid[i]),
                    ema_long: mask(ema_long[i]),
                    rsi: mask(rsi[i]),
                    adx: mask(adx[i]),
                    atr: atr_i,
                    atr_pct,
                    supertrend: st.direction[i],
                    volume_ma: mask(vol_ma[i]),
                }
            })
            .collect();

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The most recent row.
    pub fn last(&self) -> Option<&FeatureRow> {
        self.rows.last()
    }

    /// The row before the most recent one.
    pub fn prev(&self) -> Option<&FeatureRow> {
        self.rows.len().checked_sub(2).map(|i| &self.rows[i])
    }
}

fn mask(v: f64) -> Option<f64> {
    if v.is_nan() {
        None
    } else {
        Some(v)
    }
}

/// Percent range of the last `lookback` closes, guarding the division
/// against a near-zero minimum.
pub fn price_range_pct(closes: &[f64], lookback: usize) -> Option<f64> {
    if lookback == 0 || closes.len() < lookback {
        return None;
    }
    let window = &closes[closes.len() - lookback..];
    let max = window.iter().copied().fold(f64::MIN, f64::max);
    let min = window.iter().copied().fold(f64::MAX, f64::min);
    Some((max - min) / min.max(1e-9) * 100.0)
}
