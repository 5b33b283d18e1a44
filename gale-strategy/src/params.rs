//! Tunable strategy thresholds.

use serde::{Deserialize, Serialize};

/// Thresholds used by the regime filter, the scorer, and the decision
/// loop's pre-entry guards. Defaults mirror the live production tuning.
///
/// `adx_min` is the scorer's trend-strength criterion; `entry_adx_floor`
/// is a second, coarser gate checked at entry time. They are deliberately
/// kept as separate knobs rather than collapsed into one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyParams {
    /// Dead-zone around the long EMA, as a percent of it.
    pub noise_pct: f64,
    /// ADX level that earns the scorer's trend-strength point.
    pub adx_min: f64,
    /// RSI must exceed this for a long momentum point.
    pub rsi_upper: f64,
    /// RSI must fall below this for a short momentum point.
    pub rsi_lower: f64,
    /// Acceptable ATR band as a percent of price.
    pub min_atr_pct: f64,
    pub max_atr_pct: f64,
    /// Volume must reach `volume_ma * vol_boost` for the volume point.
    pub vol_boost: f64,
    /// Minimum score for a direction to become a candidate.
    pub min_score: u8,
    /// Minimum percent range over the recent lookback; below it the market
    /// is considered too quiet to trade.
    pub min_range_pct: f64,
    /// One-bar close change above `spike_atr_mult * ATR` blocks entries.
    pub spike_atr_mult: f64,
    /// Coarse ADX floor applied at entry time, separate from `adx_min`.
    pub entry_adx_floor: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            noise_pct: 0.25,
            adx_min: 25.0,
            rsi_upper: 55.0,
            rsi_lower: 45.0,
            min_atr_pct: 0.5,
            max_atr_pct: 3.0,
            vol_boost: 1.2,
            min_score: 4,
            min_range_pct: 1.5,
            spike_atr_mult: 1.8,
            entry_adx_floor: 20.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = StrategyParams::default();
        assert_eq!(params.min_score, 4);
        assert_eq!(params.noise_pct, 0.25);
        assert!(params.entry_adx_floor < params.adx_min);
    }
}
