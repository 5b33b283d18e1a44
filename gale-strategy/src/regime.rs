//! Trend-regime admission.

use gale_domain::Side;
use gale_indicators::FeatureRow;

use crate::params::StrategyParams;

/// Admits or rejects a candidate direction based on where price sits
/// relative to the long EMA.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegimeFilter;

impl RegimeFilter {
    /// A direction is admitted only when price is on its side of the long
    /// EMA and outside the noise dead-zone around it. An undefined or
    /// non-positive long EMA rejects everything.
    pub fn admits(&self, params: &StrategyParams, row: &FeatureRow, direction: Side) -> bool {
        let Some(ema_long) = row.ema_long else {
            return false;
        };
        if ema_long <= 0.0 {
            return false;
        }

        let proximity = (row.close - ema_long).abs() / ema_long * 100.0;
        if proximity < params.noise_pct {
            return false;
        }

        match direction {
            Side::Long => row.close > ema_long,
            Side::Short => row.close < ema_long,
        }
    }
}
