//! Multi-factor entry signal scoring.

use gale_domain::Side;
use gale_indicators::{FeatureRow, TrendDirection};

use crate::params::StrategyParams;
use crate::regime::RegimeFilter;

/// Highest attainable score: one point per criterion.
pub const MAX_SCORE: u8 = 6;

/// A direction that passed the regime filter and scored at least
/// `min_score`. Computed once per loop tick and discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalCandidate {
    pub direction: Side,
    pub score: u8,
}

/// Score a direction against the current and previous feature rows.
///
/// Six independent criteria, one point each. Undefined indicator values
/// contribute nothing; they are never treated as zero.
pub fn score(
    params: &StrategyParams,
    row: &FeatureRow,
    prev: &FeatureRow,
    direction: Side,
) -> u8 {
    let mut points = 0u8;

    // 1. EMA crossover on this bar specifically, not merely current ordering
    if let (Some(fast), Some(mid), Some(prev_fast), Some(prev_mid)) =
        (row.ema_fast, row.ema_mid, prev.ema_fast, prev.ema_mid)
    {
        let crossed = match direction {
            Side::Long => prev_fast <= prev_mid && fast > mid,
            Side::Short => prev_fast >= prev_mid && fast < mid,
        };
        if crossed {
            points += 1;
        }
    }

    // 2. Trend strength
    if row.adx.is_some_and(|adx| adx >= params.adx_min) {
        points += 1;
    }

    // 3. Momentum confirmation
    if let Some(rsi) = row.rsi {
        let confirmed = match direction {
            Side::Long => rsi > params.rsi_upper,
            Side::Short => rsi < params.rsi_lower,
        };
        if confirmed {
            points += 1;
        }
    }

    // 4. Supertrend agreement
    if let Some(st) = row.supertrend {
        let agrees = match direction {
            Side::Long => st == TrendDirection::Up,
            Side::Short => st == TrendDirection::Down,
        };
        if agrees {
            points += 1;
        }
    }

    // 5. Volatility inside the tradable band
    if row
        .atr_pct
        .is_some_and(|pct| pct >= params.min_atr_pct && pct <= params.max_atr_pct)
    {
        points += 1;
    }

    // 6. Volume confirmation
    if row
        .volume_ma
        .is_some_and(|ma| row.volume >= ma * params.vol_boost)
    {
        points += 1;
    }

    points
}

/// Evaluate both directions and return the winning candidate, if any.
///
/// A direction qualifies only if the regime filter admits it and its score
/// reaches `min_score`. The strictly higher score wins; on a tie, long is
/// evaluated first and keeps the win.
pub fn best_candidate(
    params: &StrategyParams,
    filter: &RegimeFilter,
    row: &FeatureRow,
    prev: &FeatureRow,
) -> Option<SignalCandidate> {
    let mut best: Option<SignalCandidate> = None;
    for direction in [Side::Long, Side::Short] {
        if !filter.admits(params, row, direction) {
            continue;
        }
        let s = score(params, row, prev, direction);
        if s < params.min_score {
            continue;
        }
        if best.map_or(true, |b| s > b.score) {
            best = Some(SignalCandidate {
                direction,
                score: s,
            });
        }
    }
    best
}
