//! Gale Strategy Layer
//!
//! Pure decision logic: regime admission, multi-factor signal scoring, and
//! position sizing. Everything here is deterministic over a feature frame;
//! the decision loop in the daemon owns time, state, and exchange calls.

#![warn(clippy::all)]

pub mod params;
pub mod regime;
pub mod scorer;
pub mod sizer;

pub use params::StrategyParams;
pub use regime::RegimeFilter;
pub use scorer::{best_candidate, score, SignalCandidate, MAX_SCORE};
pub use sizer::RiskSizer;
