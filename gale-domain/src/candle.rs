//! OHLCV candle data.
//!
//! Candles are the raw input of the indicator pipeline. A sequence is only
//! usable when timestamps are strictly increasing; out-of-order data from
//! the exchange is rejected up front rather than silently reordered.

use serde::{Deserialize, Serialize};

use crate::value_objects::DomainError;

/// A single OHLCV candle. Immutable once received.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Open time in epoch milliseconds
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Midpoint of high and low (HL2), used by band indicators.
    pub fn hl2(&self) -> f64 {
        (self.high + self.low) / 2.0
    }
}

/// Validate that a candle sequence has strictly increasing timestamps.
pub fn validate_sequence(candles: &[Candle]) -> Result<(), DomainError> {
    for pair in candles.windows(2) {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(DomainError::InvalidCandleSequence(format!(
                "Timestamps not strictly increasing: {} then {}",
                pair[0].timestamp, pair[1].timestamp
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(ts: i64, close: f64) -> Candle {
        Candle {
            timestamp: ts,
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 100.0,
        }
    }

    #[test]
    fn test_hl2() {
        let c = candle(0, 100.0);
        assert_eq!(c.hl2(), 100.0);
    }

    #[test]
    fn test_validate_sequence_ok() {
        let candles = vec![candle(1, 100.0), candle(2, 101.0), candle(3, 102.0)];
        assert!(validate_sequence(&candles).is_ok());
    }

    #[test]
    fn test_validate_sequence_rejects_duplicate_timestamp() {
        let candles = vec![candle(1, 100.0), candle(1, 101.0)];
        assert!(validate_sequence(&candles).is_err());
    }

    #[test]
    fn test_validate_sequence_rejects_regression() {
        let candles = vec![candle(2, 100.0), candle(1, 101.0)];
        assert!(validate_sequence(&candles).is_err());
    }

    #[test]
    fn test_validate_empty_and_single() {
        assert!(validate_sequence(&[]).is_ok());
        assert!(validate_sequence(&[candle(1, 100.0)]).is_ok());
    }
}
