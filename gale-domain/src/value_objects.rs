//! Value Objects for the Gale Domain
//!
//! Immutable, validated domain primitives.
//! All value objects enforce invariants at construction time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain errors for value object validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Price must be positive
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    /// Quantity must be positive
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Symbol must be a valid perpetual contract pair
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Candle sequence violates ordering or interval constraints
    #[error("Invalid candle sequence: {0}")]
    InvalidCandleSequence(String),
}

// =============================================================================
// Price
// =============================================================================

/// Price represents a positive decimal price
///
/// # Invariants
/// - Must be > 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price(Decimal);

impl Price {
    /// Create a new Price with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPrice` if value <= 0
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value <= Decimal::ZERO {
            return Err(DomainError::InvalidPrice("Price must be positive".to_string()));
        }
        Ok(Self(value))
    }

    /// Get the underlying Decimal value
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Quantity
// =============================================================================

/// Quantity represents a positive decimal quantity
///
/// # Invariants
/// - Must be > 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Create a new Quantity with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidQuantity` if value <= 0
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value <= Decimal::ZERO {
            return Err(DomainError::InvalidQuantity(
                "Quantity must be positive".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Get the underlying Decimal value
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Symbol
// =============================================================================

/// Symbol represents a perpetual contract pair (e.g., DOGE-USDT)
///
/// # Invariants
/// - Base and quote must be non-empty
/// - Wire form is hyphenated, matching the swap API convention
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    base: String,
    quote: String,
}

impl Symbol {
    /// Create a Symbol from a hyphenated contract pair string
    ///
    /// # Examples
    /// ```
    /// # use gale_domain::value_objects::Symbol;
    /// let symbol = Symbol::from_pair("DOGE-USDT").unwrap();
    /// assert_eq!(symbol.base(), "DOGE");
    /// assert_eq!(symbol.quote(), "USDT");
    /// ```
    pub fn from_pair(pair: &str) -> Result<Self, DomainError> {
        let mut parts = pair.splitn(2, '-');
        let base = parts.next().unwrap_or_default();
        let quote = parts.next().unwrap_or_default();

        if base.is_empty() || quote.is_empty() {
            return Err(DomainError::InvalidSymbol(format!(
                "Expected BASE-QUOTE pair, got: {}",
                pair
            )));
        }

        Ok(Self {
            base: base.to_uppercase(),
            quote: quote.to_uppercase(),
        })
    }

    /// Base asset (e.g., "DOGE")
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Quote asset (e.g., "USDT")
    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Wire form of the pair (e.g., "DOGE-USDT")
    pub fn as_pair(&self) -> String {
        format!("{}-{}", self.base, self.quote)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.base, self.quote)
    }
}

// =============================================================================
// Side / OrderSide
// =============================================================================

/// Direction of a candidate signal (trend side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// The order side that opens a position in this direction.
    pub fn order_side(&self) -> OrderSide {
        match self {
            Side::Long => OrderSide::Buy,
            Side::Short => OrderSide::Sell,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "long"),
            Side::Short => write!(f, "short"),
        }
    }
}

/// Side of an order as submitted to the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// The side that closes a position opened with this side.
    pub fn opposite(&self) -> OrderSide {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }

    /// Wire form used by the swap API.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_valid() {
        let price = Price::new(dec!(0.1)).unwrap();
        assert_eq!(price.as_decimal(), dec!(0.1));
    }

    #[test]
    fn test_price_rejects_zero_and_negative() {
        assert!(Price::new(Decimal::ZERO).is_err());
        assert!(Price::new(dec!(-1)).is_err());
    }

    #[test]
    fn test_quantity_rejects_zero() {
        assert!(Quantity::new(Decimal::ZERO).is_err());
        assert!(Quantity::new(dec!(100)).is_ok());
    }

    #[test]
    fn test_symbol_from_pair() {
        let symbol = Symbol::from_pair("DOGE-USDT").unwrap();
        assert_eq!(symbol.base(), "DOGE");
        assert_eq!(symbol.quote(), "USDT");
        assert_eq!(symbol.as_pair(), "DOGE-USDT");
    }

    #[test]
    fn test_symbol_uppercases() {
        let symbol = Symbol::from_pair("doge-usdt").unwrap();
        assert_eq!(symbol.as_pair(), "DOGE-USDT");
    }

    #[test]
    fn test_symbol_rejects_missing_quote() {
        assert!(Symbol::from_pair("DOGEUSDT").is_err());
        assert!(Symbol::from_pair("DOGE-").is_err());
        assert!(Symbol::from_pair("-USDT").is_err());
    }

    #[test]
    fn test_side_to_order_side() {
        assert_eq!(Side::Long.order_side(), OrderSide::Buy);
        assert_eq!(Side::Short.order_side(), OrderSide::Sell);
    }

    #[test]
    fn test_order_side_opposite() {
        assert_eq!(OrderSide::Buy.opposite(), OrderSide::Sell);
        assert_eq!(OrderSide::Sell.opposite(), OrderSide::Buy);
    }
}
