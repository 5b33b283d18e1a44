//! Execution layer port definitions.
//!
//! Ports define the interface to the exchange. Adapters implement them
//! for specific venues (BingX REST, stub).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use gale_domain::{Candle, OrderSide, Price, Quantity, Symbol};

use crate::error::ExecError;

// =============================================================================
// Exchange Port
// =============================================================================

/// Port for the perpetual-swap exchange operations the engine needs.
///
/// Implementations:
/// - `StubExchange` - for testing (immediate fills at a configured price)
/// - `BingxRestClient` - the live BingX swap API
#[async_trait]
pub trait ExchangePort: Send + Sync {
    /// Fetch the most recent candles for a symbol, oldest first.
    ///
    /// A transient upstream failure may surface as an empty vector; the
    /// caller treats short output as "abstain this tick".
    async fn get_candles(
        &self,
        symbol: &Symbol,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, ExecError>;

    /// Available quote-currency balance.
    async fn get_balance(&self) -> Result<Decimal, ExecError>;

    /// The position the exchange believes is open for this symbol, if any.
    ///
    /// Used for reconciliation only; the engine's own state is
    /// authoritative for its lifecycle decisions.
    async fn get_open_position(
        &self,
        symbol: &Symbol,
    ) -> Result<Option<ExchangePosition>, ExecError>;

    /// Place a market order and return the fill.
    async fn place_market_order(
        &self,
        symbol: &Symbol,
        side: OrderSide,
        quantity: Quantity,
    ) -> Result<OrderResult, ExecError>;

    /// Place a resting conditional order (take-profit or stop-loss) that
    /// closes the position when the trigger price trades.
    async fn place_conditional_order(
        &self,
        symbol: &Symbol,
        kind: ConditionalKind,
        side: OrderSide,
        quantity: Quantity,
        trigger_price: Price,
    ) -> Result<(), ExecError>;
}

/// Kind of protective conditional order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionalKind {
    TakeProfit,
    StopLoss,
}

impl ConditionalKind {
    /// Order type string used by the swap API.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionalKind::TakeProfit => "TAKE_PROFIT_MARKET",
            ConditionalKind::StopLoss => "STOP_MARKET",
        }
    }
}

/// Result of a filled market order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResult {
    /// Exchange-assigned order ID
    pub exchange_order_id: String,
    /// Actual fill price
    pub fill_price: Price,
    /// Actual filled quantity
    pub filled_quantity: Quantity,
    /// When the order was filled
    pub filled_at: DateTime<Utc>,
}

/// Position snapshot as reported by the exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangePosition {
    pub side: OrderSide,
    pub entry_price: Decimal,
    pub quantity: Decimal,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_order_result_serialization() {
        let result = OrderResult {
            exchange_order_id: "12345".to_string(),
            fill_price: Price::new(dec!(0.1001)).unwrap(),
            filled_quantity: Quantity::new(dec!(500)).unwrap(),
            filled_at: Utc::now(),
        };

        let json = serde_json::to_string(&result).unwrap();
        let parsed: OrderResult = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.exchange_order_id, "12345");
        assert_eq!(parsed.fill_price.as_decimal(), dec!(0.1001));
    }

    #[test]
    fn test_conditional_kind_wire_form() {
        assert_eq!(ConditionalKind::TakeProfit.as_str(), "TAKE_PROFIT_MARKET");
        assert_eq!(ConditionalKind::StopLoss.as_str(), "STOP_MARKET");
    }
}
