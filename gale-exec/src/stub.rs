//! Stub exchange for testing.
//!
//! Simulates the exchange in memory: immediate fills at a configured
//! price, injectable per-operation failures, and a record of every order
//! submitted so tests can assert on what the engine actually did.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::RwLock;

use gale_domain::{Candle, OrderSide, Price, Quantity, Symbol};

use crate::error::ExecError;
use crate::ports::{ConditionalKind, ExchangePort, ExchangePosition, OrderResult};

/// A market order the stub received.
#[derive(Debug, Clone)]
pub struct MarketOrderCall {
    pub side: OrderSide,
    pub quantity: Quantity,
}

/// A conditional order the stub received.
#[derive(Debug, Clone)]
pub struct ConditionalOrderCall {
    pub kind: ConditionalKind,
    pub side: OrderSide,
    pub quantity: Quantity,
    pub trigger_price: Price,
}

/// In-memory exchange. Market orders fill immediately at the configured
/// fill price.
pub struct StubExchange {
    candles: RwLock<Vec<Candle>>,
    balance: RwLock<Decimal>,
    position: RwLock<Option<ExchangePosition>>,
    fill_price: RwLock<Decimal>,
    order_counter: RwLock<u64>,
    fail_next_candles: RwLock<bool>,
    fail_next_market: RwLock<bool>,
    /// Countdown to a conditional-order failure (1 = fail the next one).
    fail_conditional_in: RwLock<Option<usize>>,
    market_orders: RwLock<Vec<MarketOrderCall>>,
    conditional_orders: RwLock<Vec<ConditionalOrderCall>>,
}

impl StubExchange {
    /// Create a stub filling at `fill_price` with the given balance.
    pub fn new(fill_price: Decimal, balance: Decimal) -> Self {
        Self {
            candles: RwLock::new(Vec::new()),
            balance: RwLock::new(balance),
            position: RwLock::new(None),
            fill_price: RwLock::new(fill_price),
            order_counter: RwLock::new(0),
            fail_next_candles: RwLock::new(false),
            fail_next_market: RwLock::new(false),
            fail_conditional_in: RwLock::new(None),
            market_orders: RwLock::new(Vec::new()),
            conditional_orders: RwLock::new(Vec::new()),
        }
    }

    /// Replace the candle window returned by `get_candles`.
    pub fn set_candles(&self, candles: Vec<Candle>) {
        *self.candles.write().unwrap() = candles;
    }

    /// Set the price market orders fill at.
    pub fn set_fill_price(&self, price: Decimal) {
        *self.fill_price.write().unwrap() = price;
    }

    pub fn set_balance(&self, balance: Decimal) {
        *self.balance.write().unwrap() = balance;
    }

    pub fn set_position(&self, position: Option<ExchangePosition>) {
        *self.position.write().unwrap() = position;
    }

    /// Fail the next candle fetch.
    pub fn set_fail_next_candles(&self, fail: bool) {
        *self.fail_next_candles.write().unwrap() = fail;
    }

    /// Fail the next market order.
    pub fn set_fail_next_market(&self, fail: bool) {
        *self.fail_next_market.write().unwrap() = fail;
    }

    /// Fail the next conditional order.
    pub fn set_fail_next_conditional(&self, fail: bool) {
        *self.fail_conditional_in.write().unwrap() = if fail { Some(1) } else { None };
    }

    /// Fail the n-th upcoming conditional order (1-based); earlier ones
    /// succeed.
    pub fn set_fail_conditional_in(&self, n: usize) {
        *self.fail_conditional_in.write().unwrap() = Some(n);
    }

    /// Every market order received, in submission order.
    pub fn market_orders(&self) -> Vec<MarketOrderCall> {
        self.market_orders.read().unwrap().clone()
    }

    /// Every conditional order received, in submission order.
    pub fn conditional_orders(&self) -> Vec<ConditionalOrderCall> {
        self.conditional_orders.read().unwrap().clone()
    }

    fn next_order_id(&self) -> String {
        let mut counter = self.order_counter.write().unwrap();
        *counter += 1;
        format!("STUB-{}", *counter)
    }

    fn take_flag(flag: &RwLock<bool>) -> bool {
        let mut flag = flag.write().unwrap();
        let val = *flag;
        *flag = false;
        val
    }

    fn take_conditional_failure(&self) -> bool {
        let mut slot = self.fail_conditional_in.write().unwrap();
        match *slot {
            Some(1) => {
                *slot = None;
                true
            }
            Some(n) => {
                *slot = Some(n - 1);
                false
            }
            None => false,
        }
    }
}

#[async_trait]
impl ExchangePort for StubExchange {
    async fn get_candles(
        &self,
        _symbol: &Symbol,
        _interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, ExecError> {
        if Self::take_flag(&self.fail_next_candles) {
            return Err(ExecError::RequestFailed(
                "Simulated candle fetch failure".to_string(),
            ));
        }
        let candles = self.candles.read().unwrap();
        let start = candles.len().saturating_sub(limit);
        Ok(candles[start..].to_vec())
    }

    async fn get_balance(&self) -> Result<Decimal, ExecError> {
        Ok(*self.balance.read().unwrap())
    }

    async fn get_open_position(
        &self,
        _symbol: &Symbol,
    ) -> Result<Option<ExchangePosition>, ExecError> {
        Ok(self.position.read().unwrap().clone())
    }

    async fn place_market_order(
        &self,
        _symbol: &Symbol,
        side: OrderSide,
        quantity: Quantity,
    ) -> Result<OrderResult, ExecError> {
        if Self::take_flag(&self.fail_next_market) {
            return Err(ExecError::OrderRejected(
                "Simulated market order rejection".to_string(),
            ));
        }

        self.market_orders
            .write()
            .unwrap()
            .push(MarketOrderCall { side, quantity });

        let price = *self.fill_price.read().unwrap();
        let exchange_order_id = self.next_order_id();
        tracing::debug!(%side, %quantity, %price, "Stub: market order filled");

        Ok(OrderResult {
            exchange_order_id,
            fill_price: Price::new(price)?,
            filled_quantity: quantity,
            filled_at: Utc::now(),
        })
    }

    async fn place_conditional_order(
        &self,
        _symbol: &Symbol,
        kind: ConditionalKind,
        side: OrderSide,
        quantity: Quantity,
        trigger_price: Price,
    ) -> Result<(), ExecError> {
        if self.take_conditional_failure() {
            return Err(ExecError::OrderRejected(
                "Simulated conditional order rejection".to_string(),
            ));
        }

        self.conditional_orders
            .write()
            .unwrap()
            .push(ConditionalOrderCall {
                kind,
                side,
                quantity,
                trigger_price,
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn symbol() -> Symbol {
        Symbol::from_pair("DOGE-USDT").unwrap()
    }

    fn qty(d: Decimal) -> Quantity {
        Quantity::new(d).unwrap()
    }

    #[tokio::test]
    async fn test_market_order_fills_at_configured_price() {
        let stub = StubExchange::new(dec!(0.1), dec!(1000));
        let result = stub
            .place_market_order(&symbol(), OrderSide::Buy, qty(dec!(500)))
            .await
            .unwrap();

        assert_eq!(result.fill_price.as_decimal(), dec!(0.1));
        assert_eq!(result.filled_quantity.as_decimal(), dec!(500));
        assert_eq!(stub.market_orders().len(), 1);
    }

    #[tokio::test]
    async fn test_fail_next_market_rejects_once() {
        let stub = StubExchange::new(dec!(0.1), dec!(1000));
        stub.set_fail_next_market(true);

        let first = stub
            .place_market_order(&symbol(), OrderSide::Buy, qty(dec!(1)))
            .await;
        assert!(first.is_err());

        let second = stub
            .place_market_order(&symbol(), OrderSide::Buy, qty(dec!(1)))
            .await;
        assert!(second.is_ok());
        // the rejected order was never recorded
        assert_eq!(stub.market_orders().len(), 1);
    }

    #[tokio::test]
    async fn test_get_candles_honors_limit() {
        let stub = StubExchange::new(dec!(0.1), dec!(1000));
        let candles: Vec<Candle> = (0..10)
            .map(|i| Candle {
                timestamp: i * 60_000,
                open: 0.1,
                high: 0.11,
                low: 0.09,
                close: 0.1,
                volume: 100.0,
            })
            .collect();
        stub.set_candles(candles);

        let fetched = stub.get_candles(&symbol(), "15m", 3).await.unwrap();
        assert_eq!(fetched.len(), 3);
        assert_eq!(fetched[0].timestamp, 7 * 60_000);
    }

    #[tokio::test]
    async fn test_conditional_orders_are_recorded() {
        let stub = StubExchange::new(dec!(0.1), dec!(1000));
        stub.place_conditional_order(
            &symbol(),
            ConditionalKind::TakeProfit,
            OrderSide::Sell,
            qty(dec!(500)),
            Price::new(dec!(0.1012)).unwrap(),
        )
        .await
        .unwrap();

        let calls = stub.conditional_orders();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].kind, ConditionalKind::TakeProfit);
        assert_eq!(calls[0].trigger_price.as_decimal(), dec!(0.1012));
    }
}
