//! Engine state: the single source of truth for the position lifecycle.
//!
//! One writer (the decision loop) mutates this through an `Arc<RwLock<_>>`;
//! the HTTP display layer takes read-only snapshots. All bookkeeping for a
//! close happens in one call (`record_close`) so a closed position always
//! yields exactly one trade record and one counter update.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use gale_domain::{OrderSide, Position, TradeRecord, TradeResult};
use rust_decimal::Decimal;
use serde::Serialize;

/// Most recent trades kept for display.
const TRADE_LOG_CAPACITY: usize = 50;

// =============================================================================
// Engine State
// =============================================================================

/// Latest market readings, refreshed every tick for the display layer.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MarketSnapshot {
    pub price: f64,
    pub ema_long: Option<f64>,
    pub rsi: Option<f64>,
    pub adx: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

/// Process-wide engine state.
#[derive(Debug, Default)]
pub struct EngineState {
    position: Option<Position>,
    /// Side of the most recently closed trade; blocks immediate
    /// same-direction re-entry.
    last_direction: Option<OrderSide>,
    last_trade_time: Option<DateTime<Utc>>,
    total_trades: u64,
    winning_trades: u64,
    losing_trades: u64,
    compound_profit: Decimal,
    /// Balance observed on the first successful fetch; equity for sizing
    /// is this plus compounded profit.
    initial_balance: Option<Decimal>,
    current_pnl: Decimal,
    trade_log: VecDeque<TradeRecord>,
    market: Option<MarketSnapshot>,
    /// Consecutive failed exit attempts for the open position.
    exit_failures: u32,
    /// A protective-order failure demanded an immediate close that has not
    /// succeeded yet; retried every tick until it does.
    pending_failsafe: Option<TradeResult>,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub fn last_direction(&self) -> Option<OrderSide> {
        self.last_direction
    }

    pub fn compound_profit(&self) -> Decimal {
        self.compound_profit
    }

    pub fn total_trades(&self) -> u64 {
        self.total_trades
    }

    pub fn winning_trades(&self) -> u64 {
        self.winning_trades
    }

    pub fn losing_trades(&self) -> u64 {
        self.losing_trades
    }

    pub fn exit_failures(&self) -> u32 {
        self.exit_failures
    }

    /// Install a freshly opened position. Entry also restarts the cooldown
    /// clock; a later close overwrites it with the close time.
    pub fn open_position(&mut self, position: Position) {
        self.position = Some(position);
        self.last_trade_time = Some(position.opened_at);
        self.current_pnl = Decimal::ZERO;
        self.exit_failures = 0;
        self.pending_failsafe = None;
    }

    /// Mark the open position for an immediate protective close.
    pub fn set_pending_failsafe(&mut self, result: TradeResult) {
        self.pending_failsafe = Some(result);
    }

    pub fn pending_failsafe(&self) -> Option<TradeResult> {
        self.pending_failsafe
    }

    /// Record a closed trade: one trade record, one counter update, and
    /// the cooldown/whipsaw bookkeeping, all together.
    pub fn record_close(&mut self, record: TradeRecord) {
        self.total_trades += 1;
        if record.result.is_win() {
            self.winning_trades += 1;
        } else {
            self.losing_trades += 1;
        }
        self.compound_profit += record.profit;
        self.last_direction = Some(record.side);
        self.last_trade_time = Some(record.closed_at);
        self.position = None;
        self.current_pnl = Decimal::ZERO;
        self.exit_failures = 0;
        self.pending_failsafe = None;

        if self.trade_log.len() == TRADE_LOG_CAPACITY {
            self.trade_log.pop_front();
        }
        self.trade_log.push_back(record);
    }

    /// True while the post-close cooldown is still running.
    pub fn cooldown_active(&self, now: DateTime<Utc>, cooldown_secs: u64) -> bool {
        match self.last_trade_time {
            Some(t) => now - t < Duration::seconds(cooldown_secs as i64),
            None => false,
        }
    }

    /// True when the desired side matches the side just closed.
    pub fn whipsaw_blocked(&self, desired: OrderSide) -> bool {
        self.last_direction == Some(desired)
    }

    /// Capture the funded balance the first time it is observed. An
    /// unfunded read is not a base; the capture waits for a positive
    /// balance.
    pub fn ensure_initial_balance(&mut self, balance: Decimal) {
        if self.initial_balance.is_none() && balance > Decimal::ZERO {
            self.initial_balance = Some(balance);
        }
    }

    /// Equity for sizing: initial balance plus compounded profit.
    pub fn equity(&self) -> Option<Decimal> {
        self.initial_balance.map(|b| b + self.compound_profit)
    }

    pub fn set_unrealized_pnl(&mut self, pnl: Decimal) {
        self.current_pnl = pnl;
    }

    pub fn update_market(&mut self, snapshot: MarketSnapshot) {
        self.market = Some(snapshot);
    }

    /// Count a failed exit attempt; returns the new consecutive total.
    pub fn note_exit_failure(&mut self) -> u32 {
        self.exit_failures += 1;
        self.exit_failures
    }

    /// Consistent multi-field copy for the display layer.
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            position: self.position,
            unrealized_pnl: self.current_pnl,
            total_trades: self.total_trades,
            winning_trades: self.winning_trades,
            losing_trades: self.losing_trades,
            compound_profit: self.compound_profit,
            initial_balance: self.initial_balance,
            last_direction: self.last_direction,
            recent_trades: self.trade_log.iter().rev().cloned().collect(),
            market: self.market,
        }
    }
}

/// Read-only view handed to the display layer.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub position: Option<Position>,
    pub unrealized_pnl: Decimal,
    pub total_trades: u64,
    pub winning_trades: u64,
    pub losing_trades: u64,
    pub compound_profit: Decimal,
    pub initial_balance: Option<Decimal>,
    pub last_direction: Option<OrderSide>,
    /// Most recent first.
    pub recent_trades: Vec<TradeRecord>,
    pub market: Option<MarketSnapshot>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use gale_domain::{Price, Quantity, TradeResult};
    use rust_decimal_macros::dec;

    fn record(side: OrderSide, result: TradeResult, profit: Decimal) -> TradeRecord {
        TradeRecord {
            side,
            entry_price: Price::new(dec!(0.1)).unwrap(),
            exit_price: Price::new(dec!(0.101)).unwrap(),
            result,
            profit,
            closed_at: Utc::now(),
        }
    }

    fn position() -> Position {
        Position::open(
            OrderSide::Buy,
            Price::new(dec!(0.1)).unwrap(),
            Quantity::new(dec!(500)).unwrap(),
            dec!(0.001),
        )
        .unwrap()
    }

    #[test]
    fn test_record_close_updates_everything_once() {
        let mut state = EngineState::new();
        state.open_position(position());

        state.record_close(record(OrderSide::Buy, TradeResult::Tp, dec!(0.5)));

        assert!(state.position().is_none());
        assert_eq!(state.total_trades(), 1);
        assert_eq!(state.winning_trades(), 1);
        assert_eq!(state.losing_trades(), 0);
        assert_eq!(state.compound_profit(), dec!(0.5));
        assert_eq!(state.last_direction(), Some(OrderSide::Buy));
        assert_eq!(state.snapshot().recent_trades.len(), 1);
    }

    #[test]
    fn test_losses_count_separately() {
        let mut state = EngineState::new();
        state.record_close(record(OrderSide::Sell, TradeResult::Sl, dec!(-0.3)));
        state.record_close(record(OrderSide::Buy, TradeResult::NoTp, dec!(-0.1)));

        assert_eq!(state.total_trades(), 2);
        assert_eq!(state.winning_trades(), 0);
        assert_eq!(state.losing_trades(), 2);
        assert_eq!(state.compound_profit(), dec!(-0.4));
    }

    #[test]
    fn test_cooldown_window() {
        let mut state = EngineState::new();
        let now = Utc::now();
        assert!(!state.cooldown_active(now, 600));

        state.record_close(record(OrderSide::Buy, TradeResult::Tp, dec!(0.1)));
        assert!(state.cooldown_active(Utc::now(), 600));
        assert!(!state.cooldown_active(Utc::now() + Duration::seconds(601), 600));
    }

    #[test]
    fn test_whipsaw_guard() {
        let mut state = EngineState::new();
        assert!(!state.whipsaw_blocked(OrderSide::Buy));

        state.record_close(record(OrderSide::Buy, TradeResult::Sl, dec!(-0.1)));
        assert!(state.whipsaw_blocked(OrderSide::Buy));
        assert!(!state.whipsaw_blocked(OrderSide::Sell));

        // trading the other side clears the block on the first
        state.record_close(record(OrderSide::Sell, TradeResult::Tp, dec!(0.2)));
        assert!(!state.whipsaw_blocked(OrderSide::Buy));
    }

    #[test]
    fn test_equity_compounds() {
        let mut state = EngineState::new();
        assert!(state.equity().is_none());

        state.ensure_initial_balance(dec!(1000));
        state.ensure_initial_balance(dec!(555)); // later fetches are ignored
        state.record_close(record(OrderSide::Buy, TradeResult::Tp, dec!(25)));

        assert_eq!(state.equity(), Some(dec!(1025)));
    }

    #[test]
    fn test_initial_balance_skips_unfunded_reads() {
        let mut state = EngineState::new();
        state.ensure_initial_balance(Decimal::ZERO);
        assert!(state.equity().is_none());

        // the first funded read becomes the base
        state.ensure_initial_balance(dec!(1000));
        assert_eq!(state.equity(), Some(dec!(1000)));
    }

    #[test]
    fn test_entry_starts_cooldown() {
        let mut state = EngineState::new();
        assert!(!state.cooldown_active(Utc::now(), 600));

        state.open_position(position());
        assert!(state.cooldown_active(Utc::now(), 600));
    }

    #[test]
    fn test_trade_log_is_bounded() {
        let mut state = EngineState::new();
        for _ in 0..(TRADE_LOG_CAPACITY + 10) {
            state.record_close(record(OrderSide::Buy, TradeResult::Tp, dec!(0.01)));
        }
        assert_eq!(state.snapshot().recent_trades.len(), TRADE_LOG_CAPACITY);
    }

    #[test]
    fn test_exit_failures_reset_on_close() {
        let mut state = EngineState::new();
        state.open_position(position());
        assert_eq!(state.note_exit_failure(), 1);
        assert_eq!(state.note_exit_failure(), 2);

        state.record_close(record(OrderSide::Buy, TradeResult::Sl, dec!(-0.5)));
        assert_eq!(state.exit_failures(), 0);
    }
}
