//! Position lifecycle and entry evaluation.
//!
//! One `tick` does everything the engine does in a cycle: fetch candles,
//! compute features, then either monitor the open position or evaluate a
//! new entry. State changes only happen after the corresponding exchange
//! confirmation, so a failed call leaves the engine exactly where it was.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use gale_domain::position::TP_ATR_MULT;
use gale_domain::{
    Candle, OrderSide, Position, Price, Symbol, TradeRecord, TradeResult,
};
use gale_exec::{ConditionalKind, ExchangePort};
use gale_indicators::{price_range_pct, FeatureFrame, FeatureRow, MIN_CANDLES};
use gale_strategy::{best_candidate, RegimeFilter, RiskSizer};

use crate::config::{Config, KLINE_LIMIT};
use crate::error::DaemonResult;
use crate::state::{EngineState, MarketSnapshot};

/// Consecutive failed exits tolerated before the log escalates to error.
const MAX_EXIT_FAILURES: u32 = 3;

/// Lookback for the quiet-market range guard.
const RANGE_LOOKBACK: usize = 20;

/// What a tick did, used by the daemon to pick the next poll interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No position and no entry; idle poll interval applies.
    Idle,
    /// A position is open; poll faster.
    PositionOpen,
    /// A position was closed this tick; pause for settlement first.
    Closed,
}

/// The single writer of `EngineState`.
pub struct Trader<E: ExchangePort> {
    exchange: Arc<E>,
    state: Arc<RwLock<EngineState>>,
    config: Config,
    symbol: Symbol,
    sizer: RiskSizer,
    filter: RegimeFilter,
}

impl<E: ExchangePort> Trader<E> {
    pub fn new(
        exchange: Arc<E>,
        state: Arc<RwLock<EngineState>>,
        config: Config,
    ) -> DaemonResult<Self> {
        let symbol = Symbol::from_pair(&config.exchange.symbol)?;
        let sizer = RiskSizer::new(config.trading.trade_portion, config.trading.leverage);
        Ok(Self {
            exchange,
            state,
            config,
            symbol,
            sizer,
            filter: RegimeFilter,
        })
    }

    pub fn state(&self) -> Arc<RwLock<EngineState>> {
        self.state.clone()
    }

    /// Run one cycle: fetch, monitor or evaluate, act.
    pub async fn tick(&self) -> DaemonResult<TickOutcome> {
        let candles = self
            .exchange
            .get_candles(&self.symbol, &self.config.exchange.interval, KLINE_LIMIT)
            .await?;
        if candles.len() < MIN_CANDLES {
            debug!(got = candles.len(), need = MIN_CANDLES, "Not enough candles yet");
            return Ok(TickOutcome::Idle);
        }

        let frame = FeatureFrame::compute(&candles)?;
        let (row, prev) = match (frame.last(), frame.prev()) {
            (Some(row), Some(prev)) => (*row, *prev),
            _ => return Ok(TickOutcome::Idle),
        };

        self.state.write().await.update_market(MarketSnapshot {
            price: row.close,
            ema_long: row.ema_long,
            rsi: row.rsi,
            adx: row.adx,
            updated_at: Utc::now(),
        });

        let open = self.state.read().await.position().copied();
        if let Some(position) = open {
            let Some(mark) = Decimal::from_f64_retain(row.close) else {
                return Ok(TickOutcome::PositionOpen);
            };
            return self.check_position(&position, mark).await;
        }

        self.try_enter(&row, &prev, &candles).await
    }

    // =========================================================================
    // Monitoring
    // =========================================================================

    /// Test the open position against its TP/SL triggers at a mark price.
    ///
    /// A tolerance band absorbs quote noise: a BUY closes as TP once the
    /// mark reaches `tp - tolerance` and as SL at `sl + tolerance`; SELL is
    /// the mirror. No trigger means no mutation beyond the PnL readout.
    pub async fn check_position(
        &self,
        position: &Position,
        mark: Decimal,
    ) -> DaemonResult<TickOutcome> {
        // an unfinished protective close takes priority over triggers
        if let Some(result) = self.state.read().await.pending_failsafe() {
            return self.close_position(position, result).await;
        }

        let tol = self.config.trading.tolerance;
        let tp = position.take_profit.as_decimal();
        let sl = position.stop_loss.as_decimal();

        let result = match position.side {
            OrderSide::Buy if mark >= tp - tol => Some(TradeResult::Tp),
            OrderSide::Buy if mark <= sl + tol => Some(TradeResult::Sl),
            OrderSide::Sell if mark <= tp + tol => Some(TradeResult::Tp),
            OrderSide::Sell if mark >= sl - tol => Some(TradeResult::Sl),
            _ => None,
        };

        match result {
            Some(result) => self.close_position(position, result).await,
            None => {
                if let Ok(price) = Price::new(mark) {
                    let pnl = position.unrealized_pnl(price);
                    self.state.write().await.set_unrealized_pnl(pnl);
                }
                Ok(TickOutcome::PositionOpen)
            }
        }
    }

    /// Close the position with an opposing market order. Failure leaves the
    /// position open for a retry on the next tick.
    async fn close_position(
        &self,
        position: &Position,
        result: TradeResult,
    ) -> DaemonResult<TickOutcome> {
        let close_side = position.side.opposite();
        let fill = match self
            .exchange
            .place_market_order(&self.symbol, close_side, position.quantity)
            .await
        {
            Ok(fill) => fill,
            Err(e) => {
                let failures = self.state.write().await.note_exit_failure();
                if failures >= MAX_EXIT_FAILURES {
                    error!(error = %e, failures, "Exit order keeps failing; position still open");
                } else {
                    warn!(error = %e, failures, "Exit order failed; will retry next tick");
                }
                return Ok(TickOutcome::PositionOpen);
            }
        };

        // realized profit comes from the actual fill, not the trigger price
        let profit = position.realized_profit(fill.fill_price);
        let record = TradeRecord {
            side: position.side,
            entry_price: position.entry_price,
            exit_price: fill.fill_price,
            result,
            profit,
            closed_at: Utc::now(),
        };
        info!(
            result = result.as_str(),
            side = %position.side,
            entry = %position.entry_price,
            exit = %fill.fill_price,
            %profit,
            "Position closed"
        );
        self.state.write().await.record_close(record);
        Ok(TickOutcome::Closed)
    }

    // =========================================================================
    // Entry
    // =========================================================================

    async fn try_enter(
        &self,
        row: &FeatureRow,
        prev: &FeatureRow,
        candles: &[Candle],
    ) -> DaemonResult<TickOutcome> {
        if self
            .state
            .read()
            .await
            .cooldown_active(Utc::now(), self.config.trading.cooldown_secs)
        {
            debug!("Cooldown active; skipping entry evaluation");
            return Ok(TickOutcome::Idle);
        }

        // no volatility estimate, no trade
        let Some(atr) = row.atr else {
            return Ok(TickOutcome::Idle);
        };

        // one-bar spike guard
        if (row.close - prev.close).abs() > self.config.strategy.spike_atr_mult * atr {
            warn!(
                close = row.close,
                prev_close = prev.close,
                atr,
                "Spike guard tripped; abstaining"
            );
            return Ok(TickOutcome::Idle);
        }

        // quiet-market guard
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let range = price_range_pct(&closes, RANGE_LOOKBACK);
        if range.map_or(true, |r| r <= self.config.strategy.min_range_pct) {
            debug!(?range, "Recent range too small; abstaining");
            return Ok(TickOutcome::Idle);
        }

        let Some(candidate) = best_candidate(&self.config.strategy, &self.filter, row, prev)
        else {
            return Ok(TickOutcome::Idle);
        };
        let side = candidate.direction.order_side();

        if self.state.read().await.whipsaw_blocked(side) {
            info!(direction = %candidate.direction, "Whipsaw guard blocked re-entry");
            return Ok(TickOutcome::Idle);
        }

        // coarse trend floor, separate from the scorer's own ADX criterion
        if !row
            .adx
            .is_some_and(|adx| adx >= self.config.strategy.entry_adx_floor)
        {
            debug!(adx = ?row.adx, "Below entry ADX floor");
            return Ok(TickOutcome::Idle);
        }

        // the TP must be worth the round trip
        let Some(price) = Decimal::from_f64_retain(row.close).and_then(|p| Price::new(p).ok())
        else {
            return Ok(TickOutcome::Idle);
        };
        let Some(atr_dec) = Decimal::from_f64_retain(atr) else {
            return Ok(TickOutcome::Idle);
        };
        let atr_dec = atr_dec.max(self.config.trading.min_atr);
        let tp_distance_pct = atr_dec * TP_ATR_MULT / price.as_decimal() * Decimal::ONE_HUNDRED;
        if tp_distance_pct < self.config.trading.min_tp_percent {
            debug!(%tp_distance_pct, "Estimated TP distance below minimum");
            return Ok(TickOutcome::Idle);
        }

        let available = self.exchange.get_balance().await?;
        let equity = {
            let mut state = self.state.write().await;
            state.ensure_initial_balance(available);
            state.equity().unwrap_or(available)
        };
        let Some(quantity) = self.sizer.size(equity, available, price) else {
            debug!(%equity, %available, "Sizer abstained");
            return Ok(TickOutcome::Idle);
        };

        let fill = match self
            .exchange
            .place_market_order(&self.symbol, side, quantity)
            .await
        {
            Ok(fill) => fill,
            Err(e) => {
                warn!(error = %e, "Entry order rejected; no state change");
                return Ok(TickOutcome::Idle);
            }
        };

        let Some(position) = Position::open(side, fill.fill_price, fill.filled_quantity, atr_dec)
        else {
            // protective prices cannot be fixed: do not hold the fill
            warn!("Could not fix protective prices; closing entry immediately");
            let fallback = Position {
                side,
                entry_price: fill.fill_price,
                quantity: fill.filled_quantity,
                take_profit: fill.fill_price,
                stop_loss: fill.fill_price,
                opened_at: Utc::now(),
            };
            let mut state = self.state.write().await;
            state.open_position(fallback);
            state.set_pending_failsafe(TradeResult::NoTp);
            drop(state);
            return self.close_position(&fallback, TradeResult::NoTp).await;
        };

        info!(
            %side,
            entry = %position.entry_price,
            quantity = %position.quantity,
            tp = %position.take_profit,
            sl = %position.stop_loss,
            score = candidate.score,
            "Position opened"
        );
        self.state.write().await.open_position(position);

        self.place_protective_orders(&position).await
    }

    /// Submit the resting TP and SL orders for a just-opened position. A
    /// rejection of either forces an immediate market close: the engine
    /// never holds a position without at least attempting protection.
    async fn place_protective_orders(&self, position: &Position) -> DaemonResult<TickOutcome> {
        let close_side = position.side.opposite();

        if let Err(e) = self
            .exchange
            .place_conditional_order(
                &self.symbol,
                ConditionalKind::TakeProfit,
                close_side,
                position.quantity,
                position.take_profit,
            )
            .await
        {
            warn!(error = %e, "Take-profit order rejected; closing position");
            self.state
                .write()
                .await
                .set_pending_failsafe(TradeResult::NoTp);
            return self.close_position(position, TradeResult::NoTp).await;
        }

        if let Err(e) = self
            .exchange
            .place_conditional_order(
                &self.symbol,
                ConditionalKind::StopLoss,
                close_side,
                position.quantity,
                position.stop_loss,
            )
            .await
        {
            warn!(error = %e, "Stop-loss order rejected; closing position");
            self.state
                .write()
                .await
                .set_pending_failsafe(TradeResult::NoSl);
            return self.close_position(position, TradeResult::NoSl).await;
        }

        Ok(TickOutcome::PositionOpen)
    }
}
