//! Position and trade bookkeeping entities.
//!
//! At most one `Position` exists at any time; that invariant is owned by the
//! engine state, not by this type. TP and SL are fixed when the position is
//! created and never recomputed while it is open.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::value_objects::{OrderSide, Price, Quantity};

/// TP/SL distance in ATR multiples: take profit at 1.2x ATR, stop at 0.8x.
pub const TP_ATR_MULT: Decimal = Decimal::from_parts(12, 0, 0, false, 1);
pub const SL_ATR_MULT: Decimal = Decimal::from_parts(8, 0, 0, false, 1);

/// Decimal places trigger prices are rounded to before submission.
const PRICE_SCALE: u32 = 5;

// =============================================================================
// Position
// =============================================================================

/// An open position on the single managed instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub side: OrderSide,
    pub entry_price: Price,
    pub quantity: Quantity,
    pub take_profit: Price,
    pub stop_loss: Price,
    pub opened_at: DateTime<Utc>,
}

impl Position {
    /// Open a position, fixing TP/SL from the fill price and the ATR at entry.
    ///
    /// TP is always on the favorable side of entry, SL on the adverse side:
    /// Buy: TP = entry + 1.2*ATR, SL = entry - 0.8*ATR; Sell is mirrored.
    pub fn open(
        side: OrderSide,
        entry_price: Price,
        quantity: Quantity,
        atr: Decimal,
    ) -> Option<Self> {
        let (tp, sl) = tp_sl_prices(side, entry_price.as_decimal(), atr)?;
        Some(Self {
            side,
            entry_price,
            quantity,
            take_profit: tp,
            stop_loss: sl,
            opened_at: Utc::now(),
        })
    }

    /// Unrealized PnL at a given mark price.
    pub fn unrealized_pnl(&self, mark: Price) -> Decimal {
        let entry = self.entry_price.as_decimal();
        let qty = self.quantity.as_decimal();
        match self.side {
            OrderSide::Buy => (mark.as_decimal() - entry) * qty,
            OrderSide::Sell => (entry - mark.as_decimal()) * qty,
        }
    }

    /// Realized profit for an exit at the given fill price.
    pub fn realized_profit(&self, exit_fill: Price) -> Decimal {
        self.unrealized_pnl(exit_fill)
    }
}

/// Compute TP/SL trigger prices for a side. Returns None when either trigger
/// would not be a positive price (degenerate ATR vs entry).
pub fn tp_sl_prices(side: OrderSide, entry: Decimal, atr: Decimal) -> Option<(Price, Price)> {
    let (tp, sl) = match side {
        OrderSide::Buy => (entry + atr * TP_ATR_MULT, entry - atr * SL_ATR_MULT),
        OrderSide::Sell => (entry - atr * TP_ATR_MULT, entry + atr * SL_ATR_MULT),
    };
    let tp = Price::new(tp.round_dp(PRICE_SCALE)).ok()?;
    let sl = Price::new(sl.round_dp(PRICE_SCALE)).ok()?;
    Some((tp, sl))
}

// =============================================================================
// Trade records
// =============================================================================

/// How a closed trade resolved.
///
/// `NoTp`/`NoSl` mark fail-safe closes: the entry filled but the protective
/// conditional order could not be placed, so the position was closed at
/// market immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeResult {
    Tp,
    Sl,
    NoTp,
    NoSl,
}

impl TradeResult {
    /// Only a take-profit exit counts as a win.
    pub fn is_win(&self) -> bool {
        matches!(self, TradeResult::Tp)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeResult::Tp => "TP",
            TradeResult::Sl => "SL",
            TradeResult::NoTp => "NO_TP",
            TradeResult::NoSl => "NO_SL",
        }
    }
}

/// One closed trade, kept in a bounded recent-trades log for display.
/// Not authoritative accounting; counters are updated separately and
/// atomically with each close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub side: OrderSide,
    pub entry_price: Price,
    pub exit_price: Price,
    pub result: TradeResult,
    pub profit: Decimal,
    pub closed_at: DateTime<Utc>,
}

// =============================================================================
// Tests
// =============================================================================
