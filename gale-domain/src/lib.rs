//! Gale Domain Layer
//!
//! Validated value objects and entities for the single-position
//! perpetual-futures engine. No I/O, no async.

#![warn(clippy::all)]

pub mod candle;
pub mod position;
pub mod value_objects;

pub use candle::Candle;
pub use position::{tp_sl_prices, Position, TradeRecord, TradeResult};
pub use value_objects::{DomainError, OrderSide, Price, Quantity, Side, Symbol};
