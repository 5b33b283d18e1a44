//! Gale Execution Layer
//!
//! Ports define the interface the engine uses to talk to an exchange;
//! adapters implement them for specific venues (BingX, stub).
//!
//! # Components
//!
//! - **Ports**: the `ExchangePort` trait and its wire-agnostic types
//! - **Stub**: in-memory exchange for tests (immediate fills, injectable
//!   failures, recorded calls)

#![warn(clippy::all)]

pub mod error;
pub mod ports;
pub mod stub;

pub use error::{ExecError, ExecResult};
pub use ports::{ConditionalKind, ExchangePort, ExchangePosition, OrderResult};
pub use stub::StubExchange;
