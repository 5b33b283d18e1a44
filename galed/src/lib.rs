//! Gale Daemon Library
//!
//! Runtime orchestrator for the Gale signal engine.
//!
//! # Architecture
//!
//! ```text
//! Daemon ──ticks──> Trader ──> IndicatorPipeline ──> RegimeFilter + Scorer
//!    │                 │                                     │
//!    │                 └──> ExchangePort (BingX / stub) <── RiskSizer
//!    │
//!    └── Display server (read-only EngineState snapshots)
//! ```
//!
//! # Components
//!
//! - **Daemon**: tick loop and display server lifecycle
//! - **Trader**: one decision cycle (monitor or evaluate entry)
//! - **EngineState**: single-writer position/bookkeeping state
//! - **API**: read-only HTTP display
//! - **Config**: environment-based configuration

#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod daemon;
pub mod error;
pub mod state;
pub mod trader;

// Re-exports for convenience
pub use config::{ApiConfig, Config, ExchangeConfig, TradingConfig};
pub use daemon::Daemon;
pub use error::{DaemonError, DaemonResult};
pub use state::{EngineState, MarketSnapshot, StatusSnapshot};
pub use trader::{TickOutcome, Trader};
