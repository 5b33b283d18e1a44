//! Daemon: main runtime orchestrator.
//!
//! Ties together the trader (decision loop), the engine state, and the
//! display server.
//!
//! # Lifecycle
//!
//! 1. Load configuration
//! 2. Start the display server
//! 3. Tick loop: one trader cycle per interval, interval depending on
//!    whether a position is open
//! 4. Graceful shutdown on SIGINT
//!
//! A failed tick is logged and retried after the idle interval; it never
//! crashes the process.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing::{error, info};

use gale_exec::{ExchangePort, StubExchange};

use crate::api::create_router;
use crate::config::Config;
use crate::error::{DaemonError, DaemonResult};
use crate::state::EngineState;
use crate::trader::{TickOutcome, Trader};

// =============================================================================
// Daemon
// =============================================================================

/// The main Gale daemon.
pub struct Daemon<E: ExchangePort + 'static> {
    config: Config,
    trader: Trader<E>,
    state: Arc<RwLock<EngineState>>,
}

impl Daemon<StubExchange> {
    /// Create a daemon on the in-memory stub exchange (tests, dry runs).
    pub fn new_stub(config: Config) -> DaemonResult<Self> {
        let exchange = Arc::new(StubExchange::new(dec!(0.1), dec!(1000)));
        Self::new(config, exchange)
    }
}

impl<E: ExchangePort + 'static> Daemon<E> {
    /// Create a daemon on the given exchange adapter.
    pub fn new(config: Config, exchange: Arc<E>) -> DaemonResult<Self> {
        let state = Arc::new(RwLock::new(EngineState::new()));
        let trader = Trader::new(exchange, state.clone(), config.clone())?;
        Ok(Self {
            config,
            trader,
            state,
        })
    }

    /// Run until SIGINT.
    pub async fn run(self) -> DaemonResult<()> {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            symbol = %self.config.exchange.symbol,
            interval = %self.config.exchange.interval,
            stub = self.config.exchange.use_stub,
            "Starting Gale daemon"
        );

        let api_addr = self.start_api_server().await?;
        info!(%api_addr, "Display server started");

        // first tick runs immediately; afterwards the outcome picks the pace
        let mut delay = Duration::ZERO;
        loop {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    delay = match self.trader.tick().await {
                        Ok(TickOutcome::Idle) => {
                            Duration::from_secs(self.config.trading.poll_secs)
                        }
                        Ok(TickOutcome::PositionOpen) => {
                            Duration::from_secs(self.config.trading.open_poll_secs)
                        }
                        Ok(TickOutcome::Closed) => {
                            Duration::from_secs(self.config.trading.settle_secs)
                        }
                        Err(e) => {
                            error!(error = %e, "Tick failed; backing off");
                            Duration::from_secs(self.config.trading.poll_secs)
                        }
                    };
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        let state = self.state.read().await;
        info!(
            total_trades = state.total_trades(),
            compound_profit = %state.compound_profit(),
            "Shutdown complete"
        );
        Ok(())
    }

    /// Start the display server on its own task.
    async fn start_api_server(&self) -> DaemonResult<SocketAddr> {
        let router = create_router(self.state.clone());
        let addr = format!("{}:{}", self.config.api.host, self.config.api.port);

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| DaemonError::Config(format!("Failed to bind to {}: {}", addr, e)))?;

        let local_addr = listener
            .local_addr()
            .map_err(|e| DaemonError::Config(format!("Failed to get local address: {}", e)))?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                error!(error = %e, "Display server error");
            }
        });

        Ok(local_addr)
    }
}

// =============================================================================
// Tests
// =============================================================================
