//! Gale Daemon
//!
//! Signal scoring and position lifecycle engine for a single
//! perpetual-futures instrument.
//!
//! # Usage
//!
//! ```bash
//! # Live trading (requires BingX credentials)
//! BINGX_API_KEY=... BINGX_API_SECRET=... cargo run -p galed
//!
//! # Dry run against the in-memory stub
//! GALE_STUB_EXCHANGE=true cargo run -p galed
//! ```
//!
//! # Environment Variables
//!
//! - `BINGX_API_KEY` / `BINGX_API_SECRET`: exchange credentials
//! - `GALE_SYMBOL`: contract pair (default: DOGE-USDT)
//! - `GALE_INTERVAL`: candle interval (default: 15m)
//! - `GALE_LEVERAGE`: leverage multiplier (default: 10)
//! - `GALE_TRADE_PORTION`: equity fraction per trade (default: 0.60)
//! - `GALE_COOLDOWN_SECS`: post-close cooldown (default: 600)
//! - `GALE_API_HOST` / `GALE_API_PORT`: display server bind address
//! - `GALE_STUB_EXCHANGE`: use the in-memory stub (default: false)

use std::sync::Arc;

use galed::{Config, Daemon};
use gale_connectors::BingxRestClient;
use gale_domain::Symbol;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("galed=info".parse()?))
        .init();

    // Load configuration
    let config = Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        symbol = %config.exchange.symbol,
        api_host = %config.api.host,
        api_port = config.api.port,
        "Gale Daemon"
    );

    if config.exchange.use_stub {
        Daemon::new_stub(config)?.run().await?;
    } else {
        let quote = Symbol::from_pair(&config.exchange.symbol)?
            .quote()
            .to_string();
        let exchange = Arc::new(BingxRestClient::new(
            config.exchange.api_key.clone(),
            config.exchange.api_secret.clone(),
            quote,
        ));
        Daemon::new(config, exchange)?.run().await?;
    }

    Ok(())
}
