//! Daemon configuration.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::error::{DaemonError, DaemonResult};
use gale_strategy::StrategyParams;
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

/// Candles requested per fetch; a little above the pipeline minimum so
/// the slowest indicator is always warm on the last row.
pub const KLINE_LIMIT: usize = 220;

// =============================================================================
// Configuration
// =============================================================================

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Exchange connection configuration
    pub exchange: ExchangeConfig,

    /// Position lifecycle configuration
    pub trading: TradingConfig,

    /// Signal thresholds
    pub strategy: StrategyParams,
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
}

/// Exchange connection configuration.
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    /// BingX API key
    pub api_key: String,
    /// BingX API secret
    pub api_secret: String,
    /// Contract pair (e.g. DOGE-USDT)
    pub symbol: String,
    /// Candle interval (e.g. 15m)
    pub interval: String,
    /// Use the in-memory stub instead of the live venue
    pub use_stub: bool,
}

/// Position lifecycle configuration.
#[derive(Debug, Clone)]
pub struct TradingConfig {
    /// Leverage multiplier
    pub leverage: u32,
    /// Fraction of equity committed per trade
    pub trade_portion: Decimal,
    /// Seconds that must elapse after a close before the next entry
    pub cooldown_secs: u64,
    /// Absolute price tolerance when testing TP/SL triggers
    pub tolerance: Decimal,
    /// ATR floor used for TP/SL distances
    pub min_atr: Decimal,
    /// Minimum TP distance as a percent of entry price
    pub min_tp_percent: Decimal,
    /// Idle poll interval in seconds
    pub poll_secs: u64,
    /// Poll interval while a position is open
    pub open_poll_secs: u64,
    /// Pause after a close to absorb exchange settlement latency
    pub settle_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> DaemonResult<Self> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        Ok(Self {
            api: Self::load_api_config()?,
            exchange: Self::load_exchange_config()?,
            trading: Self::load_trading_config()?,
            strategy: Self::load_strategy_params()?,
        })
    }

    /// Create test configuration.
    pub fn test() -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
            },
            exchange: ExchangeConfig {
                api_key: String::new(),
                api_secret: String::new(),
                symbol: "DOGE-USDT".to_string(),
                interval: "15m".to_string(),
                use_stub: true,
            },
            trading: TradingConfig::default(),
            strategy: StrategyParams::default(),
        }
    }

    fn load_api_config() -> DaemonResult<ApiConfig> {
        let host = env::var("GALE_API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port_str = env::var("GALE_API_PORT").unwrap_or_else(|_| "8080".to_string());

        let port = port_str
            .parse::<u16>()
            .map_err(|_| DaemonError::Config(format!("Invalid GALE_API_PORT: {}", port_str)))?;

        Ok(ApiConfig { host, port })
    }

    fn load_exchange_config() -> DaemonResult<ExchangeConfig> {
        let use_stub = env::var("GALE_STUB_EXCHANGE")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let api_key = env::var("BINGX_API_KEY").unwrap_or_default();
        let api_secret = env::var("BINGX_API_SECRET").unwrap_or_default();
        if !use_stub && (api_key.is_empty() || api_secret.is_empty()) {
            return Err(DaemonError::Config(
                "BINGX_API_KEY and BINGX_API_SECRET are required for live trading".to_string(),
            ));
        }

        Ok(ExchangeConfig {
            api_key,
            api_secret,
            symbol: env::var("GALE_SYMBOL").unwrap_or_else(|_| "DOGE-USDT".to_string()),
            interval: env::var("GALE_INTERVAL").unwrap_or_else(|_| "15m".to_string()),
            use_stub,
        })
    }

    fn load_trading_config() -> DaemonResult<TradingConfig> {
        let defaults = TradingConfig::default();
        Ok(TradingConfig {
            leverage: Self::load_u64_env("GALE_LEVERAGE", defaults.leverage as u64)? as u32,
            trade_portion: Self::load_decimal_env("GALE_TRADE_PORTION", defaults.trade_portion)?,
            cooldown_secs: Self::load_u64_env("GALE_COOLDOWN_SECS", defaults.cooldown_secs)?,
            tolerance: Self::load_decimal_env("GALE_TOLERANCE", defaults.tolerance)?,
            min_atr: Self::load_decimal_env("GALE_MIN_ATR", defaults.min_atr)?,
            min_tp_percent: Self::load_decimal_env(
                "GALE_MIN_TP_PERCENT",
                defaults.min_tp_percent,
            )?,
            poll_secs: Self::load_u64_env("GALE_POLL_SECS", defaults.poll_secs)?,
            open_poll_secs: Self::load_u64_env("GALE_OPEN_POLL_SECS", defaults.open_poll_secs)?,
            settle_secs: Self::load_u64_env("GALE_SETTLE_SECS", defaults.settle_secs)?,
        })
    }

    fn load_strategy_params() -> DaemonResult<StrategyParams> {
        let defaults = StrategyParams::default();
        Ok(StrategyParams {
            noise_pct: Self::load_f64_env("GALE_NOISE_PCT", defaults.noise_pct)?,
            adx_min: Self::load_f64_env("GALE_ADX_MIN", defaults.adx_min)?,
            rsi_upper: Self::load_f64_env("GALE_RSI_UPPER", defaults.rsi_upper)?,
            rsi_lower: Self::load_f64_env("GALE_RSI_LOWER", defaults.rsi_lower)?,
            min_atr_pct: Self::load_f64_env("GALE_MIN_ATR_PCT", defaults.min_atr_pct)?,
            max_atr_pct: Self::load_f64_env("GALE_MAX_ATR_PCT", defaults.max_atr_pct)?,
            vol_boost: Self::load_f64_env("GALE_VOL_BOOST", defaults.vol_boost)?,
            min_score: Self::load_u64_env("GALE_MIN_SCORE", defaults.min_score as u64)? as u8,
            min_range_pct: Self::load_f64_env("GALE_MIN_RANGE_PCT", defaults.min_range_pct)?,
            spike_atr_mult: Self::load_f64_env("GALE_SPIKE_ATR_MULT", defaults.spike_atr_mult)?,
            entry_adx_floor: Self::load_f64_env(
                "GALE_ENTRY_ADX_FLOOR",
                defaults.entry_adx_floor,
            )?,
        })
    }

    fn load_decimal_env(key: &str, default: Decimal) -> DaemonResult<Decimal> {
        match env::var(key) {
            Ok(val) => Decimal::from_str(&val)
                .map_err(|_| DaemonError::Config(format!("Invalid {} value: {}", key, val))),
            Err(_) => Ok(default),
        }
    }

    fn load_f64_env(key: &str, default: f64) -> DaemonResult<f64> {
        match env::var(key) {
            Ok(val) => val
                .parse::<f64>()
                .map_err(|_| DaemonError::Config(format!("Invalid {} value: {}", key, val))),
            Err(_) => Ok(default),
        }
    }

    fn load_u64_env(key: &str, default: u64) -> DaemonResult<u64> {
        match env::var(key) {
            Ok(val) => val
                .parse::<u64>()
                .map_err(|_| DaemonError::Config(format!("Invalid {} value: {}", key, val))),
            Err(_) => Ok(default),
        }
    }
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            leverage: 10,
            trade_portion: Decimal::new(60, 2),  // 60%
            cooldown_secs: 600,
            tolerance: Decimal::new(5, 4),       // 0.0005
            min_atr: Decimal::new(1, 3),         // 0.001
            min_tp_percent: Decimal::new(75, 2), // 0.75%
            poll_secs: 60,
            open_poll_secs: 15,
            settle_secs: 10,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_test_config() {
        let config = Config::test();

        assert_eq!(config.api.port, 0);
        assert!(config.exchange.use_stub);
        assert_eq!(config.exchange.symbol, "DOGE-USDT");
    }

    #[test]
    fn test_trading_defaults() {
        let trading = TradingConfig::default();

        assert_eq!(trading.leverage, 10);
        assert_eq!(trading.trade_portion, dec!(0.60));
        assert_eq!(trading.cooldown_secs, 600);
        assert_eq!(trading.tolerance, dec!(0.0005));
        assert_eq!(trading.min_tp_percent, dec!(0.75));
    }
}
