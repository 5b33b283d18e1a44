//! BingX REST API Client for Perpetual Swap Trading
//!
//! Provides REST API integration for:
//! - Fetching OHLCV candles
//! - Querying balance and open positions
//! - Placing market and conditional (TP/SL) orders
//! - Authentication via HMAC SHA256 signatures
//!
//! # Authentication
//!
//! BingX uses API key + secret with HMAC SHA256 signatures.
//! All signed requests require:
//! - `X-BX-APIKEY` header
//! - `timestamp` query parameter (epoch milliseconds, appended last)
//! - `signature` query parameter (HMAC SHA256 hex of the query string,
//!   signed exactly as sent, parameter order preserved)

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;
use tokio::time::timeout;

use gale_domain::{Candle, OrderSide, Price, Quantity, Symbol};
use gale_exec::{ConditionalKind, ExchangePort, ExchangePosition, ExecError, OrderResult};

// =============================================================================
// Constants
// =============================================================================

/// BingX swap REST API base URL
const BINGX_API_URL: &str = "https://open-api.bingx.com";

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 10;

const KLINES_ENDPOINT: &str = "/openApi/swap/v2/quote/klines";
const BALANCE_ENDPOINT: &str = "/openApi/swap/v2/user/balance";
const POSITIONS_ENDPOINT: &str = "/openApi/swap/v2/user/positions";
const ORDER_ENDPOINT: &str = "/openApi/swap/v2/trade/order";

// =============================================================================
// BingX REST Client
// =============================================================================

/// BingX REST API client for perpetual swap trading.
pub struct BingxRestClient {
    /// HTTP client
    client: Client,
    /// API key
    api_key: String,
    /// API secret
    api_secret: String,
    /// Base URL (overridable for tests)
    base_url: String,
    /// Asset balances are reported in (e.g. "USDT")
    quote_asset: String,
}

impl BingxRestClient {
    /// Create a new BingX REST client.
    pub fn new(api_key: String, api_secret: String, quote_asset: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_secret,
            base_url: BINGX_API_URL.to_string(),
            quote_asset,
        }
    }

    /// Create a client pointed at a different host (test server).
    pub fn with_base_url(
        api_key: String,
        api_secret: String,
        quote_asset: String,
        base_url: String,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_secret,
            base_url,
            quote_asset,
        }
    }

    /// Build the signed query string for authenticated requests.
    ///
    /// BingX verifies the signature against the query string exactly as
    /// sent, so parameter order is preserved and the timestamp goes last.
    fn build_signed_query(&self, mut params: Vec<(&str, String)>) -> Result<String, ExecError> {
        let timestamp = Utc::now().timestamp_millis().to_string();
        params.push(("timestamp", timestamp));

        let query_string: String = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let signature = sign_query(&self.api_secret, &query_string)?;
        Ok(format!("{}&signature={}", query_string, signature))
    }

    /// Send a GET request to a public endpoint and unwrap the envelope.
    async fn get_public(
        &self,
        endpoint: &str,
        params: Vec<(&str, String)>,
    ) -> Result<Value, ExecError> {
        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        let url = format!("{}{}?{}", self.base_url, endpoint, query);
        self.send(self.client.get(&url)).await
    }

    /// Send a GET request to a signed endpoint and unwrap the envelope.
    async fn get_signed(
        &self,
        endpoint: &str,
        params: Vec<(&str, String)>,
    ) -> Result<Value, ExecError> {
        let query = self.build_signed_query(params)?;
        let url = format!("{}{}?{}", self.base_url, endpoint, query);
        self.send(self.client.get(&url).header("X-BX-APIKEY", &self.api_key))
            .await
    }

    /// Send a POST request to a signed endpoint and unwrap the envelope.
    async fn post_signed(
        &self,
        endpoint: &str,
        params: Vec<(&str, String)>,
    ) -> Result<Value, ExecError> {
        let query = self.build_signed_query(params)?;
        let url = format!("{}{}?{}", self.base_url, endpoint, query);
        self.send(self.client.post(&url).header("X-BX-APIKEY", &self.api_key))
            .await
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, ExecError> {
        let response = timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS), request.send())
            .await
            .map_err(|_| ExecError::Timeout("BingX request".to_string()))?
            .map_err(|e| ExecError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExecError::Parse(e.to_string()))?;

        if !status.is_success() {
            return Err(ExecError::RequestFailed(format!("HTTP {}: {}", status, body)));
        }
        parse_envelope(&body)
    }
}

// =============================================================================
// Wire parsing
// =============================================================================

/// Every BingX response wraps its payload in `{code, msg, data}`;
/// `code == 0` is success.
#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Value,
}

fn parse_envelope(body: &str) -> Result<Value, ExecError> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| ExecError::Parse(e.to_string()))?;
    if envelope.code != 0 {
        return Err(ExecError::Api {
            code: envelope.code,
            msg: envelope.msg,
        });
    }
    Ok(envelope.data)
}

fn sign_query(secret: &str, query: &str) -> Result<String, ExecError> {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ExecError::Signature(format!("HMAC error: {}", e)))?;
    mac.update(query.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Numeric fields arrive as either JSON numbers or strings.
fn value_to_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn value_to_decimal(v: &Value) -> Option<Decimal> {
    match v {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s).ok(),
        _ => None,
    }
}

/// Parse the klines payload: an array of `[time, open, high, low, close,
/// volume]` rows. Output is sorted oldest first.
fn parse_klines(data: &Value) -> Result<Vec<Candle>, ExecError> {
    let rows = data
        .as_array()
        .ok_or_else(|| ExecError::Parse("klines data is not an array".to_string()))?;

    let mut candles = Vec::with_capacity(rows.len());
    for row in rows {
        let fields = row
            .as_array()
            .ok_or_else(|| ExecError::Parse("kline row is not an array".to_string()))?;
        if fields.len() < 6 {
            return Err(ExecError::Parse(format!(
                "kline row has {} fields, expected 6",
                fields.len()
            )));
        }
        let parse = |i: usize| {
            value_to_f64(&fields[i])
                .ok_or_else(|| ExecError::Parse(format!("kline field {} not numeric", i)))
        };
        candles.push(Candle {
            timestamp: parse(0)? as i64,
            open: parse(1)?,
            high: parse(2)?,
            low: parse(3)?,
            close: parse(4)?,
            volume: parse(5)?,
        });
    }
    candles.sort_by_key(|c| c.timestamp);
    Ok(candles)
}

/// Pull the available balance for an asset out of the balance payload.
/// The `balance` field is a single object or a list of per-asset objects
/// depending on account type.
fn parse_available_balance(data: &Value, asset: &str) -> Result<Decimal, ExecError> {
    let balance = &data["balance"];
    let entry = match balance {
        Value::Array(entries) => entries
            .iter()
            .find(|e| e["asset"].as_str() == Some(asset)),
        Value::Object(_) => Some(balance),
        _ => None,
    };
    let entry =
        entry.ok_or_else(|| ExecError::Parse(format!("no balance entry for {}", asset)))?;
    value_to_decimal(&entry["availableBalance"])
        .ok_or_else(|| ExecError::Parse("availableBalance not numeric".to_string()))
}

/// Find the non-flat position for a symbol, if any. The sign of
/// `positionAmt` carries the side.
fn parse_open_position(data: &Value) -> Option<ExchangePosition> {
    let positions = data.as_array()?;
    for p in positions {
        let amt = value_to_decimal(&p["positionAmt"])?;
        if amt.is_zero() {
            continue;
        }
        let entry_price = value_to_decimal(&p["entryPrice"])?;
        let side = if amt > Decimal::ZERO {
            OrderSide::Buy
        } else {
            OrderSide::Sell
        };
        return Some(ExchangePosition {
            side,
            entry_price,
            quantity: amt.abs(),
        });
    }
    None
}

// =============================================================================
// ExchangePort implementation
// =============================================================================

#[async_trait]
impl ExchangePort for BingxRestClient {
    async fn get_candles(
        &self,
        symbol: &Symbol,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, ExecError> {
        let data = self
            .get_public(
                KLINES_ENDPOINT,
                vec![
                    ("symbol", symbol.as_pair()),
                    ("interval", interval.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        parse_klines(&data)
    }

    async fn get_balance(&self) -> Result<Decimal, ExecError> {
        let data = self.get_signed(BALANCE_ENDPOINT, vec![]).await?;
        parse_available_balance(&data, &self.quote_asset)
    }

    async fn get_open_position(
        &self,
        symbol: &Symbol,
    ) -> Result<Option<ExchangePosition>, ExecError> {
        let data = self
            .get_signed(POSITIONS_ENDPOINT, vec![("symbol", symbol.as_pair())])
            .await?;
        Ok(parse_open_position(&data))
    }

    async fn place_market_order(
        &self,
        symbol: &Symbol,
        side: OrderSide,
        quantity: Quantity,
    ) -> Result<OrderResult, ExecError> {
        let data = self
            .post_signed(
                ORDER_ENDPOINT,
                vec![
                    ("symbol", symbol.as_pair()),
                    ("side", side.as_str().to_string()),
                    ("positionSide", "BOTH".to_string()),
                    ("type", "MARKET".to_string()),
                    ("quantity", quantity.as_decimal().to_string()),
                ],
            )
            .await?;

        // the fill may be nested under "order" or flat on data
        let order = if data["order"].is_object() {
            &data["order"]
        } else {
            &data
        };
        let avg_price = value_to_decimal(&order["avgPrice"])
            .filter(|p| !p.is_zero())
            .ok_or_else(|| ExecError::Parse("market order fill has no avgPrice".to_string()))?;
        let exchange_order_id = order["orderId"]
            .as_i64()
            .map(|id| id.to_string())
            .or_else(|| order["orderId"].as_str().map(str::to_string))
            .unwrap_or_default();

        tracing::info!(%side, %quantity, %avg_price, "Market order filled");

        Ok(OrderResult {
            exchange_order_id,
            fill_price: Price::new(avg_price)?,
            filled_quantity: quantity,
            filled_at: Utc::now(),
        })
    }

    async fn place_conditional_order(
        &self,
        symbol: &Symbol,
        kind: ConditionalKind,
        side: OrderSide,
        quantity: Quantity,
        trigger_price: Price,
    ) -> Result<(), ExecError> {
        self.post_signed(
            ORDER_ENDPOINT,
            vec![
                ("symbol", symbol.as_pair()),
                ("side", side.as_str().to_string()),
                ("positionSide", "BOTH".to_string()),
                ("type", kind.as_str().to_string()),
                ("quantity", quantity.as_decimal().to_string()),
                ("stopPrice", format!("{:.5}", trigger_price.as_decimal())),
                ("workingType", "MARK_PRICE".to_string()),
            ],
        )
        .await?;
        tracing::info!(?kind, %side, %trigger_price, "Conditional order placed");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
