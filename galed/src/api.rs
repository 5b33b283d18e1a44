//! HTTP display layer.
//!
//! Read-only endpoints over the engine state:
//! - `GET /` human dashboard
//! - `GET /health` liveness probe
//! - `GET /status` JSON snapshot

use std::sync::Arc;

use axum::{
    extract::State,
    response::Html,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::state::{EngineState, StatusSnapshot};

/// Shared state for API handlers.
pub type ApiState = Arc<RwLock<EngineState>>;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Build the display router.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(dashboard_handler))
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .with_state(state)
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn status_handler(State(state): State<ApiState>) -> Json<StatusSnapshot> {
    Json(state.read().await.snapshot())
}

async fn dashboard_handler(State(state): State<ApiState>) -> Html<String> {
    let snapshot = state.read().await.snapshot();
    Html(render_dashboard(&snapshot))
}

fn render_dashboard(s: &StatusSnapshot) -> String {
    let (price, ema, rsi, adx, updated) = match &s.market {
        Some(m) => (
            format!("{:.5}", m.price),
            m.ema_long.map_or("-".to_string(), |v| format!("{:.5}", v)),
            m.rsi.map_or("-".to_string(), |v| format!("{:.1}", v)),
            m.adx.map_or("-".to_string(), |v| format!("{:.1}", v)),
            m.updated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ),
        None => (
            "-".to_string(),
            "-".to_string(),
            "-".to_string(),
            "-".to_string(),
            "never".to_string(),
        ),
    };

    let position = match &s.position {
        Some(p) => format!(
            "{} {} @ {} (TP {} / SL {}) PnL {}",
            p.side, p.quantity, p.entry_price, p.take_profit, p.stop_loss, s.unrealized_pnl
        ),
        None => "none".to_string(),
    };

    let trades: String = s
        .recent_trades
        .iter()
        .map(|t| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                t.side,
                t.entry_price,
                t.exit_price,
                t.result.as_str(),
                t.profit
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html><head><title>Gale</title>
<style>
body {{ font-family: monospace; background: #101418; color: #d8dee9; margin: 2em; }}
h1 {{ color: #88c0d0; }}
table {{ border-collapse: collapse; margin-top: 1em; }}
td, th {{ border: 1px solid #3b4252; padding: 4px 10px; }}
.metric {{ margin: 0.2em 0; }}
</style></head><body>
<h1>Gale</h1>
<div class="metric">Price: {price} | EMA200: {ema} | RSI: {rsi} | ADX: {adx}</div>
<div class="metric">Position: {position}</div>
<div class="metric">Trades: {total} (won {won} / lost {lost}) | Compound profit: {profit}</div>
<div class="metric">Updated: {updated}</div>
<table><tr><th>Side</th><th>Entry</th><th>Exit</th><th>Result</th><th>Profit</th></tr>{trades}</table>
</body></html>"#,
        price = price,
        ema = ema,
        rsi = rsi,
        adx = adx,
        position = position,
        total = s.total_trades,
        won = s.winning_trades,
        lost = s.losing_trades,
        profit = s.compound_profit,
        updated = updated,
        trades = trades,
    )
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::state::MarketSnapshot;

    #[test]
    fn test_dashboard_renders_empty_state() {
        let state = EngineState::new();
        let html = render_dashboard(&state.snapshot());
        assert!(html.contains("Position: none"));
        assert!(html.contains("Trades: 0"));
    }

    #[test]
    fn test_dashboard_renders_market_snapshot() {
        let mut state = EngineState::new();
        state.update_market(MarketSnapshot {
            price: 0.10123,
            ema_long: Some(0.1),
            rsi: Some(61.2),
            adx: Some(28.0),
            updated_at: Utc::now(),
        });
        let html = render_dashboard(&state.snapshot());
        assert!(html.contains("0.10123"));
        assert!(html.contains("61.2"));
    }
}
