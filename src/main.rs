// =============================================================================
// Candela Dash - Main Entry Point
// =============================================================================
//
// Read-only market dashboard service: Kraken OHLC candlestick charts, a
// CoinGecko price ticker, and per-asset next-day-high prediction proxies.
// Everything is fetched on demand and memoized; there are no background
// trading or refresh loops.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod assets;
mod cache;
mod chart;
mod coingecko;
mod controller;
mod errors;
mod http_client;
mod kraken;
mod market_data;
mod prediction;
mod runtime_config;

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::assets::ASSETS;
use crate::runtime_config::RuntimeConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        Candela Crypto Dashboard - Starting Up            ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let mut config = RuntimeConfig::load("runtime_config.json").unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    // Override bind address from env if available.
    if let Ok(addr) = std::env::var("DASH_BIND_ADDR") {
        let addr = addr.trim().to_string();
        if !addr.is_empty() {
            config.bind_addr = addr;
        }
    }

    let symbols: Vec<&str> = ASSETS.iter().map(|a| a.symbol).collect();
    info!(assets = ?symbols, bind_addr = %config.bind_addr, "Configured dashboard assets");

    // ── 2. Build shared state ────────────────────────────────────────────
    let state = Arc::new(AppState::new(config));

    // ── 3. Start the API server ──────────────────────────────────────────
    let api_state = state.clone();
    let bind_addr = state.runtime_config.read().bind_addr.clone();

    tokio::spawn(async move {
        let app = api::rest::router(api_state);
        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .expect("Failed to bind API server");
        info!(addr = %bind_addr, "API server listening");
        axum::serve(listener, app)
            .await
            .expect("API server failed");
    });

    info!("All subsystems running. Press Ctrl+C to stop.");

    // ── 4. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received, stopping gracefully");

    // Materializes the config file with defaults on first run.
    if let Err(e) = state.runtime_config.read().save("runtime_config.json") {
        error!(error = %e, "Failed to save runtime config on shutdown");
    }

    info!("Candela dashboard shut down complete.");
    Ok(())
}
