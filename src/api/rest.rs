// =============================================================================
// REST API Endpoints - Axum 0.7
// =============================================================================
//
// All JSON endpoints live under `/api/v1/`; the dashboard page itself is
// served at `/`. Every endpoint is public and read-only from the service's
// point of view (predict proxies a read of a remote model), so there is no
// authentication layer.
//
// CORS is configured permissively so the page can also be developed against
// a separately served frontend.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::app_state::AppState;
use crate::assets::{valid_day_range, AssetConfig, ASSETS, DAY_RANGES, DEFAULT_DAY_RANGE};
use crate::coingecko::{format_ticker, snapshot_cache_key, FALLBACK_TICKER};
use crate::controller::ChartOutcome;
use crate::prediction::PredictionResult;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full router: dashboard page, JSON API, CORS middleware and
/// shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ── Dashboard page ──────────────────────────────────────────
        .route("/", get(crate::api::pages::index))
        // ── JSON API ────────────────────────────────────────────────
        .route("/api/v1/health", get(health))
        .route("/api/v1/assets", get(list_assets))
        .route("/api/v1/assets/:id/chart", get(asset_chart))
        .route("/api/v1/assets/:id/predict", post(asset_predict))
        .route("/api/v1/ticker", get(ticker))
        .route("/api/v1/state", get(full_state))
        // ── Middleware & State ──────────────────────────────────────
        .layer(cors)
        .with_state(state)
}

/// Standard error tuple for 4xx/5xx responses.
type ApiError = (StatusCode, Json<serde_json::Value>);

fn unknown_asset(id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": format!("Unknown asset: '{id}'") })),
    )
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    state_version: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        state_version: state.current_state_version(),
        server_time: chrono::Utc::now().timestamp_millis(),
    };
    Json(resp)
}

// =============================================================================
// Asset registry
// =============================================================================

#[derive(Serialize)]
struct AssetSummary {
    id: &'static str,
    display_name: &'static str,
    symbol: &'static str,
    kraken_pair: &'static str,
    icon_url: &'static str,
    day_ranges: [u32; 3],
    default_day_range: u32,
}

impl From<&AssetConfig> for AssetSummary {
    fn from(asset: &AssetConfig) -> Self {
        Self {
            id: asset.id,
            display_name: asset.display_name,
            symbol: asset.symbol,
            kraken_pair: asset.kraken_pair,
            icon_url: asset.icon_url,
            day_ranges: DAY_RANGES,
            default_day_range: DEFAULT_DAY_RANGE,
        }
    }
}

async fn list_assets() -> impl IntoResponse {
    let assets: Vec<AssetSummary> = ASSETS.iter().map(AssetSummary::from).collect();
    Json(assets)
}

// =============================================================================
// Chart
// =============================================================================

#[derive(Deserialize)]
struct ChartQuery {
    days: Option<u32>,
}

/// GET /api/v1/assets/:id/chart?days=N
///
/// 200 with a Plotly spec (or an explicit no-data body), 400 for an invalid
/// day range, 404 for an unknown asset, 502 when the upstream fetch failed.
async fn asset_chart(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let days = query.days.unwrap_or(DEFAULT_DAY_RANGE);
    if !valid_day_range(days) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": format!("Invalid day range: {days}. Use one of {DAY_RANGES:?}."),
            })),
        ));
    }

    let controller = state.controller(&id).ok_or_else(|| unknown_asset(&id))?;

    match controller.chart(days).await {
        ChartOutcome::Ready(spec) => Ok(Json(serde_json::json!({ "chart": spec }))),
        ChartOutcome::Empty => Ok(Json(serde_json::json!({
            "chart": null,
            "message": "No chart data available for this range",
        }))),
        ChartOutcome::Failed(message) => {
            state.push_error(message.clone());
            Err((
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": message })),
            ))
        }
    }
}

// =============================================================================
// Predict
// =============================================================================

/// POST /api/v1/assets/:id/predict
///
/// Always 200 for a known asset; the body's `status` tag distinguishes a
/// numeric prediction from a user-visible failure message.
async fn asset_predict(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PredictionResult>, ApiError> {
    let controller = state.controller(&id).ok_or_else(|| unknown_asset(&id))?;

    info!(asset = %id, "prediction requested");
    let result = controller.predict().await;
    info!(asset = %id, success = result.is_success(), "prediction completed");
    state.record_prediction(controller.asset().id, result.clone());

    Ok(Json(result))
}

// =============================================================================
// Ticker
// =============================================================================

#[derive(Serialize)]
struct TickerResponse {
    text: String,
    /// False when the text is the static fallback line.
    live: bool,
}

async fn ticker(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let fetched = state
        .price_cache
        .get_or_fetch(&snapshot_cache_key(), || state.coingecko.get_prices())
        .await;

    let resp = match fetched {
        Ok(board) => TickerResponse {
            text: format_ticker(&board),
            live: true,
        },
        Err(e) => {
            state.push_error(format!("ticker snapshot failed: {e}"));
            TickerResponse {
                text: FALLBACK_TICKER.to_string(),
                live: false,
            }
        }
    };
    Json(resp)
}

// =============================================================================
// Full state snapshot
// =============================================================================

async fn full_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.build_snapshot();
    Json(snapshot)
}
