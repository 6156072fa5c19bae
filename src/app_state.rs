// =============================================================================
// Central Application State
// =============================================================================
//
// The single source of truth for the dashboard service. Handlers hold an
// Arc<AppState> and reach everything through it: the two result caches, the
// upstream clients, one controller per asset, the last predict outcome per
// asset, and a capped log of recent errors.
//
// Thread safety:
//   - Atomic counter for lock-free version tracking.
//   - parking_lot::RwLock for all mutable shared collections.
//   - Guards are never held across await points.
// =============================================================================

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;

use crate::assets::{ASSETS, DAY_RANGES, DEFAULT_DAY_RANGE};
use crate::cache::{ResultCache, HISTORY_TTL, PRICE_TTL};
use crate::coingecko::{CoinGeckoClient, PriceBoard};
use crate::controller::AssetController;
use crate::http_client::HttpClient;
use crate::kraken::KrakenClient;
use crate::market_data::CandleSeries;
use crate::prediction::{PredictionClient, PredictionResult};
use crate::runtime_config::RuntimeConfig;

// =============================================================================
// Records
// =============================================================================

/// A recorded error event for the dashboard error log.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    /// Human-readable error message.
    pub message: String,
    /// ISO 8601 timestamp.
    pub at: String,
}

/// Last prediction outcome for one asset, kept for the state snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRecord {
    pub result: PredictionResult,
    /// ISO 8601 timestamp.
    pub at: String,
}

// =============================================================================
// AppState
// =============================================================================

/// Maximum number of recent errors to retain.
const MAX_RECENT_ERRORS: usize = 50;

/// Central application state shared across all request handlers via
/// `Arc<AppState>`.
pub struct AppState {
    // ── Version tracking ────────────────────────────────────────────────
    /// Monotonically increasing version counter, incremented on every
    /// recorded event. Lets a poller detect changes cheaply.
    pub state_version: AtomicU64,

    // ── Configuration ───────────────────────────────────────────────────
    pub runtime_config: Arc<RwLock<RuntimeConfig>>,

    // ── Caches ──────────────────────────────────────────────────────────
    pub price_cache: Arc<ResultCache<PriceBoard>>,
    pub history_cache: Arc<ResultCache<CandleSeries>>,

    // ── Upstream clients & controllers ──────────────────────────────────
    pub coingecko: CoinGeckoClient,
    controllers: HashMap<&'static str, AssetController>,

    // ── Audit ───────────────────────────────────────────────────────────
    last_predictions: RwLock<HashMap<&'static str, PredictionRecord>>,
    recent_errors: RwLock<Vec<ErrorRecord>>,

    // ── Timing ──────────────────────────────────────────────────────────
    /// Instant when the service was started. Used for uptime calculations.
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Construct a new `AppState` from the given runtime configuration.
    ///
    /// One HTTP connection pool is shared by every upstream client. The
    /// returned value is typically wrapped in `Arc` immediately.
    pub fn new(config: RuntimeConfig) -> Self {
        let http = HttpClient::new();
        let kraken = Arc::new(KrakenClient::new(
            http.clone(),
            config.kraken_base_url.clone(),
        ));
        let predictor = Arc::new(PredictionClient::new(http.clone()));
        let coingecko = CoinGeckoClient::new(http, config.coingecko_base_url.clone());

        let price_cache = Arc::new(ResultCache::new("prices", PRICE_TTL));
        let history_cache = Arc::new(ResultCache::new("history", HISTORY_TTL));

        // Pre-create one controller per registered asset.
        let mut controllers = HashMap::new();
        for asset in ASSETS.iter() {
            controllers.insert(
                asset.id,
                AssetController::new(
                    asset,
                    kraken.clone(),
                    predictor.clone(),
                    history_cache.clone(),
                ),
            );
        }

        Self {
            state_version: AtomicU64::new(1),
            runtime_config: Arc::new(RwLock::new(config)),
            price_cache,
            history_cache,
            coingecko,
            controllers,
            last_predictions: RwLock::new(HashMap::new()),
            recent_errors: RwLock::new(Vec::new()),
            start_time: std::time::Instant::now(),
        }
    }

    // ── Controllers ─────────────────────────────────────────────────────

    /// Controller for `asset_id`, or `None` for an unregistered asset.
    pub fn controller(&self, asset_id: &str) -> Option<&AssetController> {
        self.controllers.get(asset_id)
    }

    // ── Version Management ──────────────────────────────────────────────

    /// Atomically increment the state version. Call this after every
    /// recorded event so pollers can detect fresh data.
    pub fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::SeqCst)
    }

    /// Read the current state version without modifying it.
    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    // ── Error Logging ───────────────────────────────────────────────────

    /// Record an error message. The ring buffer is capped at
    /// [`MAX_RECENT_ERRORS`]; oldest entries are evicted when the limit is
    /// reached.
    pub fn push_error(&self, msg: String) {
        let record = ErrorRecord {
            message: msg,
            at: Utc::now().to_rfc3339(),
        };

        let mut errors = self.recent_errors.write();
        errors.push(record);
        while errors.len() > MAX_RECENT_ERRORS {
            errors.remove(0);
        }
        drop(errors);

        self.increment_version();
    }

    // ── Prediction Audit ────────────────────────────────────────────────

    /// Record the outcome of a predict action for the state snapshot.
    pub fn record_prediction(&self, asset_id: &'static str, result: PredictionResult) {
        let record = PredictionRecord {
            result,
            at: Utc::now().to_rfc3339(),
        };
        self.last_predictions.write().insert(asset_id, record);
        self.increment_version();
    }

    // ── Snapshot Builder ────────────────────────────────────────────────

    /// Build a complete, serialisable snapshot of the service state.
    ///
    /// This is the payload of the REST `GET /api/v1/state` endpoint.
    pub fn build_snapshot(&self) -> StateSnapshot {
        let predictions = self.last_predictions.read();
        let assets = ASSETS
            .iter()
            .map(|asset| AssetSnapshot {
                id: asset.id,
                display_name: asset.display_name,
                symbol: asset.symbol,
                kraken_pair: asset.kraken_pair,
                last_prediction: predictions.get(asset.id).cloned(),
            })
            .collect();
        drop(predictions);

        let config = self.runtime_config.read();
        StateSnapshot {
            state_version: self.current_state_version(),
            server_time: Utc::now().timestamp_millis(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            assets,
            cache: CacheSnapshot {
                price_entries: self.price_cache.len(),
                history_entries: self.history_cache.len(),
            },
            recent_errors: self.recent_errors.read().clone(),
            runtime_config: RuntimeConfigSummary {
                bind_addr: config.bind_addr.clone(),
                day_ranges: DAY_RANGES.to_vec(),
                default_day_range: DEFAULT_DAY_RANGE,
            },
        }
    }
}

// =============================================================================
// Serialisable snapshot types
// =============================================================================

/// Full service state snapshot sent to the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub state_version: u64,
    pub server_time: i64,
    pub uptime_seconds: u64,
    pub assets: Vec<AssetSnapshot>,
    pub cache: CacheSnapshot,
    pub recent_errors: Vec<ErrorRecord>,
    pub runtime_config: RuntimeConfigSummary,
}

/// Per-asset status line in the snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct AssetSnapshot {
    pub id: &'static str,
    pub display_name: &'static str,
    pub symbol: &'static str,
    pub kraken_pair: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_prediction: Option<PredictionRecord>,
}

/// Live entry counts for both caches.
#[derive(Debug, Clone, Serialize)]
pub struct CacheSnapshot {
    pub price_entries: usize,
    pub history_entries: usize,
}

/// Summary of runtime config for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeConfigSummary {
    pub bind_addr: String,
    pub day_ranges: Vec<u32>,
    pub default_day_range: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(RuntimeConfig::default())
    }

    #[test]
    fn every_asset_gets_a_controller() {
        let state = state();
        for asset in ASSETS.iter() {
            assert!(state.controller(asset.id).is_some());
        }
        assert!(state.controller("dogecoin").is_none());
    }

    #[test]
    fn recorded_events_bump_the_version() {
        let state = state();
        let before = state.current_state_version();

        state.push_error("ticker fetch failed".to_string());
        state.record_prediction("bitcoin", PredictionResult::Success { value: 63_250.75 });

        assert_eq!(state.current_state_version(), before + 2);
    }

    #[test]
    fn error_log_is_capped() {
        let state = state();
        for i in 0..(MAX_RECENT_ERRORS + 10) {
            state.push_error(format!("error {i}"));
        }

        let snapshot = state.build_snapshot();
        assert_eq!(snapshot.recent_errors.len(), MAX_RECENT_ERRORS);
        // Oldest entries were dropped first.
        assert_eq!(snapshot.recent_errors[0].message, "error 10");
    }

    #[test]
    fn snapshot_carries_last_prediction_per_asset() {
        let state = state();
        state.record_prediction(
            "solana",
            PredictionResult::Failure {
                message: "API Error 500: down".to_string(),
            },
        );

        let snapshot = state.build_snapshot();
        let sol = snapshot
            .assets
            .iter()
            .find(|a| a.id == "solana")
            .expect("solana present");
        assert!(sol.last_prediction.is_some());

        let btc = snapshot
            .assets
            .iter()
            .find(|a| a.id == "bitcoin")
            .expect("bitcoin present");
        assert!(btc.last_prediction.is_none());
    }

    #[test]
    fn snapshot_reports_day_range_policy() {
        let snapshot = state().build_snapshot();
        assert_eq!(snapshot.runtime_config.day_ranges, vec![7, 30, 60]);
        assert_eq!(snapshot.runtime_config.default_day_range, 30);
    }
}
