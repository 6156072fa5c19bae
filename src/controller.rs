// =============================================================================
// Asset Page Controller - One Generic Composition for Every Asset
// =============================================================================
//
// Wires cache, Kraken client, normalizer and renderer for the chart path,
// and the prediction client for the predict path. The four dashboard pages
// are this one controller instantiated over different AssetConfigs; no
// per-asset code exists below the registry.
// =============================================================================

use std::sync::Arc;

use tracing::warn;

use crate::assets::AssetConfig;
use crate::cache::ResultCache;
use crate::chart::{self, ChartSpec};
use crate::errors::FetchError;
use crate::kraken::{KrakenClient, DAILY_INTERVAL_MIN};
use crate::market_data::CandleSeries;
use crate::prediction::{PredictionClient, PredictionResult};

/// Result of one chart request. `Empty` is the valid no-data state, distinct
/// from `Failed`, which carries a message for the dashboard's error box.
#[derive(Debug, Clone)]
pub enum ChartOutcome {
    Ready(ChartSpec),
    Empty,
    Failed(String),
}

/// Composes the data pipeline for a single asset.
pub struct AssetController {
    asset: &'static AssetConfig,
    kraken: Arc<KrakenClient>,
    predictor: Arc<PredictionClient>,
    history_cache: Arc<ResultCache<CandleSeries>>,
}

impl AssetController {
    pub fn new(
        asset: &'static AssetConfig,
        kraken: Arc<KrakenClient>,
        predictor: Arc<PredictionClient>,
        history_cache: Arc<ResultCache<CandleSeries>>,
    ) -> Self {
        Self {
            asset,
            kraken,
            predictor,
            history_cache,
        }
    }

    pub fn asset(&self) -> &'static AssetConfig {
        self.asset
    }

    /// Chart path: cache, then Kraken, then normalizer, then renderer.
    ///
    /// `days` outside the selectable ranges is rejected by the API layer
    /// before it gets here; this method trusts its input.
    pub async fn chart(&self, days: u32) -> ChartOutcome {
        let key = history_cache_key(self.asset.kraken_pair, days);
        let fetched = self
            .history_cache
            .get_or_fetch(&key, || self.kraken.get_ohlc(self.asset.kraken_pair, days))
            .await;

        match fetched {
            Ok(series) => match chart::render(&series, self.asset.display_name, days) {
                Some(spec) => ChartOutcome::Ready(spec),
                None => ChartOutcome::Empty,
            },
            Err(e) => {
                warn!(asset = self.asset.id, days, error = %e, "chart data load failed");
                ChartOutcome::Failed(user_message(&e, self.asset.display_name))
            }
        }
    }

    /// Predict path: one-shot call to the asset's model service, uncached.
    pub async fn predict(&self) -> PredictionResult {
        self.predictor.fetch(self.asset).await
    }
}

/// Cache key: operation, pair, interval and day span. The requested pair
/// goes in verbatim, so ranges never collide across assets.
fn history_cache_key(pair: &str, days: u32) -> String {
    format!("ohlc:{pair}:{DAILY_INTERVAL_MIN}:{days}")
}

/// Convert a pipeline failure into the dashboard's error-box message.
fn user_message(err: &FetchError, display_name: &str) -> String {
    format!("Unable to load {display_name} data: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::HttpClient;
    use crate::market_data::Candle;
    use chrono::DateTime;

    /// Controller whose Kraken base URL points at a closed local port: any
    /// path that slips past the cache fails fast instead of hitting the
    /// network, which keeps these tests deterministic.
    fn offline_controller(cache: Arc<ResultCache<CandleSeries>>) -> AssetController {
        let http = HttpClient::new();
        let kraken = Arc::new(KrakenClient::new(http.clone(), "http://127.0.0.1:9"));
        let predictor = Arc::new(PredictionClient::new(http));
        AssetController::new(&crate::assets::ASSETS[0], kraken, predictor, cache)
    }

    fn one_candle() -> CandleSeries {
        vec![Candle::new(
            DateTime::from_timestamp(1_700_000_000, 0).expect("valid ts"),
            60_000.0,
            61_000.0,
            59_500.0,
            60_500.0,
        )]
    }

    #[test]
    fn cache_keys_separate_pairs_and_ranges() {
        let a = history_cache_key("XBTUSD", 7);
        let b = history_cache_key("XBTUSD", 30);
        let c = history_cache_key("SOLUSD", 7);
        assert_eq!(a, "ohlc:XBTUSD:1440:7");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn failure_message_names_the_asset() {
        let err: FetchError =
            crate::errors::DataError::Upstream("EService:Unavailable".to_string()).into();
        let msg = user_message(&err, "Bitcoin");
        assert!(msg.starts_with("Unable to load Bitcoin data"));
        assert!(msg.contains("EService:Unavailable"));
    }

    #[tokio::test]
    async fn cached_series_is_served_without_fetching() {
        let cache = Arc::new(ResultCache::new("history", std::time::Duration::from_secs(300)));
        cache.insert("ohlc:XBTUSD:1440:30", one_candle());

        let controller = offline_controller(cache);
        // A fetch would fail against the closed port; Ready proves the
        // cache satisfied the request.
        match controller.chart(30).await {
            ChartOutcome::Ready(spec) => {
                assert_eq!(spec.layout.title, "Bitcoin 30-Day Candlestick Chart");
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cached_empty_series_is_the_empty_outcome() {
        let cache = Arc::new(ResultCache::new("history", std::time::Duration::from_secs(300)));
        cache.insert("ohlc:XBTUSD:1440:30", Vec::new());

        let controller = offline_controller(cache);
        assert!(matches!(controller.chart(30).await, ChartOutcome::Empty));
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_failed_outcome() {
        let cache = Arc::new(ResultCache::new("history", std::time::Duration::from_secs(300)));
        let controller = offline_controller(cache);

        match controller.chart(30).await {
            ChartOutcome::Failed(message) => {
                assert!(message.starts_with("Unable to load Bitcoin data"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
