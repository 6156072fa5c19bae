// =============================================================================
// Kraken REST API Client - Public OHLC Endpoint
// =============================================================================
//
// Only the public market data endpoint is used; nothing is signed. Requests
// ask for daily candles (interval=1440) with a `since` lower bound computed
// from the selected day span.
// =============================================================================

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, instrument};

use crate::errors::FetchError;
use crate::http_client::HttpClient;
use crate::kraken::normalize::normalize_ohlc;
use crate::market_data::CandleSeries;

/// Kraken's daily-candle interval, in minutes.
pub const DAILY_INTERVAL_MIN: u32 = 1440;

/// Hard timeout for historical OHLC calls.
pub const HISTORY_TIMEOUT: Duration = Duration::from_secs(10);

const SECONDS_PER_DAY: i64 = 86_400;

/// Client for Kraken's public market data API.
#[derive(Clone)]
pub struct KrakenClient {
    http: HttpClient,
    base_url: String,
}

impl KrakenClient {
    /// `base_url` comes from the runtime config so tests and mirrors can
    /// point the client elsewhere.
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// GET /0/public/OHLC - daily candles for `pair` covering the last
    /// `days` days. Returns a normalized ascending-sorted series; an empty
    /// series means Kraken had no records for the window.
    #[instrument(skip(self), name = "kraken::get_ohlc")]
    pub async fn get_ohlc(&self, pair: &str, days: u32) -> Result<CandleSeries, FetchError> {
        let since = Utc::now().timestamp() - i64::from(days) * SECONDS_PER_DAY;
        let url = format!("{}/0/public/OHLC", self.base_url);
        let params = [
            ("pair", pair.to_string()),
            ("interval", DAILY_INTERVAL_MIN.to_string()),
            ("since", since.to_string()),
        ];

        let payload = self.http.get_json(&url, &params, HISTORY_TIMEOUT).await?;
        let series = normalize_ohlc(&payload)?;

        debug!(pair, days, count = series.len(), "OHLC series fetched");
        Ok(series)
    }
}
