// =============================================================================
// CoinGecko Client - Live Price Snapshot for the Dashboard Ticker
// =============================================================================
//
// One batched call covers all four assets. The ticker is decoration, not
// data: when the snapshot cannot be fetched the dashboard falls back to a
// fixed sample line rather than showing an empty strip.
// =============================================================================

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::assets::ASSETS;
use crate::errors::TransportError;
use crate::http_client::HttpClient;

/// Hard timeout for price snapshot calls.
pub const PRICE_TIMEOUT: Duration = Duration::from_secs(5);

/// Shown when no snapshot is available; the ticker never goes blank.
pub const FALLBACK_TICKER: &str = "BTC/USD 67,450 \u{25b2}1.25% ETH/USD 3,120 \u{25b2}0.84% XRP/USD 0.512 \u{25bc}0.34% SOL/USD 102.4 \u{25b2}2.02%";

/// One asset's entry in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub usd: f64,
    #[serde(default)]
    pub usd_24h_change: f64,
}

/// Asset id to quote, exactly as CoinGecko shapes it.
pub type PriceBoard = HashMap<String, PriceQuote>;

pub struct CoinGeckoClient {
    http: HttpClient,
    base_url: String,
}

impl CoinGeckoClient {
    /// `base_url` comes from the runtime config so tests and mirrors can
    /// point the client elsewhere.
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// GET /api/v3/simple/price for the dashboard assets, with 24h change.
    #[instrument(skip(self), name = "coingecko::get_prices")]
    pub async fn get_prices(&self) -> Result<PriceBoard, TransportError> {
        let url = format!("{}/api/v3/simple/price", self.base_url);
        let ids: Vec<&str> = ASSETS.iter().map(|a| a.id).collect();
        let params = [
            ("ids", ids.join(",")),
            ("vs_currencies", "usd".to_string()),
            ("include_24hr_change", "true".to_string()),
        ];

        let payload = self.http.get_json(&url, &params, PRICE_TIMEOUT).await?;
        let board: PriceBoard =
            serde_json::from_value(payload).map_err(|e| TransportError::Decode(e.to_string()))?;

        debug!(assets = board.len(), "price snapshot fetched");
        Ok(board)
    }
}

/// Cache key for the snapshot: one entry shared by every ticker request.
pub fn snapshot_cache_key() -> String {
    let ids: Vec<&str> = ASSETS.iter().map(|a| a.id).collect();
    format!("simple-price:{}:usd", ids.join(","))
}

/// Render the one-line ticker text: `BTC/USD 67,450.00 ▲1.25%  ...` in
/// registry order. Assets missing from the snapshot are skipped rather than
/// shown with placeholder numbers.
pub fn format_ticker(board: &PriceBoard) -> String {
    let mut parts = Vec::with_capacity(ASSETS.len());
    for asset in ASSETS.iter() {
        let Some(quote) = board.get(asset.id) else {
            continue;
        };
        let arrow = if quote.usd_24h_change >= 0.0 {
            "\u{25b2}"
        } else {
            "\u{25bc}"
        };
        parts.push(format!(
            "{}/USD {} {}{:.2}%",
            asset.symbol,
            format_price(quote.usd),
            arrow,
            quote.usd_24h_change.abs()
        ));
    }
    parts.join("  ")
}

/// Format a price like `67,450.00`: thousands separators, two decimals.
fn format_price(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let units = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, ch) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped}.{frac:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> PriceBoard {
        let mut board = PriceBoard::new();
        board.insert(
            "bitcoin".to_string(),
            PriceQuote {
                usd: 67_450.0,
                usd_24h_change: 1.25,
            },
        );
        board.insert(
            "ethereum".to_string(),
            PriceQuote {
                usd: 3_120.0,
                usd_24h_change: 0.84,
            },
        );
        board.insert(
            "ripple".to_string(),
            PriceQuote {
                usd: 0.512,
                usd_24h_change: -0.34,
            },
        );
        board.insert(
            "solana".to_string(),
            PriceQuote {
                usd: 102.4,
                usd_24h_change: 2.02,
            },
        );
        board
    }

    #[test]
    fn ticker_lists_assets_in_registry_order() {
        let text = format_ticker(&board());
        let btc = text.find("BTC/USD").expect("BTC present");
        let eth = text.find("ETH/USD").expect("ETH present");
        let xrp = text.find("XRP/USD").expect("XRP present");
        let sol = text.find("SOL/USD").expect("SOL present");
        assert!(btc < eth && eth < xrp && xrp < sol);
    }

    #[test]
    fn ticker_formats_price_and_change() {
        let text = format_ticker(&board());
        assert!(text.contains("BTC/USD 67,450.00 \u{25b2}1.25%"));
        assert!(text.contains("ETH/USD 3,120.00 \u{25b2}0.84%"));
        assert!(text.contains("SOL/USD 102.40 \u{25b2}2.02%"));
    }

    #[test]
    fn negative_change_shows_down_arrow_and_absolute_value() {
        let text = format_ticker(&board());
        assert!(text.contains("XRP/USD 0.51 \u{25bc}0.34%"));
        assert!(!text.contains("-0.34%"));
    }

    #[test]
    fn missing_assets_are_skipped() {
        let mut partial = board();
        partial.remove("ripple");
        let text = format_ticker(&partial);
        assert!(!text.contains("XRP"));
        assert!(text.contains("SOL/USD"));
    }

    #[test]
    fn empty_board_formats_to_empty_text() {
        assert_eq!(format_ticker(&PriceBoard::new()), "");
    }

    #[test]
    fn format_price_groups_thousands() {
        assert_eq!(format_price(67_450.0), "67,450.00");
        assert_eq!(format_price(3_120.5), "3,120.50");
        assert_eq!(format_price(1_234_567.891), "1,234,567.89");
        assert_eq!(format_price(0.512), "0.51");
        assert_eq!(format_price(999.994), "999.99");
        assert_eq!(format_price(999.996), "1,000.00");
    }

    #[test]
    fn board_deserializes_from_raw_payload() {
        let raw = r#"{
            "bitcoin": {"usd": 67450.0, "usd_24h_change": 1.25},
            "ripple": {"usd": 0.512}
        }"#;
        let board: PriceBoard = serde_json::from_str(raw).expect("deserializes");
        assert_eq!(board["bitcoin"].usd, 67_450.0);
        // Missing change field defaults to flat.
        assert_eq!(board["ripple"].usd_24h_change, 0.0);
    }

    #[test]
    fn fallback_line_covers_all_four_assets() {
        for symbol in ["BTC/USD", "ETH/USD", "XRP/USD", "SOL/USD"] {
            assert!(FALLBACK_TICKER.contains(symbol));
        }
    }
}
