// =============================================================================
// Asset Registry - Static Per-Asset Configuration
// =============================================================================
//
// The four supported assets differ only in trading pair, icon, and the
// contract of their prediction endpoint. Everything a controller needs to
// serve one asset lives in its AssetConfig; the rest of the pipeline stays
// generic. Adding an asset means adding an entry here, nothing else.
// =============================================================================

use std::time::Duration;

/// Day ranges the dashboard offers for historical charts.
pub const DAY_RANGES: [u32; 3] = [7, 30, 60];

/// Day range used when the client does not specify one.
pub const DEFAULT_DAY_RANGE: u32 = 30;

/// How an asset's prediction endpoint expects to be called.
#[derive(Debug, Clone, Copy)]
pub enum PredictionRequest {
    /// Plain GET with no query parameters.
    Bare,
    /// GET with a fixed set of named query parameters.
    FixedParams(&'static [(&'static str, &'static str)]),
}

impl PredictionRequest {
    /// Materialize the query pairs for the HTTP adapter.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Bare => Vec::new(),
            Self::FixedParams(params) => params
                .iter()
                .map(|(name, value)| (*name, (*value).to_string()))
                .collect(),
        }
    }
}

/// Where and how an asset's model service is asked for a next-day high.
#[derive(Debug, Clone)]
pub struct PredictionSpec {
    /// Full endpoint URL.
    pub endpoint: &'static str,
    /// Request shape (bare or fixed parameters).
    pub request: PredictionRequest,
    /// JSON field holding the predicted price. The model services do not
    /// agree on a name (`predicted_next_day_high_usd` vs
    /// `predicted_next_day_high`), so each asset carries its own.
    pub response_field: &'static str,
    /// Hard timeout. The model hosts run on free tiers that sleep when
    /// idle, hence the wide spread across assets.
    pub timeout: Duration,
}

/// Static descriptor for one supported asset.
#[derive(Debug, Clone)]
pub struct AssetConfig {
    /// Stable identifier used in URLs and as the CoinGecko id.
    pub id: &'static str,
    /// Human-readable name ("Bitcoin").
    pub display_name: &'static str,
    /// Ticker symbol ("BTC").
    pub symbol: &'static str,
    /// Kraken trading pair as requested. The pair key Kraken echoes back may
    /// differ; the normalizer resolves that.
    pub kraken_pair: &'static str,
    /// Dashboard icon.
    pub icon_url: &'static str,
    pub prediction: PredictionSpec,
}

/// Fixed feature vector the Solana model expects. These are the example
/// values its service was published with; the model ignores live data.
const SOLANA_FEATURES: &[(&str, &str)] = &[
    ("open", "180.0"),
    ("high", "185.0"),
    ("low", "178.0"),
    ("close", "183.0"),
    ("volume", "5000000.0"),
    ("marketCap", "85000000000.0"),
    ("price_diff", "7.0"),
    ("daily_range", "7.0"),
    ("SMA_7", "181.0"),
];

/// All supported assets, in dashboard display order.
pub static ASSETS: [AssetConfig; 4] = [
    AssetConfig {
        id: "bitcoin",
        display_name: "Bitcoin",
        symbol: "BTC",
        kraken_pair: "XBTUSD",
        icon_url: "https://raw.githubusercontent.com/spothq/cryptocurrency-icons/master/128/color/btc.png",
        prediction: PredictionSpec {
            endpoint: "https://at3-bitcoin-latest-2.onrender.com/predict/bitcoin",
            request: PredictionRequest::Bare,
            response_field: "predicted_next_day_high_usd",
            timeout: Duration::from_secs(30),
        },
    },
    AssetConfig {
        id: "ethereum",
        display_name: "Ethereum",
        symbol: "ETH",
        kraken_pair: "ETHUSD",
        icon_url: "https://raw.githubusercontent.com/spothq/cryptocurrency-icons/master/128/color/eth.png",
        prediction: PredictionSpec {
            endpoint: "https://at3-ethereum-latest.onrender.com/predict/ethereum",
            request: PredictionRequest::Bare,
            response_field: "predicted_next_day_high_usd",
            timeout: Duration::from_secs(30),
        },
    },
    AssetConfig {
        id: "ripple",
        display_name: "XRP",
        symbol: "XRP",
        kraken_pair: "XRPUSD",
        icon_url: "https://raw.githubusercontent.com/spothq/cryptocurrency-icons/master/128/color/xrp.png",
        prediction: PredictionSpec {
            endpoint: "https://xrp-fastapi.onrender.com/predict",
            request: PredictionRequest::Bare,
            response_field: "predicted_next_day_high",
            timeout: Duration::from_secs(60),
        },
    },
    AssetConfig {
        id: "solana",
        display_name: "Solana",
        symbol: "SOL",
        kraken_pair: "SOLUSD",
        icon_url: "https://raw.githubusercontent.com/spothq/cryptocurrency-icons/master/128/color/sol.png",
        prediction: PredictionSpec {
            endpoint: "https://solana-fastapi.onrender.com/predict",
            request: PredictionRequest::FixedParams(SOLANA_FEATURES),
            response_field: "predicted_next_day_high",
            timeout: Duration::from_secs(120),
        },
    },
];

/// True when `days` is one of the selectable chart ranges.
pub fn valid_day_range(days: u32) -> bool {
    DAY_RANGES.contains(&days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_assets_in_display_order() {
        let symbols: Vec<&str> = ASSETS.iter().map(|a| a.symbol).collect();
        assert_eq!(symbols, vec!["BTC", "ETH", "XRP", "SOL"]);
    }

    #[test]
    fn ids_and_pairs_line_up() {
        let ids: Vec<&str> = ASSETS.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["bitcoin", "ethereum", "ripple", "solana"]);

        let pairs: Vec<&str> = ASSETS.iter().map(|a| a.kraken_pair).collect();
        assert_eq!(pairs, vec!["XBTUSD", "ETHUSD", "XRPUSD", "SOLUSD"]);

        // XRP keeps its CoinGecko id but is displayed by symbol.
        assert_eq!(ASSETS[2].display_name, "XRP");
    }

    #[test]
    fn bare_requests_have_no_query() {
        let eth = &ASSETS[1];
        assert!(eth.prediction.request.query().is_empty());
    }

    #[test]
    fn solana_request_carries_its_full_feature_vector() {
        let sol = &ASSETS[3];
        let query = sol.prediction.request.query();
        assert_eq!(query.len(), 9);
        assert!(query.contains(&("open", "180.0".to_string())));
        assert!(query.contains(&("marketCap", "85000000000.0".to_string())));
        assert!(query.contains(&("SMA_7", "181.0".to_string())));
    }

    #[test]
    fn prediction_timeouts_cover_cold_starts() {
        let timeout_secs: Vec<u64> = ASSETS
            .iter()
            .map(|a| a.prediction.timeout.as_secs())
            .collect();
        assert_eq!(timeout_secs, vec![30, 30, 60, 120]);
    }

    #[test]
    fn day_range_validation() {
        for days in DAY_RANGES {
            assert!(valid_day_range(days));
        }
        assert!(!valid_day_range(0));
        assert!(!valid_day_range(14));
        assert!(!valid_day_range(365));
        assert!(valid_day_range(DEFAULT_DAY_RANGE));
    }
}
