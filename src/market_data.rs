// =============================================================================
// Market Data Types - Normalized OHLC Candles
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One daily bucket of price activity, in USD.
///
/// Prices are carried exactly as the exchange reported them; the normalizer
/// parses faithfully and does not enforce `low <= open, close <= high`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Start of the bucket (UTC).
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn new(timestamp: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }

    /// The x-axis category label the candlestick renderer uses ("Nov 14").
    pub fn date_label(&self) -> String {
        self.timestamp.format("%b %d").to_string()
    }
}

/// Ordered candle sequence, ascending by timestamp. Establishing the order is
/// the normalizer's job; consumers may rely on it.
pub type CandleSeries = Vec<Candle>;
