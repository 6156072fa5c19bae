// Kraken market data module
//
// client    - REST client for the public OHLC endpoint
// normalize - raw payload to CandleSeries conversion

pub mod client;
pub mod normalize;

pub use client::{KrakenClient, DAILY_INTERVAL_MIN, HISTORY_TIMEOUT};
pub use normalize::normalize_ohlc;
