// =============================================================================
// OHLC Normalizer - Kraken Payload to CandleSeries
// =============================================================================
//
// Kraken nests OHLC records under a pair key it chooses itself: request
// "XBTUSD" and the result map may come back keyed "XXBTZUSD". Resolution is
// therefore tolerant by contract: the first key of `result` that is not
// "last" is taken as the record array, whatever it is called. Numeric fields
// arrive as strings or numbers interchangeably and are parsed either way.
// =============================================================================

use chrono::DateTime;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::DataError;
use crate::market_data::{Candle, CandleSeries};

/// Convert a raw Kraken OHLC payload into an ascending-sorted candle series.
///
/// A missing `result` or an empty record array is a valid empty series, not
/// an error. A non-empty `error` array or an unparseable record is.
pub fn normalize_ohlc(payload: &Value) -> Result<CandleSeries, DataError> {
    // Kraken reports application-level failures in a top-level `error` array
    // alongside a 200 status.
    if let Some(errors) = payload.get("error").and_then(Value::as_array) {
        if !errors.is_empty() {
            let joined = errors
                .iter()
                .map(|e| e.as_str().unwrap_or("unknown error").to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(DataError::Upstream(joined));
        }
    }

    let result = match payload.get("result").and_then(Value::as_object) {
        Some(obj) => obj,
        None => return Ok(Vec::new()),
    };

    let records = match resolve_pair_key(result) {
        Some((key, records)) => {
            debug!(pair_key = key, "resolved OHLC pair key");
            records
        }
        None => return Ok(Vec::new()),
    };

    let rows = records
        .as_array()
        .ok_or_else(|| DataError::MalformedRecord("pair entry is not an array".to_string()))?;

    let mut series = Vec::with_capacity(rows.len());
    for row in rows {
        series.push(parse_record(row)?);
    }

    // Kraken sends oldest-first already, but the renderer depends on the
    // ordering, so it is established here regardless of input order.
    series.sort_by_key(|c| c.timestamp);
    Ok(series)
}

/// Tolerant pair-key resolution: the first key of `result` that is not
/// `"last"` (Kraken's pagination cursor). Should the map ever carry several
/// pair keys, the first in iteration order wins.
fn resolve_pair_key(result: &serde_json::Map<String, Value>) -> Option<(&str, &Value)> {
    let mut candidates = result.iter().filter(|(k, _)| *k != "last");
    let first = candidates.next()?;
    if candidates.next().is_some() {
        warn!(
            pair_key = first.0.as_str(),
            "multiple pair keys in OHLC result, using the first"
        );
    }
    Some((first.0.as_str(), first.1))
}

/// Parse one fixed-order OHLC row: `[time, open, high, low, close, ...]`.
/// Trailing fields (vwap, volume, trade count) are ignored.
fn parse_record(row: &Value) -> Result<Candle, DataError> {
    let arr = row
        .as_array()
        .ok_or_else(|| DataError::MalformedRecord("OHLC row is not an array".to_string()))?;

    if arr.len() < 5 {
        return Err(DataError::MalformedRecord(format!(
            "OHLC row has {} fields, expected at least 5",
            arr.len()
        )));
    }

    let secs = arr[0]
        .as_i64()
        .or_else(|| arr[0].as_f64().map(|f| f as i64))
        .ok_or_else(|| {
            DataError::MalformedRecord(format!("timestamp is not numeric: {}", arr[0]))
        })?;
    let timestamp = DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| DataError::MalformedRecord(format!("timestamp out of range: {secs}")))?;

    let open = parse_price(&arr[1], "open")?;
    let high = parse_price(&arr[2], "high")?;
    let low = parse_price(&arr[3], "low")?;
    let close = parse_price(&arr[4], "close")?;

    Ok(Candle::new(timestamp, open, high, low, close))
}

/// Kraken sends prices as JSON strings; plain numbers are accepted too.
fn parse_price(val: &Value, name: &str) -> Result<f64, DataError> {
    match val {
        Value::String(s) => s.parse::<f64>().map_err(|_| {
            DataError::MalformedRecord(format!("field {name} is not numeric: {s:?}"))
        }),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| DataError::MalformedRecord(format!("field {name} is out of f64 range"))),
        other => Err(DataError::MalformedRecord(format!(
            "field {name} has unexpected type: {other}"
        ))),
    }
}
