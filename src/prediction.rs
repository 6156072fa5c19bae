// =============================================================================
// Prediction Client - Next-Day High Proxy for Per-Asset Model Services
// =============================================================================
//
// Each asset's model service has its own request and response contract; the
// AssetConfig carries the differences and this client stays generic. Every
// failure path collapses into PredictionResult::Failure with a message the
// dashboard shows as-is. Timeouts get their own wording: the free-tier model
// hosts sleep when idle and need one waking request before they answer.
// =============================================================================

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::assets::AssetConfig;
use crate::errors::TransportError;
use crate::http_client::HttpClient;

/// Message shown when a model host's cold start outlasts the timeout.
pub const WAKING_UP_MESSAGE: &str =
    "Prediction timed out - the model server is waking up, please try again";

/// Outcome of one predict action, serialized straight to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictionResult {
    /// The model answered with a numeric next-day high (USD).
    Success { value: f64 },
    /// Anything else: non-2xx, missing field, network failure, timeout.
    Failure { message: String },
}

impl PredictionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

pub struct PredictionClient {
    http: HttpClient,
}

impl PredictionClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Ask `asset`'s model service for a next-day high. Infallible by
    /// construction: every failure becomes a `Failure` message.
    #[instrument(skip(self, asset), name = "prediction::fetch")]
    pub async fn fetch(&self, asset: &AssetConfig) -> PredictionResult {
        let spec = &asset.prediction;
        let params = spec.request.query();

        let payload = match self.http.get_json(spec.endpoint, &params, spec.timeout).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(asset = asset.id, error = %e, "prediction request failed");
                return failure_for(&e);
            }
        };

        match parse_prediction(&payload, spec.response_field) {
            PredictionResult::Success { value } => {
                info!(asset = asset.id, value, "prediction received");
                PredictionResult::Success { value }
            }
            failure => {
                warn!(asset = asset.id, field = spec.response_field, "prediction payload unusable");
                failure
            }
        }
    }
}

/// Extract the model's numeric prediction from a JSON body.
fn parse_prediction(payload: &serde_json::Value, field: &str) -> PredictionResult {
    match payload.get(field).and_then(|v| v.as_f64()) {
        Some(value) => PredictionResult::Success { value },
        None => PredictionResult::Failure {
            message: format!("No prediction available (missing '{field}')"),
        },
    }
}

/// Map a transport failure onto the user-visible message policy.
fn failure_for(err: &TransportError) -> PredictionResult {
    let message = match err {
        TransportError::Timeout(_) => WAKING_UP_MESSAGE.to_string(),
        TransportError::Status { status, body, .. } => format!("API Error {status}: {body}"),
        other => format!("Prediction unavailable: {other}"),
    };
    PredictionResult::Failure { message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn numeric_field_maps_to_success() {
        let payload = json!({"predicted_next_day_high_usd": 63250.75});
        assert_eq!(
            parse_prediction(&payload, "predicted_next_day_high_usd"),
            PredictionResult::Success { value: 63250.75 }
        );
    }

    #[test]
    fn integer_valued_field_still_succeeds() {
        let payload = json!({"predicted_next_day_high": 185});
        assert_eq!(
            parse_prediction(&payload, "predicted_next_day_high"),
            PredictionResult::Success { value: 185.0 }
        );
    }

    #[test]
    fn missing_field_is_a_failure() {
        let payload = json!({"prediction": 63250.75});
        let result = parse_prediction(&payload, "predicted_next_day_high_usd");
        assert!(!result.is_success());
    }

    #[test]
    fn non_numeric_field_is_a_failure() {
        let payload = json!({"predicted_next_day_high_usd": "model offline"});
        let result = parse_prediction(&payload, "predicted_next_day_high_usd");
        assert!(!result.is_success());
    }

    #[test]
    fn timeout_maps_to_waking_up_message() {
        let result = failure_for(&TransportError::Timeout(Duration::from_secs(30)));
        match result {
            PredictionResult::Failure { message } => {
                assert!(message.contains("waking up"));
                assert!(message.contains("try again"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn http_status_maps_to_api_error_message() {
        let result = failure_for(&TransportError::Status {
            endpoint: "https://example.com/predict".to_string(),
            status: 500,
            body: "Internal Server Error".to_string(),
        });
        match result {
            PredictionResult::Failure { message } => {
                assert!(message.starts_with("API Error 500"));
                assert!(message.contains("Internal Server Error"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn results_serialize_with_a_status_tag() {
        let success = serde_json::to_value(PredictionResult::Success { value: 63250.75 })
            .expect("serializes");
        assert_eq!(success, json!({"status": "success", "value": 63250.75}));

        let failure = serde_json::to_value(PredictionResult::Failure {
            message: "API Error 500: down".to_string(),
        })
        .expect("serializes");
        assert_eq!(failure["status"], "failure");
        assert_eq!(failure["message"], "API Error 500: down");
    }
}
