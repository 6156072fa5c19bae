// =============================================================================
// HTTP Client Adapter - Single-Attempt JSON GETs With Hard Timeouts
// =============================================================================
//
// Every outbound request in the service goes through this adapter. Policy:
// one attempt per call (the user re-clicking is the retry mechanism), a hard
// timeout chosen by the caller per call, and a typed TransportError instead
// of a raw reqwest error. Caching happens a layer above, never here.
// =============================================================================

use std::time::Duration;

use tracing::{debug, warn};

use crate::errors::TransportError;

/// Longest error-body excerpt carried inside a `TransportError::Status`.
const MAX_ERROR_BODY: usize = 200;

/// Thin wrapper around a shared `reqwest::Client` that returns typed errors.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Create an adapter with its own connection pool. No client-wide timeout
    /// is set; each call passes its own deadline to [`HttpClient::get_json`].
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .build()
                .expect("failed to build reqwest client"),
        }
    }

    /// GET `url` with `params` as the query string and parse the body as JSON.
    ///
    /// Exactly one attempt: timeouts, connection failures, non-2xx statuses
    /// and unparseable bodies all come back as a [`TransportError`].
    pub async fn get_json(
        &self,
        url: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<serde_json::Value, TransportError> {
        debug!(url, timeout_s = timeout.as_secs(), "outbound GET");

        let resp = self
            .client
            .get(url)
            .query(params)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| classify(e, timeout))?;

        if !status.is_success() {
            warn!(url, status = status.as_u16(), "upstream returned error status");
            return Err(TransportError::Status {
                endpoint: url.to_string(),
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }

        serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a reqwest failure onto the transport taxonomy. The timeout check must
/// come first: reqwest reports an elapsed deadline as a generic request
/// error with a timeout source.
fn classify(e: reqwest::Error, timeout: Duration) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(timeout)
    } else {
        TransportError::Network(e.to_string())
    }
}

/// Cap error bodies so a large HTML error page never floods the log.
fn truncate(body: &str, max: usize) -> String {
    if body.len() <= max {
        return body.to_string();
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_bodies_pass_through_untruncated() {
        assert_eq!(truncate("Not Found", 200), "Not Found");
    }

    #[test]
    fn long_bodies_are_capped() {
        let body = "x".repeat(500);
        let out = truncate(&body, 200);
        assert_eq!(out.len(), 203); // 200 chars plus "..."
        assert!(out.ends_with("..."));
    }

    #[test]
    fn truncation_respects_utf8_boundaries() {
        // Each arrow is three bytes; a cut at byte 4 would split the second one.
        let body = "▲▲▲▲";
        let out = truncate(body, 4);
        assert_eq!(out, "▲...");
    }
}
