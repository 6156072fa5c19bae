// =============================================================================
// Error Taxonomy - Typed Transport and Data Failures
// =============================================================================
//
// Every upstream call resolves to one of these types before it reaches a
// controller. The API layer converts them to user-visible JSON; nothing
// below that layer panics on a bad upstream response.
// =============================================================================

use std::time::Duration;

use thiserror::Error;

/// A failed HTTP exchange: the request never completed cleanly.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The per-call deadline elapsed before a response arrived.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The server answered with a non-2xx status.
    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Connection-level failure (DNS, TLS, reset).
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be parsed as JSON.
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// A structurally unusable upstream payload.
#[derive(Debug, Error)]
pub enum DataError {
    /// A record field could not be converted to the expected type.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// The exchange reported an application-level error of its own.
    #[error("upstream error: {0}")]
    Upstream(String),
}

/// Either failure mode of a full fetch-and-normalize round trip.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Data(#[from] DataError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_the_budget() {
        let e = TransportError::Timeout(Duration::from_secs(30));
        assert!(e.to_string().contains("30"));
        assert!(matches!(e, TransportError::Timeout(_)));
    }

    #[test]
    fn status_error_carries_endpoint_and_body() {
        let e = TransportError::Status {
            endpoint: "https://example.com/api".to_string(),
            status: 503,
            body: "Service Unavailable".to_string(),
        };
        let msg = e.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("Service Unavailable"));
    }

    #[test]
    fn fetch_error_wraps_both_kinds_transparently() {
        let t: FetchError = TransportError::Network("refused".to_string()).into();
        assert!(t.to_string().contains("refused"));

        let d: FetchError = DataError::Upstream("EQuery:Unknown asset pair".to_string()).into();
        assert!(d.to_string().contains("EQuery:Unknown asset pair"));
    }
}
