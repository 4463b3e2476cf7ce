//! SDK error types.
//!
//! [`SdkError`] covers transport-level failures. Identity-level failures
//! are reported as [`Fault`](scholarlink_models::Fault)s; [`SdkError`]
//! converts into one so callers only ever see the fault taxonomy.

use scholarlink_models::{Fault, FaultKind};

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// NATS transport error.
    #[error("NATS error: {0}")]
    Nats(String),

    /// No reply arrived within the configured timeout.
    #[error("no reply within {0:?}")]
    Timeout(std::time::Duration),

    /// The reply channel was dropped before a reply arrived.
    #[error("reply channel closed")]
    Closed,

    /// HTTP request failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization / deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<async_nats::ConnectError> for SdkError {
    fn from(e: async_nats::ConnectError) -> Self {
        SdkError::Nats(e.to_string())
    }
}

impl From<async_nats::PublishError> for SdkError {
    fn from(e: async_nats::PublishError) -> Self {
        SdkError::Nats(e.to_string())
    }
}

impl From<async_nats::SubscribeError> for SdkError {
    fn from(e: async_nats::SubscribeError) -> Self {
        SdkError::Nats(e.to_string())
    }
}

impl From<SdkError> for Fault {
    fn from(e: SdkError) -> Self {
        match e {
            SdkError::Serialization(_) => Fault::new(FaultKind::Internal, e.to_string()),
            SdkError::Nats(_) | SdkError::Timeout(_) | SdkError::Closed | SdkError::Http(_) => {
                Fault::upstream_unavailable(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn timeout_maps_to_upstream_unavailable() {
        let fault: Fault = SdkError::Timeout(Duration::from_secs(5)).into();
        assert_eq!(fault.kind, FaultKind::UpstreamUnavailable);
        assert_eq!(fault.status_code, 503);
    }

    #[test]
    fn serialization_maps_to_internal() {
        let err = serde_json::from_str::<u8>("nope").unwrap_err();
        let fault: Fault = SdkError::from(err).into();
        assert_eq!(fault.kind, FaultKind::Internal);
    }
}
