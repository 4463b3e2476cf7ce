//! Explicit request/response correlation.
//!
//! Every outgoing request registers its id in a [`PendingRequests`] table
//! and receives a [`PendingReply`]. The reply dispatcher completes entries
//! by `correlationId`; replies for unknown ids (late, duplicate, or never
//! requested) are dropped. A [`PendingReply`] removes its own entry when it
//! resolves, times out, or is dropped, so the table never accumulates
//! abandoned requests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use scholarlink_models::RpcResponse;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::SdkError;

/// Untyped reply; the caller decodes the payload for its own operation.
pub type RawResponse = RpcResponse<serde_json::Value>;

type Table = HashMap<Uuid, oneshot::Sender<RawResponse>>;

/// Table of requests awaiting a reply, keyed by request id.
#[derive(Clone, Default)]
pub struct PendingRequests {
    inner: Arc<Mutex<Table>>,
}

impl PendingRequests {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, Table> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `id` and return the handle its reply will arrive on.
    pub fn register(&self, id: Uuid) -> PendingReply {
        let (tx, rx) = oneshot::channel();
        self.table().insert(id, tx);
        PendingReply {
            id,
            rx,
            table: self.clone(),
        }
    }

    /// Deliver a reply to its waiting request.
    ///
    /// Returns `false` when no request with that id is pending.
    pub fn complete(&self, response: RawResponse) -> bool {
        let Some(tx) = self.table().remove(&response.correlation_id) else {
            return false;
        };
        tx.send(response).is_ok()
    }

    /// Decode a serialized reply and deliver it.
    ///
    /// Returns `Ok(false)` when no request with its id is pending.
    pub fn complete_from_bytes(&self, bytes: &[u8]) -> Result<bool, serde_json::Error> {
        let response: RawResponse = serde_json::from_slice(bytes)?;
        Ok(self.complete(response))
    }

    /// Forget a pending request. Returns `true` if it was still pending.
    pub fn cancel(&self, id: &Uuid) -> bool {
        self.table().remove(id).is_some()
    }

    /// Number of requests still awaiting a reply.
    pub fn len(&self) -> usize {
        self.table().len()
    }

    /// Whether no request is awaiting a reply.
    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }
}

/// The receiving half of one pending request.
pub struct PendingReply {
    id: Uuid,
    rx: oneshot::Receiver<RawResponse>,
    table: PendingRequests,
}

impl PendingReply {
    /// The request id this handle waits for.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Wait for the reply, giving up after `timeout`.
    pub async fn wait(mut self, timeout: Duration) -> Result<RawResponse, SdkError> {
        match tokio::time::timeout(timeout, &mut self.rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(SdkError::Closed),
            Err(_) => Err(SdkError::Timeout(timeout)),
        }
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        self.table.cancel(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholarlink_models::{Fault, RpcOutcome};
    use serde_json::json;

    fn reply(id: Uuid) -> RawResponse {
        RpcResponse::new(id, Ok(json!({ "ok": true })))
    }

    #[tokio::test]
    async fn reply_reaches_the_matching_request() {
        let table = PendingRequests::new();
        let a = table.register(Uuid::new_v4());
        let b = table.register(Uuid::new_v4());
        let b_id = b.id();

        assert!(table.complete(reply(b_id)));
        let got = b.wait(Duration::from_secs(1)).await.unwrap();
        assert_eq!(got.correlation_id, b_id);

        // `a` is still pending until it is dropped.
        assert_eq!(table.len(), 1);
        drop(a);
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn unknown_reply_is_dropped() {
        let table = PendingRequests::new();
        assert!(!table.complete(reply(Uuid::new_v4())));
    }

    #[tokio::test]
    async fn timeout_removes_entry_and_late_reply_is_ignored() {
        let table = PendingRequests::new();
        let pending = table.register(Uuid::new_v4());
        let id = pending.id();

        let err = pending.wait(Duration::from_millis(20)).await.unwrap_err();
        assert!(matches!(err, SdkError::Timeout(_)));
        assert!(table.is_empty());
        assert!(!table.complete(reply(id)));
    }

    #[tokio::test]
    async fn fault_outcome_is_delivered_untouched() {
        let table = PendingRequests::new();
        let pending = table.register(Uuid::new_v4());
        let id = pending.id();
        table.complete(RpcResponse::new(id, Err(Fault::invalid_token())));

        let got = pending.wait(Duration::from_secs(1)).await.unwrap();
        assert_eq!(got.outcome, RpcOutcome::Fault(Fault::invalid_token()));
    }

    #[tokio::test]
    async fn cancel_closes_the_reply_channel() {
        let table = PendingRequests::new();
        let pending = table.register(Uuid::new_v4());
        assert!(table.cancel(&pending.id()));
        let err = pending.wait(Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, SdkError::Closed));
    }

    #[tokio::test]
    async fn serialized_reply_is_decoded_and_delivered() {
        let table = PendingRequests::new();
        let pending = table.register(Uuid::new_v4());
        let bytes = serde_json::to_vec(&reply(pending.id())).unwrap();

        assert!(table.complete_from_bytes(&bytes).unwrap());
        assert!(pending.wait(Duration::from_secs(1)).await.is_ok());

        let stray = serde_json::to_vec(&reply(Uuid::new_v4())).unwrap();
        assert!(!table.complete_from_bytes(&stray).unwrap());
        assert!(table.complete_from_bytes(b"{\"nope\": 1}").is_err());
    }
}
