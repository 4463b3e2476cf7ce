//! Message-bus client for the identity service.
//!
//! [`IdentityClient`] publishes each operation as an
//! [`RpcRequest`] on its operation subject, with this instance's reply
//! subject attached. A background task listens on the reply subject and
//! hands every [`RpcResponse`](scholarlink_models::RpcResponse) to the [`PendingRequests`] table, which
//! wakes the matching caller.
//!
//! Requests are never retried: a timeout surfaces as
//! [`FaultKind::UpstreamUnavailable`](scholarlink_models::FaultKind::UpstreamUnavailable).

use std::time::Duration;

use futures::StreamExt;
use scholarlink_models::{
    AuthSession, Fault, FaultKind, LoginRequest, RegisterRequest, RpcRequest, VerifiedSession,
    VerifyTokenRequest,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::IdentityApi;
use crate::error::SdkError;
use crate::pending::{PendingRequests, RawResponse};
use crate::subjects::{IdentityOperation, IdentitySubjects};

/// A connected identity-service caller.
#[derive(Clone)]
pub struct IdentityClient {
    nats_client: async_nats::Client,
    pending: PendingRequests,
    reply_subject: String,
    timeout: Duration,
}

impl IdentityClient {
    /// Connect to NATS and start listening for replies.
    ///
    /// `instance` must be unique per running caller; it names the reply
    /// subject.
    pub async fn connect(
        nats_url: &str,
        instance: &str,
        timeout: Duration,
    ) -> Result<Self, SdkError> {
        let nats_client = async_nats::connect(nats_url).await?;
        Self::with_client(nats_client, instance, timeout).await
    }

    /// Wrap an existing NATS connection.
    pub async fn with_client(
        nats_client: async_nats::Client,
        instance: &str,
        timeout: Duration,
    ) -> Result<Self, SdkError> {
        let reply_subject = IdentitySubjects::reply(instance);
        let mut replies = nats_client.subscribe(reply_subject.clone()).await?;
        let pending = PendingRequests::new();

        let table = pending.clone();
        let subject = reply_subject.clone();
        tokio::spawn(async move {
            while let Some(message) = replies.next().await {
                match table.complete_from_bytes(&message.payload) {
                    Ok(true) => {}
                    Ok(false) => debug!("dropping reply with no pending request"),
                    Err(e) => warn!(error = %e, "ignoring malformed reply"),
                }
            }
            debug!(%subject, "reply subscription closed");
        });

        Ok(Self {
            nats_client,
            pending,
            reply_subject,
            timeout,
        })
    }

    /// Send one request and wait for its correlated reply.
    pub async fn call<Req, Resp>(&self, op: IdentityOperation, payload: Req) -> Result<Resp, Fault>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let (request_id, bytes) = encode_request(payload)?;
        let reply = self.pending.register(request_id);

        let subject = IdentitySubjects::operation(op);
        debug!(%subject, %request_id, "forwarding identity request");
        self.nats_client
            .publish_with_reply(subject, self.reply_subject.clone(), bytes.into())
            .await
            .map_err(SdkError::from)?;
        self.nats_client
            .flush()
            .await
            .map_err(|e| SdkError::Nats(e.to_string()))?;

        let response = reply.wait(self.timeout).await.map_err(|e| {
            warn!(operation = %op, %request_id, error = %e, "identity service unavailable");
            Fault::from(e)
        })?;

        decode_reply(op, response)
    }

    /// Number of requests currently awaiting a reply.
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Access the raw NATS client.
    pub fn nats_client(&self) -> &async_nats::Client {
        &self.nats_client
    }
}

/// Wrap `payload` in a fresh [`RpcRequest`] and serialize it.
///
/// Returns the request id to register in the correlation table.
pub fn encode_request<Req: Serialize>(payload: Req) -> Result<(Uuid, Vec<u8>), SdkError> {
    let request = RpcRequest::new(payload);
    let bytes = serde_json::to_vec(&request)?;
    Ok((request.id, bytes))
}

/// Turn a correlated reply into the operation's result.
pub fn decode_reply<Resp: DeserializeOwned>(
    op: IdentityOperation,
    response: RawResponse,
) -> Result<Resp, Fault> {
    let value = response.outcome.into_result()?;
    serde_json::from_value(value)
        .map_err(|e| Fault::new(FaultKind::Internal, format!("malformed {op} reply: {e}")))
}

impl IdentityApi for IdentityClient {
    async fn register(&self, req: RegisterRequest) -> Result<AuthSession, Fault> {
        self.call(IdentityOperation::Register, req).await
    }

    async fn login(&self, req: LoginRequest) -> Result<AuthSession, Fault> {
        self.call(IdentityOperation::Login, req).await
    }

    async fn verify_token(&self, req: VerifyTokenRequest) -> Result<VerifiedSession, Fault> {
        self.call(IdentityOperation::VerifyToken, req).await
    }
}
