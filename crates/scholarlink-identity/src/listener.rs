//! Message-bus front of the identity service.
//!
//! Subscribes to every identity subject in the shared queue group and
//! spawns one task per inbound request. Each task decodes the
//! [`RpcRequest`], runs the operation, and publishes an [`RpcResponse`]
//! carrying the request id to the message's reply subject.

use std::sync::Arc;

use futures::StreamExt;
use scholarlink_models::{Fault, RpcRequest, RpcResponse};
use scholarlink_sdk::{IdentityApi, IdentityOperation, IdentitySubjects};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

/// Serve identity requests until the subscription ends.
pub async fn serve<A>(client: async_nats::Client, api: Arc<A>) -> anyhow::Result<()>
where
    A: IdentityApi + 'static,
{
    let subject = IdentitySubjects::operation_wildcard();
    let mut subscription = client
        .queue_subscribe(subject.clone(), IdentitySubjects::QUEUE_GROUP.to_string())
        .await?;
    info!(%subject, queue = IdentitySubjects::QUEUE_GROUP, "identity service listening");

    while let Some(message) = subscription.next().await {
        let Some(reply) = message.reply.clone() else {
            warn!(subject = %message.subject, "ignoring request without reply subject");
            continue;
        };
        let Some(op) = IdentitySubjects::parse_operation(&message.subject) else {
            warn!(subject = %message.subject, "ignoring unknown identity subject");
            continue;
        };

        let client = client.clone();
        let api = Arc::clone(&api);
        tokio::spawn(async move {
            let Some(bytes) = handle_request(api.as_ref(), op, &message.payload).await else {
                return;
            };
            if let Err(e) = client.publish(reply, bytes.into()).await {
                error!(operation = %op, error = %e, "failed to publish reply");
            }
        });
    }

    info!("identity subscription closed");
    Ok(())
}

/// Decode, dispatch, and encode one request.
///
/// Returns `None` when the payload is not an envelope at all: without a
/// request id there is nobody to reply to.
pub async fn handle_request<A: IdentityApi>(
    api: &A,
    op: IdentityOperation,
    payload: &[u8],
) -> Option<Vec<u8>> {
    let request = match serde_json::from_slice::<RpcRequest<Value>>(payload) {
        Ok(request) => request,
        Err(e) => {
            warn!(operation = %op, error = %e, "dropping malformed envelope");
            return None;
        }
    };
    debug!(operation = %op, request_id = %request.id, "identity request received");

    let result = dispatch(api, op, request.payload).await;
    let response = RpcResponse::new(request.id, result);
    match serde_json::to_vec(&response) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            error!(operation = %op, error = %e, "failed to encode reply");
            None
        }
    }
}

async fn dispatch<A: IdentityApi>(
    api: &A,
    op: IdentityOperation,
    payload: Value,
) -> Result<Value, Fault> {
    match op {
        IdentityOperation::Register => encode(api.register(decode(payload)?).await?),
        IdentityOperation::Login => encode(api.login(decode(payload)?).await?),
        IdentityOperation::VerifyToken => encode(api.verify_token(decode(payload)?).await?),
    }
}

fn decode<T: serde::de::DeserializeOwned>(payload: Value) -> Result<T, Fault> {
    serde_json::from_value(payload).map_err(|e| Fault::validation(e.to_string()))
}

fn encode<T: Serialize>(value: T) -> Result<Value, Fault> {
    serde_json::to_value(value).map_err(|e| {
        error!(error = %e, "failed to encode operation result");
        Fault::new(scholarlink_models::FaultKind::Internal, "internal error")
    })
}
