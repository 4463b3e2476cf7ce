//! Correlated request / response envelopes for the message bus.
//!
//! Every request carries its own id; the reply echoes it back as
//! `correlationId`. Callers keep a table of pending ids so that timeouts
//! and late replies behave identically on any transport.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fault::Fault;

/// A request published on an operation subject.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcRequest<T> {
    /// Unique request id (UUID v4).
    pub id: Uuid,
    /// Operation payload; same shape as the HTTP body.
    pub payload: T,
}

impl<T> RpcRequest<T> {
    /// Wrap a payload with a fresh request id.
    pub fn new(payload: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload,
        }
    }
}

/// Either the success payload or a fault.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", content = "body", rename_all = "camelCase")]
pub enum RpcOutcome<T> {
    /// The operation succeeded.
    Ok(T),
    /// The operation failed.
    Fault(Fault),
}

impl<T> RpcOutcome<T> {
    /// Convert into a standard `Result`.
    pub fn into_result(self) -> Result<T, Fault> {
        match self {
            Self::Ok(v) => Ok(v),
            Self::Fault(f) => Err(f),
        }
    }
}

impl<T> From<Result<T, Fault>> for RpcOutcome<T> {
    fn from(r: Result<T, Fault>) -> Self {
        match r {
            Ok(v) => Self::Ok(v),
            Err(f) => Self::Fault(f),
        }
    }
}

/// The reply to an [`RpcRequest`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RpcResponse<T> {
    /// Id of the request this answers.
    pub correlation_id: Uuid,
    /// Result of the operation.
    pub outcome: RpcOutcome<T>,
}

impl<T> RpcResponse<T> {
    /// Build the reply for `request_id`.
    pub fn new(request_id: Uuid, result: Result<T, Fault>) -> Self {
        Self {
            correlation_id: request_id,
            outcome: result.into(),
        }
    }
}
