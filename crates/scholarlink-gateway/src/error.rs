//! HTTP mapping of gateway failures.
//!
//! Faults relayed from the identity service keep their body unchanged;
//! only their `statusCode` is lifted onto the HTTP status line.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use scholarlink_models::{Fault, ModelError};
use serde_json::json;
use tracing::warn;

/// Every way a gateway request can fail.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A fault produced by the identity service or the bus client.
    #[error(transparent)]
    Fault(#[from] Fault),

    /// The request body violated the declared schema.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The `Authorization` header was absent or not a bearer token.
    #[error("missing or malformed bearer token")]
    MissingBearer,

    /// The browser origin is not on the allow-list.
    #[error("origin not allowed: {0}")]
    OriginNotAllowed(String),
}

impl From<ModelError> for GatewayError {
    fn from(e: ModelError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl GatewayError {
    /// The fault body this error is reported as, if any.
    pub fn to_fault(&self) -> Option<Fault> {
        match self {
            Self::Fault(fault) => Some(fault.clone()),
            Self::Validation(detail) => Some(Fault::validation(detail.clone())),
            Self::MissingBearer => Some(Fault::invalid_token()),
            Self::OriginNotAllowed(_) => None,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let Some(fault) = self.to_fault() else {
            warn!(error = %self, "request refused");
            let body = json!({ "statusCode": 403, "message": "origin not allowed" });
            return (StatusCode::FORBIDDEN, Json(body)).into_response();
        };

        let status =
            StatusCode::from_u16(fault.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            warn!(kind = %fault.kind, status = status.as_u16(), "upstream failure");
        }
        (status, Json(fault)).into_response()
    }
}
