//! Fault taxonomy.
//!
//! A [`Fault`] is what crosses a process boundary instead of a raw error.
//! It carries a stable numeric status so the gateway can map it onto an
//! HTTP status line without knowing anything about the failure itself.

use serde::{Deserialize, Serialize};

/// Classification of every failure the identity subsystem can report.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum FaultKind {
    /// Registration collided on `externalId`.
    DuplicatePrincipal,
    /// Unknown identifier or wrong secret (indistinguishable by design).
    InvalidCredentials,
    /// Missing, malformed, badly signed, or expired token.
    InvalidToken,
    /// The message bus or identity service did not answer in time.
    UpstreamUnavailable,
    /// The request payload violated the declared schema.
    ValidationFailure,
    /// Any other failure inside the identity service.
    Internal,
}

impl FaultKind {
    /// The stable status code carried by faults of this kind.
    pub fn status_code(self) -> u16 {
        match self {
            Self::DuplicatePrincipal | Self::InvalidCredentials | Self::ValidationFailure => 400,
            Self::InvalidToken => 401,
            Self::Internal => 500,
            Self::UpstreamUnavailable => 503,
        }
    }
}

/// Message shown for every credential failure.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "identifier or secret incorrect";

/// A structured, taxonomy-classified error.
///
/// # Examples
///
/// ```
/// use scholarlink_models::{Fault, FaultKind};
///
/// let fault = Fault::invalid_credentials();
/// assert_eq!(fault.kind, FaultKind::InvalidCredentials);
/// assert_eq!(fault.status_code, 400);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{kind} ({status_code}): {message}")]
pub struct Fault {
    /// Numeric status, derived from `kind`.
    pub status_code: u16,
    /// Human-readable message, safe to show to end users.
    pub message: String,
    /// Fault classification.
    pub kind: FaultKind,
}

impl Fault {
    /// Build a fault of the given kind.
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            status_code: kind.status_code(),
            message: message.into(),
            kind,
        }
    }

    /// The generic credential failure.
    pub fn invalid_credentials() -> Self {
        Self::new(FaultKind::InvalidCredentials, INVALID_CREDENTIALS_MESSAGE)
    }

    /// The generic token failure.
    pub fn invalid_token() -> Self {
        Self::new(FaultKind::InvalidToken, "invalid or expired token")
    }

    /// The upstream timeout / unreachable failure.
    pub fn upstream_unavailable(detail: impl Into<String>) -> Self {
        Self::new(FaultKind::UpstreamUnavailable, detail)
    }

    /// A schema validation failure.
    pub fn validation(detail: impl Into<String>) -> Self {
        Self::new(FaultKind::ValidationFailure, detail)
    }
}
