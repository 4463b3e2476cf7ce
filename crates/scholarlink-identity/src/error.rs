//! Error types for the identity service.
//!
//! [`IdentityError`] unifies all internal failure modes. Converting it into
//! a [`Fault`] is the only way an error leaves the process; internal detail
//! is logged here and replaced by a generic message.

use scholarlink_models::{ExternalId, Fault, FaultKind, ModelError};

use crate::store::StoreError;

/// Errors that can occur while serving an identity operation.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The payload failed field validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ModelError),

    /// The payload did not match the operation's schema.
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// A principal with this external id already exists.
    #[error("principal already exists: {0}")]
    DuplicatePrincipal(ExternalId),

    /// Unknown identifier or wrong secret.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The token failed signature, structure, or expiry checks.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The credential store failed.
    #[error("credential store error: {0}")]
    Store(#[from] StoreError),

    /// Secret hashing failed or its worker thread died.
    #[error("secret hashing error: {0}")]
    Hashing(String),

    /// Token encoding failed.
    #[error("token signing error: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

impl IdentityError {
    /// The fault classification of this error.
    pub fn kind(&self) -> FaultKind {
        match self {
            Self::Validation(_) | Self::MalformedPayload(_) => FaultKind::ValidationFailure,
            Self::DuplicatePrincipal(_) => FaultKind::DuplicatePrincipal,
            Self::InvalidCredentials => FaultKind::InvalidCredentials,
            Self::InvalidToken(_) => FaultKind::InvalidToken,
            Self::Store(_) | Self::Hashing(_) | Self::Signing(_) => FaultKind::Internal,
        }
    }
}

impl From<IdentityError> for Fault {
    fn from(e: IdentityError) -> Self {
        let kind = e.kind();
        match e {
            IdentityError::Validation(_) | IdentityError::MalformedPayload(_) => {
                tracing::debug!(error = %e, "rejected payload");
                Fault::validation(e.to_string())
            }
            IdentityError::DuplicatePrincipal(_) => {
                Fault::new(kind, "a principal with this identifier already exists")
            }
            IdentityError::InvalidCredentials => Fault::invalid_credentials(),
            IdentityError::InvalidToken(ref reason) => {
                tracing::debug!(%reason, "token rejected");
                Fault::invalid_token()
            }
            IdentityError::Store(_) | IdentityError::Hashing(_) | IdentityError::Signing(_) => {
                tracing::error!(error = %e, "identity operation failed");
                Fault::new(kind, "internal error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_failures_hide_detail() {
        let err = IdentityError::Store(StoreError::Unavailable("connection refused 10.0.0.3".into()));
        let fault: Fault = err.into();
        assert_eq!(fault.kind, FaultKind::Internal);
        assert_eq!(fault.status_code, 500);
        assert!(!fault.message.contains("10.0.0.3"));
    }

    #[test]
    fn token_reason_is_not_exposed() {
        let fault: Fault = IdentityError::InvalidToken("ExpiredSignature".into()).into();
        assert_eq!(fault, Fault::invalid_token());
    }

    #[test]
    fn duplicate_maps_to_400() {
        let fault: Fault = IdentityError::DuplicatePrincipal(ExternalId::new("x")).into();
        assert_eq!(fault.kind, FaultKind::DuplicatePrincipal);
        assert_eq!(fault.status_code, 400);
    }

    #[test]
    fn validation_keeps_field_detail() {
        let fault: Fault =
            IdentityError::Validation(ModelError::EmptyField { field: "secret" }).into();
        assert_eq!(fault.kind, FaultKind::ValidationFailure);
        assert!(fault.message.contains("secret"));
    }
}
