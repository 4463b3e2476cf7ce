//! Operation payloads.
//!
//! The same shapes are accepted on the gateway's HTTP surface and carried
//! as [`RpcRequest`](crate::RpcRequest) payloads on the message bus.
//! Request types reject unknown fields so that anything outside the
//! declared schema fails deserialization.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::claims::VerifiedIdentity;
use crate::error::{check_field, ModelError};
use crate::principal::{ExternalId, Principal};
use crate::role::Role;

// ---------------------------------------------------------------------------
// Secret
// ---------------------------------------------------------------------------

/// A plaintext credential in transit.
///
/// `Debug` never prints the value.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wrap a plaintext secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Access the plaintext. Callers must not log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of `register`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    /// Requested login identifier.
    pub external_id: ExternalId,
    /// Given name.
    pub given_name: String,
    /// Family name.
    pub family_name: String,
    /// Plaintext secret; hashed before storage.
    pub secret: Secret,
    /// Role to assign.
    pub role: Role,
}

impl RegisterRequest {
    /// Check field contents beyond what deserialization enforces.
    pub fn validate(&self) -> Result<(), ModelError> {
        check_field("externalId", self.external_id.as_str())?;
        check_field("givenName", &self.given_name)?;
        check_field("familyName", &self.family_name)?;
        check_field("secret", self.secret.expose())
    }
}

/// Body of `login`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginRequest {
    /// Login identifier.
    pub external_id: ExternalId,
    /// Plaintext secret.
    pub secret: Secret,
}

impl LoginRequest {
    /// Check field contents beyond what deserialization enforces.
    pub fn validate(&self) -> Result<(), ModelError> {
        check_field("externalId", self.external_id.as_str())?;
        check_field("secret", self.secret.expose())
    }
}

/// Payload of `verifyToken` on the bus (HTTP carries it as a bearer header).
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct VerifyTokenRequest {
    /// The token to verify.
    pub token: String,
}

impl fmt::Debug for VerifyTokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyTokenRequest")
            .field("token", &"***")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Result of `register` and `login`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// The authenticated principal.
    pub principal: Principal,
    /// A freshly minted signed token.
    pub token: String,
}

/// Result of `verifyToken`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VerifiedSession {
    /// The identity asserted by the verified token.
    pub principal: VerifiedIdentity,
    /// A renewed token with a later expiry.
    pub token: String,
}
