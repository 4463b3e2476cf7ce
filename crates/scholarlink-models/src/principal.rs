//! Principal identifiers and the public principal view.
//!
//! The stored record (with its secret hash) lives in the identity service
//! and never crosses a process boundary; [`Principal`] is the only shape
//! other components ever see.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::Role;

// ---------------------------------------------------------------------------
// PrincipalId
// ---------------------------------------------------------------------------

/// Globally unique, immutable principal identifier.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PrincipalId(Uuid);

impl PrincipalId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for PrincipalId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

// ---------------------------------------------------------------------------
// ExternalId
// ---------------------------------------------------------------------------

/// Human-meaningful unique login identifier (e.g. a national ID).
///
/// # Examples
///
/// ```
/// use scholarlink_models::ExternalId;
///
/// let id = ExternalId::new("11111111-1");
/// assert_eq!(id.to_string(), "11111111-1");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ExternalId(String);

impl ExternalId {
    /// Create a new external identifier.
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Return the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExternalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ExternalId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl FromStr for ExternalId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Principal
// ---------------------------------------------------------------------------

/// A registered identity as exposed outside the identity service.
///
/// Deliberately has no secret-hash field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// Immutable identifier.
    pub id: PrincipalId,
    /// Unique login identifier.
    pub external_id: ExternalId,
    /// Given name (display only).
    pub given_name: String,
    /// Family name (display only).
    pub family_name: String,
    /// The principal's single role.
    pub role: Role,
    /// Creation timestamp, set by the store.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp, set by the store.
    pub updated_at: DateTime<Utc>,
}
