//! Credential store.
//!
//! One record per principal, keyed by external id. The store is the only
//! shared mutable resource of the identity service; its create-if-absent
//! operation is what resolves concurrent registrations of the same id.

mod kv;
mod memory;

use std::fmt;
use std::future::Future;

use chrono::{DateTime, Utc};
use scholarlink_models::{ExternalId, Principal, PrincipalId, Role};
use serde::{Deserialize, Serialize};

pub use kv::KvCredentialStore;
pub use memory::MemoryCredentialStore;

/// Errors reported by a [`CredentialStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A record with the same external id exists.
    #[error("principal already exists")]
    AlreadyExists,

    /// A record was rejected before storage.
    #[error("invalid record: {0}")]
    InvalidRecord(&'static str),

    /// The backing store could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A principal as persisted, including its secret hash.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalRecord {
    /// Immutable identifier.
    pub id: PrincipalId,
    /// Unique login identifier.
    pub external_id: ExternalId,
    /// Given name.
    pub given_name: String,
    /// Family name.
    pub family_name: String,
    /// Argon2 PHC string.
    pub secret_hash: String,
    /// Single role.
    pub role: Role,
    /// Set on insert.
    pub created_at: DateTime<Utc>,
    /// Set on insert and update.
    pub updated_at: DateTime<Utc>,
}

impl PrincipalRecord {
    /// The public view, without the secret hash.
    pub fn to_principal(&self) -> Principal {
        Principal {
            id: self.id,
            external_id: self.external_id.clone(),
            given_name: self.given_name.clone(),
            family_name: self.family_name.clone(),
            role: self.role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl fmt::Debug for PrincipalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrincipalRecord")
            .field("id", &self.id)
            .field("external_id", &self.external_id)
            .field("role", &self.role)
            .field("secret_hash", &"***")
            .finish_non_exhaustive()
    }
}

/// Fields supplied when creating a principal. The store assigns the id and
/// timestamps.
#[derive(Clone)]
pub struct NewPrincipal {
    /// Unique login identifier.
    pub external_id: ExternalId,
    /// Given name.
    pub given_name: String,
    /// Family name.
    pub family_name: String,
    /// Already-hashed secret.
    pub secret_hash: String,
    /// Single role.
    pub role: Role,
}

impl NewPrincipal {
    /// Stamp the record with a fresh id and `now` as both timestamps.
    pub(crate) fn into_record(self, now: DateTime<Utc>) -> Result<PrincipalRecord, StoreError> {
        if self.secret_hash.is_empty() {
            return Err(StoreError::InvalidRecord("secret hash must not be empty"));
        }
        Ok(PrincipalRecord {
            id: PrincipalId::new(),
            external_id: self.external_id,
            given_name: self.given_name,
            family_name: self.family_name,
            secret_hash: self.secret_hash,
            role: self.role,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Durable principal storage.
pub trait CredentialStore: Send + Sync + 'static {
    /// Create a principal if its external id is free.
    ///
    /// Fails with [`StoreError::AlreadyExists`] otherwise; of two concurrent
    /// inserts with the same external id exactly one succeeds.
    fn insert(
        &self,
        new: NewPrincipal,
    ) -> impl Future<Output = Result<PrincipalRecord, StoreError>> + Send;

    /// Look a principal up by external id.
    fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> impl Future<Output = Result<Option<PrincipalRecord>, StoreError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_principal(hash: &str) -> NewPrincipal {
        NewPrincipal {
            external_id: ExternalId::new("11111111-1"),
            given_name: "Ana".into(),
            family_name: "Lopez".into(),
            secret_hash: hash.into(),
            role: Role::Scholar,
        }
    }

    #[test]
    fn empty_hash_is_rejected() {
        assert!(matches!(
            new_principal("").into_record(Utc::now()),
            Err(StoreError::InvalidRecord(_))
        ));
    }

    #[test]
    fn record_timestamps_start_equal() {
        let now = Utc::now();
        let record = new_principal("$argon2id$x").into_record(now).unwrap();
        assert_eq!(record.created_at, now);
        assert_eq!(record.updated_at, now);
    }

    #[test]
    fn debug_and_public_view_hide_the_hash() {
        let record = new_principal("$argon2id$marker").into_record(Utc::now()).unwrap();
        assert!(!format!("{record:?}").contains("marker"));
        let public = serde_json::to_string(&record.to_principal()).unwrap();
        assert!(!public.contains("marker"));
    }
}
