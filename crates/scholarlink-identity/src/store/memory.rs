//! In-process credential store.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::Utc;
use scholarlink_models::ExternalId;
use tokio::sync::RwLock;

use super::{CredentialStore, NewPrincipal, PrincipalRecord, StoreError};

/// Keeps principals in a map guarded by a lock; the uniqueness check and
/// the insert happen under one write guard.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    records: RwLock<HashMap<ExternalId, PrincipalRecord>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored principals.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl CredentialStore for MemoryCredentialStore {
    async fn insert(&self, new: NewPrincipal) -> Result<PrincipalRecord, StoreError> {
        let mut records = self.records.write().await;
        match records.entry(new.external_id.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists),
            Entry::Vacant(slot) => {
                let record = new.into_record(Utc::now())?;
                Ok(slot.insert(record).clone())
            }
        }
    }

    async fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<PrincipalRecord>, StoreError> {
        Ok(self.records.read().await.get(external_id).cloned())
    }
}
