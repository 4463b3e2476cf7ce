//! Credential store backed by a JetStream KV bucket.
//!
//! Keys are the base64url encoding of the external id (KV keys allow only
//! a restricted alphabet); values are JSON [`PrincipalRecord`]s. Uniqueness
//! relies on the bucket's atomic `create`, which fails if the key exists.

use async_nats::jetstream::kv::{self, CreateErrorKind};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use scholarlink_models::ExternalId;
use scholarlink_sdk::IdentitySubjects;
use tracing::{debug, info};

use super::{CredentialStore, NewPrincipal, PrincipalRecord, StoreError};

/// Principal records in the `scholarlink-v1-principals` bucket.
#[derive(Debug, Clone)]
pub struct KvCredentialStore {
    kv_store: kv::Store,
}

impl KvCredentialStore {
    /// Create or bind to the principals bucket.
    pub async fn new(js: async_nats::jetstream::Context) -> Result<Self, StoreError> {
        let bucket_name = IdentitySubjects::kv_principals();
        let config = kv::Config {
            bucket: bucket_name.clone(),
            history: 1,
            ..Default::default()
        };
        let kv_store = match js.create_key_value(config).await {
            Ok(store) => {
                info!(bucket = %bucket_name, "principals KV bucket created");
                store
            }
            Err(_) => {
                debug!(bucket = %bucket_name, "bucket exists, binding");
                js.get_key_value(&bucket_name)
                    .await
                    .map_err(|e| StoreError::Unavailable(e.to_string()))?
            }
        };
        Ok(Self { kv_store })
    }

    fn key(external_id: &ExternalId) -> String {
        URL_SAFE_NO_PAD.encode(external_id.as_str())
    }
}

impl CredentialStore for KvCredentialStore {
    async fn insert(&self, new: NewPrincipal) -> Result<PrincipalRecord, StoreError> {
        let key = Self::key(&new.external_id);
        let record = new.into_record(Utc::now())?;
        let bytes = serde_json::to_vec(&record)?;
        match self.kv_store.create(&key, bytes.into()).await {
            Ok(_) => Ok(record),
            Err(e) if e.kind() == CreateErrorKind::AlreadyExists => Err(StoreError::AlreadyExists),
            Err(e) => Err(StoreError::Unavailable(e.to_string())),
        }
    }

    async fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<PrincipalRecord>, StoreError> {
        self.kv_store
            .get(Self::key(external_id))
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .map(|content| serde_json::from_slice::<PrincipalRecord>(content.as_ref()))
            .transpose()
            .map_err(Into::into)
    }
}
