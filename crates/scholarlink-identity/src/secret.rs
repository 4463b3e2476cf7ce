//! One-way secret hashing.
//!
//! Secrets are stored as Argon2id PHC strings with a random 16-byte salt.
//! Hashing and verification are deliberately expensive, so both run on
//! tokio's blocking pool. Verification compares in constant time (the
//! Argon2 verifier's own comparison).

use std::sync::Arc;

use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};
use password_hash::{PasswordHash, SaltString};
use scholarlink_models::Secret;

use crate::config::HashingConfig;
use crate::error::IdentityError;

/// Hashes and verifies secrets with fixed Argon2id parameters.
#[derive(Clone)]
pub struct SecretHasher {
    params: Params,
    /// Hash of a random secret, verified against when a login names an
    /// unknown principal so both failure paths cost the same.
    dummy_hash: Arc<str>,
}

impl SecretHasher {
    /// Build a hasher and precompute its dummy hash.
    pub fn new(config: HashingConfig) -> Result<Self, IdentityError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| IdentityError::Hashing(e.to_string()))?;

        let mut filler = [0u8; 32];
        getrandom::getrandom(&mut filler).map_err(|e| IdentityError::Hashing(e.to_string()))?;
        let dummy_hash = hash_with(&params, &filler)?;

        Ok(Self {
            params,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// Hash `secret` into a PHC string.
    pub async fn hash(&self, secret: &Secret) -> Result<String, IdentityError> {
        let params = self.params.clone();
        let plain = secret.expose().as_bytes().to_vec();
        tokio::task::spawn_blocking(move || hash_with(&params, &plain))
            .await
            .map_err(|e| IdentityError::Hashing(e.to_string()))?
    }

    /// Check `secret` against a stored PHC string.
    ///
    /// A malformed stored hash never matches.
    pub async fn verify(&self, secret: &Secret, stored_hash: &str) -> Result<bool, IdentityError> {
        let plain = secret.expose().as_bytes().to_vec();
        let stored = stored_hash.to_string();
        tokio::task::spawn_blocking(move || verify_with(&plain, &stored))
            .await
            .map_err(|e| IdentityError::Hashing(e.to_string()))
    }

    /// Spend the same effort as [`verify`](Self::verify) and report a
    /// mismatch. Used when the principal does not exist.
    pub async fn verify_dummy(&self, secret: &Secret) -> Result<bool, IdentityError> {
        let dummy = Arc::clone(&self.dummy_hash);
        self.verify(secret, &dummy).await.map(|_| false)
    }
}

fn hash_with(params: &Params, plain: &[u8]) -> Result<String, IdentityError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| IdentityError::Hashing(e.to_string()))?;
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| IdentityError::Hashing(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone());
    let phc = argon2
        .hash_password(plain, &salt)
        .map_err(|e| IdentityError::Hashing(e.to_string()))?
        .to_string();
    Ok(phc)
}

fn verify_with(plain: &[u8], stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default().verify_password(plain, &parsed).is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
pub(crate) fn fast_hashing() -> HashingConfig {
    HashingConfig {
        memory_kib: 256,
        iterations: 1,
        parallelism: 1,
    }
}
