//! Identity service configuration.
//!
//! Built once at startup from environment variables and passed explicitly
//! to [`IdentityService`](crate::IdentityService). Nothing in the service
//! reads the environment after that.

use std::fmt;
use std::time::Duration;

/// Default token lifetime: 6 hours.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// Configuration that cannot be used to start the service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No signing key was provided; tokens cannot be issued safely.
    #[error("IDENTITY_SIGNING_SECRET must be set to a non-empty value")]
    MissingSigningSecret,
}

/// The HMAC key tokens are signed with.
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(String);

impl SigningSecret {
    /// Wrap a secret value.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(***)")
    }
}

/// Where principal records are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process memory; lost on restart.
    Memory,
    /// JetStream key-value bucket.
    JetStream,
}

impl StoreBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "jetstream" | "kv" => Some(Self::JetStream),
            _ => None,
        }
    }
}

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

/// A principal created at startup if absent.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    /// Login identifier.
    pub external_id: String,
    /// Plaintext secret.
    pub secret: scholarlink_models::Secret,
}

/// Global configuration of the identity service.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// NATS server URL.
    pub nats_url: String,
    /// Token signing key.
    pub signing_secret: SigningSecret,
    /// Token lifetime; renewed on every verification.
    pub token_ttl: Duration,
    /// Secret hashing cost.
    pub hashing: HashingConfig,
    /// Principal storage backend.
    pub store: StoreBackend,
    /// Optional administrator created at startup.
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl IdentityConfig {
    /// Build the configuration from environment variables.
    ///
    /// | Variable                    | Default                    | Description                      |
    /// |-----------------------------|----------------------------|----------------------------------|
    /// | `NATS_URL`                  | `nats://localhost:4222`    | Message bus                      |
    /// | `IDENTITY_SIGNING_SECRET`   | required                   | HMAC key for tokens              |
    /// | `IDENTITY_TOKEN_TTL_SECS`   | `21600`                    | Token lifetime                   |
    /// | `IDENTITY_STORE`            | `jetstream`                | `memory` or `jetstream`          |
    /// | `IDENTITY_HASH_MEMORY_KIB`  | argon2 default             | Argon2 memory cost               |
    /// | `IDENTITY_HASH_ITERATIONS`  | argon2 default             | Argon2 time cost                 |
    /// | `BOOTSTRAP_ADMIN_ID`        | unset                      | Administrator created at startup |
    /// | `BOOTSTRAP_ADMIN_SECRET`    | unset                      | Its secret                       |
    ///
    /// Fails when no signing secret is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let nats_url = var("NATS_URL").unwrap_or_else(|| "nats://localhost:4222".to_string());

        let signing_secret = var("IDENTITY_SIGNING_SECRET")
            .filter(|s| !s.trim().is_empty())
            .map(SigningSecret::new)
            .ok_or(ConfigError::MissingSigningSecret)?;

        let parse = |key: &str| var(key).and_then(|v| v.parse::<u32>().ok());

        let token_ttl = var("IDENTITY_TOKEN_TTL_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_TOKEN_TTL, Duration::from_secs);

        let store = var("IDENTITY_STORE")
            .and_then(|v| StoreBackend::parse(&v))
            .unwrap_or(StoreBackend::JetStream);

        let defaults = HashingConfig::default();
        let hashing = HashingConfig {
            memory_kib: parse("IDENTITY_HASH_MEMORY_KIB").unwrap_or(defaults.memory_kib),
            iterations: parse("IDENTITY_HASH_ITERATIONS").unwrap_or(defaults.iterations),
            parallelism: defaults.parallelism,
        };

        let bootstrap_admin = match (var("BOOTSTRAP_ADMIN_ID"), var("BOOTSTRAP_ADMIN_SECRET")) {
            (Some(external_id), Some(secret)) if !external_id.is_empty() && !secret.is_empty() => {
                Some(BootstrapAdmin {
                    external_id,
                    secret: scholarlink_models::Secret::new(secret),
                })
            }
            _ => None,
        };

        Ok(Self {
            nats_url,
            signing_secret,
            token_ttl,
            hashing,
            store,
            bootstrap_admin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn missing_signing_secret_is_refused() {
        assert_eq!(
            IdentityConfig::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::MissingSigningSecret
        );
        assert_eq!(
            IdentityConfig::from_lookup(lookup(&[("IDENTITY_SIGNING_SECRET", "  ")])).unwrap_err(),
            ConfigError::MissingSigningSecret
        );
    }

    #[test]
    fn explicit_signing_secret_is_used() {
        let config = IdentityConfig::from_lookup(lookup(&[
            ("IDENTITY_SIGNING_SECRET", "k3y"),
            ("IDENTITY_TOKEN_TTL_SECS", "60"),
            ("IDENTITY_STORE", "memory"),
        ]))
        .unwrap();
        assert_eq!(config.signing_secret, SigningSecret::new("k3y"));
        assert_eq!(config.token_ttl, Duration::from_secs(60));
        assert_eq!(config.store, StoreBackend::Memory);
        assert!(config.bootstrap_admin.is_none());
    }

    #[test]
    fn bootstrap_admin_needs_both_variables() {
        let only_id = IdentityConfig::from_lookup(lookup(&[
            ("IDENTITY_SIGNING_SECRET", "k3y"),
            ("BOOTSTRAP_ADMIN_ID", "root"),
        ]))
        .unwrap();
        assert!(only_id.bootstrap_admin.is_none());

        let both = IdentityConfig::from_lookup(lookup(&[
            ("IDENTITY_SIGNING_SECRET", "k3y"),
            ("BOOTSTRAP_ADMIN_ID", "root"),
            ("BOOTSTRAP_ADMIN_SECRET", "pw"),
        ]))
        .unwrap();
        assert_eq!(both.bootstrap_admin.unwrap().external_id, "root");
    }

    #[test]
    fn default_ttl_is_six_hours() {
        assert_eq!(DEFAULT_TOKEN_TTL.as_secs(), 21_600);
    }

    #[test]
    fn signing_secret_debug_is_redacted() {
        let secret = SigningSecret::new("super-secret");
        assert!(!format!("{secret:?}").contains("super-secret"));
    }

    #[test]
    fn store_backend_parsing() {
        assert_eq!(StoreBackend::parse("memory"), Some(StoreBackend::Memory));
        assert_eq!(StoreBackend::parse("JetStream"), Some(StoreBackend::JetStream));
        assert_eq!(StoreBackend::parse("kv"), Some(StoreBackend::JetStream));
        assert_eq!(StoreBackend::parse("postgres"), None);
    }

    #[test]
    fn default_hashing_matches_argon2_defaults() {
        let cfg = HashingConfig::default();
        assert_eq!(cfg.memory_kib, argon2::Params::DEFAULT_M_COST);
        assert_eq!(cfg.iterations, argon2::Params::DEFAULT_T_COST);
    }
}
