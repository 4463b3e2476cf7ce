//! Identity operations.
//!
//! [`IdentityService`] implements registration, login, and token
//! verification over any [`CredentialStore`]. It implements
//! [`IdentityApi`] so the listener and in-process callers share one
//! fault-producing entry point.

use scholarlink_models::{
    AuthSession, ExternalId, Fault, LoginRequest, RegisterRequest, Role, VerifiedIdentity,
    VerifiedSession, VerifyTokenRequest,
};
use scholarlink_sdk::IdentityApi;
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::{BootstrapAdmin, IdentityConfig};
use crate::error::IdentityError;
use crate::secret::SecretHasher;
use crate::store::{CredentialStore, NewPrincipal, StoreError};
use crate::token::TokenIssuer;

/// The identity service: sole reader/writer of the credential store and
/// sole holder of the signing key.
pub struct IdentityService<S, C = SystemClock> {
    store: S,
    hasher: SecretHasher,
    tokens: TokenIssuer,
    clock: C,
}

impl<S: CredentialStore> IdentityService<S, SystemClock> {
    /// Build a service from startup configuration.
    pub fn from_config(store: S, config: &IdentityConfig) -> Result<Self, IdentityError> {
        Ok(Self::new(
            store,
            SecretHasher::new(config.hashing)?,
            TokenIssuer::new(&config.signing_secret, config.token_ttl),
            SystemClock,
        ))
    }
}

impl<S: CredentialStore, C: Clock> IdentityService<S, C> {
    /// Assemble a service from its parts.
    pub fn new(store: S, hasher: SecretHasher, tokens: TokenIssuer, clock: C) -> Self {
        Self {
            store,
            hasher,
            tokens,
            clock,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a principal and mint its first token.
    pub async fn register_principal(
        &self,
        req: RegisterRequest,
    ) -> Result<AuthSession, IdentityError> {
        req.validate()?;
        let secret_hash = self.hasher.hash(&req.secret).await?;

        let new = NewPrincipal {
            external_id: req.external_id,
            given_name: req.given_name.trim().to_string(),
            family_name: req.family_name.trim().to_string(),
            secret_hash,
            role: req.role,
        };
        let external_id = new.external_id.clone();
        let record = match self.store.insert(new).await {
            Ok(record) => record,
            Err(StoreError::AlreadyExists) => {
                return Err(IdentityError::DuplicatePrincipal(external_id));
            }
            Err(e) => return Err(e.into()),
        };

        let principal = record.to_principal();
        let (_, token) = self
            .tokens
            .mint(&VerifiedIdentity::from(&principal), self.clock.now())?;
        info!(principal = %principal.id, role = %principal.role, "principal registered");
        Ok(AuthSession { principal, token })
    }

    /// Verify credentials and mint a token.
    ///
    /// Unknown identifiers and wrong secrets fail identically, after the
    /// same amount of hashing work.
    pub async fn login_principal(&self, req: LoginRequest) -> Result<AuthSession, IdentityError> {
        req.validate()?;

        let Some(record) = self.store.find_by_external_id(&req.external_id).await? else {
            self.hasher.verify_dummy(&req.secret).await?;
            return Err(IdentityError::InvalidCredentials);
        };
        if !self.hasher.verify(&req.secret, &record.secret_hash).await? {
            return Err(IdentityError::InvalidCredentials);
        }

        let principal = record.to_principal();
        let (_, token) = self
            .tokens
            .mint(&VerifiedIdentity::from(&principal), self.clock.now())?;
        info!(principal = %principal.id, "login succeeded");
        Ok(AuthSession { principal, token })
    }

    /// Verify a token and return its identity with a renewed token.
    pub fn verify(&self, req: &VerifyTokenRequest) -> Result<VerifiedSession, IdentityError> {
        let now = self.clock.now();
        let claims = self.tokens.verify(&req.token, now)?;
        let (renewed, token) = self.tokens.renew(&claims, now)?;
        Ok(VerifiedSession {
            principal: renewed.identity(),
            token,
        })
    }

    /// Register the bootstrap administrator unless it already exists.
    pub async fn ensure_bootstrap_admin(&self, admin: &BootstrapAdmin) -> Result<(), IdentityError> {
        let req = RegisterRequest {
            external_id: ExternalId::new(&admin.external_id),
            given_name: "Bootstrap".into(),
            family_name: "Administrator".into(),
            secret: admin.secret.clone(),
            role: Role::Administrator,
        };
        match self.register_principal(req).await {
            Ok(session) => {
                info!(principal = %session.principal.id, "bootstrap administrator created");
                Ok(())
            }
            Err(IdentityError::DuplicatePrincipal(_)) => {
                info!("bootstrap administrator already present");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

impl<S: CredentialStore, C: Clock> IdentityApi for IdentityService<S, C> {
    async fn register(&self, req: RegisterRequest) -> Result<AuthSession, Fault> {
        self.register_principal(req).await.map_err(|e| {
            warn!(kind = %e.kind(), "register rejected");
            Fault::from(e)
        })
    }

    async fn login(&self, req: LoginRequest) -> Result<AuthSession, Fault> {
        self.login_principal(req).await.map_err(|e| {
            warn!(kind = %e.kind(), "login rejected");
            Fault::from(e)
        })
    }

    async fn verify_token(&self, req: VerifyTokenRequest) -> Result<VerifiedSession, Fault> {
        self.verify(&req).map_err(|e| {
            warn!(kind = %e.kind(), "token verification rejected");
            Fault::from(e)
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
    use chrono::{Duration as ChronoDuration, Utc};
    use scholarlink_models::{FaultKind, PrincipalId, Secret};

    use crate::clock::ManualClock;
    use crate::config::SigningSecret;
    use crate::secret::fast_hashing;
    use crate::store::MemoryCredentialStore;

    pub(crate) fn service(clock: ManualClock) -> IdentityService<MemoryCredentialStore, ManualClock> {
        IdentityService::new(
            MemoryCredentialStore::new(),
            SecretHasher::new(fast_hashing()).unwrap(),
            TokenIssuer::new(&SigningSecret::new("test-secret"), Duration::from_secs(6 * 3600)),
            clock,
        )
    }

    fn ana() -> RegisterRequest {
        RegisterRequest {
            external_id: ExternalId::new("11111111-1"),
            given_name: "Ana".into(),
            family_name: "Lopez".into(),
            secret: Secret::new("Secr3t!"),
            role: Role::Scholar,
        }
    }

    fn login(external_id: &str, secret: &str) -> LoginRequest {
        LoginRequest {
            external_id: ExternalId::new(external_id),
            secret: Secret::new(secret),
        }
    }

    fn claims_of(token: &str) -> serde_json::Value {
        let body = token.split('.').nth(1).unwrap();
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(body).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn register_returns_principal_and_token() {
        let svc = service(ManualClock::new(Utc::now()));
        let session = svc.register(ana()).await.unwrap();
        assert_eq!(session.principal.external_id, ExternalId::new("11111111-1"));
        assert_eq!(session.principal.role, Role::Scholar);

        let claims = claims_of(&session.token);
        assert_eq!(claims["sub"], session.principal.id.to_string());
        assert_eq!(claims["role"], "scholar");
    }

    #[tokio::test]
    async fn stored_secret_is_hashed() {
        let svc = service(ManualClock::new(Utc::now()));
        svc.register(ana()).await.unwrap();
        let record = svc
            .store()
            .find_by_external_id(&ExternalId::new("11111111-1"))
            .await
            .unwrap()
            .unwrap();
        assert_ne!(record.secret_hash, "Secr3t!");
        assert!(record.secret_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn distinct_ids_all_register() {
        let svc = service(ManualClock::new(Utc::now()));
        for i in 0..5 {
            let mut req = ana();
            req.external_id = ExternalId::new(&format!("id-{i}"));
            svc.register(req).await.unwrap();
        }
        assert_eq!(svc.store().len().await, 5);
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let svc = service(ManualClock::new(Utc::now()));
        svc.register(ana()).await.unwrap();
        let fault = svc.register(ana()).await.unwrap_err();
        assert_eq!(fault.kind, FaultKind::DuplicatePrincipal);
        assert_eq!(fault.status_code, 400);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_same_id_registration_has_one_winner() {
        let svc = Arc::new(service(ManualClock::new(Utc::now())));
        let a = tokio::spawn({
            let svc = Arc::clone(&svc);
            async move { svc.register(ana()).await }
        });
        let b = tokio::spawn({
            let svc = Arc::clone(&svc);
            async move { svc.register(ana()).await }
        });
        let results = [a.await.unwrap(), b.await.unwrap()];

        let ok = results.iter().filter(|r| r.is_ok()).count();
        let dup = results
            .iter()
            .filter(|r| matches!(r, Err(f) if f.kind == FaultKind::DuplicatePrincipal))
            .count();
        assert_eq!((ok, dup), (1, 1));
    }

    #[tokio::test]
    async fn unknown_id_and_wrong_secret_are_indistinguishable() {
        let svc = service(ManualClock::new(Utc::now()));
        svc.register(ana()).await.unwrap();

        let unknown = svc.login(login("unknown-id", "any-secret")).await.unwrap_err();
        let wrong = svc.login(login("11111111-1", "wrong-secret")).await.unwrap_err();
        assert_eq!(unknown, wrong);
        assert_eq!(unknown.kind, FaultKind::InvalidCredentials);
    }

    #[tokio::test]
    async fn login_round_trip_sub_matches_id() {
        let svc = service(ManualClock::new(Utc::now()));
        let registered = svc.register(ana()).await.unwrap();
        let session = svc.login(login("11111111-1", "Secr3t!")).await.unwrap();
        assert_eq!(session.principal, registered.principal);
        assert_eq!(claims_of(&session.token)["sub"], registered.principal.id.to_string());
    }

    #[tokio::test]
    async fn blank_fields_are_validation_failures() {
        let svc = service(ManualClock::new(Utc::now()));
        let mut req = ana();
        req.given_name = "  ".into();
        let fault = svc.register(req).await.unwrap_err();
        assert_eq!(fault.kind, FaultKind::ValidationFailure);

        let fault = svc.login(login("", "x")).await.unwrap_err();
        assert_eq!(fault.kind, FaultKind::ValidationFailure);
    }

    #[tokio::test]
    async fn verify_renews_with_later_expiry() {
        let clock = ManualClock::new(Utc::now());
        let svc = service(clock.clone());
        let session = svc.register(ana()).await.unwrap();
        let old_exp = claims_of(&session.token)["exp"].as_i64().unwrap();

        let verified = svc
            .verify_token(VerifyTokenRequest {
                token: session.token.clone(),
            })
            .await
            .unwrap();
        assert_eq!(verified.principal.id, session.principal.id);
        assert!(claims_of(&verified.token)["exp"].as_i64().unwrap() > old_exp);

        clock.advance(ChronoDuration::hours(1));
        let again = svc
            .verify_token(VerifyTokenRequest {
                token: verified.token,
            })
            .await
            .unwrap();
        assert_eq!(
            claims_of(&again.token)["exp"].as_i64().unwrap(),
            clock.now().timestamp() + 6 * 3600
        );
    }

    #[tokio::test]
    async fn expired_token_is_invalid() {
        let clock = ManualClock::new(Utc::now());
        let svc = service(clock.clone());
        let session = svc.register(ana()).await.unwrap();

        clock.advance(ChronoDuration::hours(6));
        let fault = svc
            .verify_token(VerifyTokenRequest {
                token: session.token,
            })
            .await
            .unwrap_err();
        assert_eq!(fault.kind, FaultKind::InvalidToken);
        assert_eq!(fault.status_code, 401);
    }

    #[tokio::test]
    async fn end_to_end_scenario() {
        let clock = ManualClock::new(Utc::now());
        let svc = service(clock.clone());

        let registered = svc.register(ana()).await.unwrap();
        assert_eq!(claims_of(&registered.token)["role"], "scholar");

        clock.advance(ChronoDuration::seconds(2));
        let wrong = svc.login(login("11111111-1", "wrong")).await.unwrap_err();
        assert_eq!(wrong.kind, FaultKind::InvalidCredentials);

        let logged_in = svc.login(login("11111111-1", "Secr3t!")).await.unwrap();
        assert_ne!(logged_in.token, registered.token);
        assert!(
            claims_of(&logged_in.token)["iat"].as_i64().unwrap()
                > claims_of(&registered.token)["iat"].as_i64().unwrap()
        );

        clock.advance(ChronoDuration::hours(7));
        let expired = svc
            .verify_token(VerifyTokenRequest {
                token: logged_in.token,
            })
            .await
            .unwrap_err();
        assert_eq!(expired.kind, FaultKind::InvalidToken);
    }

    #[tokio::test]
    async fn bootstrap_admin_is_idempotent() {
        let svc = service(ManualClock::new(Utc::now()));
        let admin = BootstrapAdmin {
            external_id: "root".into(),
            secret: Secret::new("root-secret"),
        };
        svc.ensure_bootstrap_admin(&admin).await.unwrap();
        svc.ensure_bootstrap_admin(&admin).await.unwrap();

        let session = svc.login(login("root", "root-secret")).await.unwrap();
        assert_eq!(session.principal.role, Role::Administrator);
    }

    #[tokio::test]
    async fn admin_token_signed_with_another_key_is_refused() {
        let clock = ManualClock::new(Utc::now());
        let svc = service(clock.clone());

        let forger = TokenIssuer::new(
            &SigningSecret::new("scholarlink-dev-signing-secret"),
            Duration::from_secs(6 * 3600),
        );
        let (_, forged) = forger
            .mint(
                &VerifiedIdentity {
                    id: PrincipalId::new(),
                    external_id: ExternalId::new("nobody"),
                    role: Role::Administrator,
                },
                clock.now(),
            )
            .unwrap();

        let fault = svc
            .verify_token(VerifyTokenRequest { token: forged })
            .await
            .unwrap_err();
        assert_eq!(fault.kind, FaultKind::InvalidToken);
    }
}
