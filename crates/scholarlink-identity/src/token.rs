//! Signed identity tokens.
//!
//! Tokens are HS256 JWTs carrying [`IdentityClaims`]. Minting is a pure
//! function of the identity, the issue instant, the lifetime, and the key.
//! Expiry is checked against the caller-supplied instant with no leeway.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use scholarlink_models::{IdentityClaims, VerifiedIdentity};

use crate::config::SigningSecret;
use crate::error::IdentityError;

/// Mints and verifies tokens with one shared key.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenIssuer {
    /// Create an issuer for `secret` with tokens living `ttl`.
    pub fn new(secret: &SigningSecret, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in `verify` against the injected clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "iat", "exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs: i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// Token lifetime in seconds.
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Claims for `identity` issued at `now`.
    pub fn claims_for(&self, identity: &VerifiedIdentity, now: DateTime<Utc>) -> IdentityClaims {
        let iat = now.timestamp();
        IdentityClaims {
            sub: identity.id,
            external_id: identity.external_id.clone(),
            role: identity.role,
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        }
    }

    /// Sign `claims` into a compact JWT.
    pub fn encode(&self, claims: &IdentityClaims) -> Result<String, IdentityError> {
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &self.encoding_key,
        )?)
    }

    /// Mint a token for `identity` issued at `now`.
    pub fn mint(
        &self,
        identity: &VerifiedIdentity,
        now: DateTime<Utc>,
    ) -> Result<(IdentityClaims, String), IdentityError> {
        let claims = self.claims_for(identity, now);
        let token = self.encode(&claims)?;
        Ok((claims, token))
    }

    /// Check signature, structure, and expiry of `token` at `now`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<IdentityClaims, IdentityError> {
        let data = jsonwebtoken::decode::<IdentityClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;
        let claims = data.claims;
        if now.timestamp() >= claims.exp {
            return Err(IdentityError::InvalidToken("token expired".into()));
        }
        Ok(claims)
    }

    /// Re-mint `claims` at `now` with a renewed window.
    ///
    /// The new expiry is strictly later than the old one even when called
    /// within the same second the old token was issued.
    pub fn renew(
        &self,
        claims: &IdentityClaims,
        now: DateTime<Utc>,
    ) -> Result<(IdentityClaims, String), IdentityError> {
        let mut renewed = self.claims_for(&claims.identity(), now);
        renewed.exp = renewed.exp.max(claims.exp.saturating_add(1));
        let token = self.encode(&renewed)?;
        Ok((renewed, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
    use chrono::Duration as ChronoDuration;
    use scholarlink_models::{ExternalId, PrincipalId, Role};

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&SigningSecret::new("test-secret"), Duration::from_secs(6 * 3600))
    }

    fn identity() -> VerifiedIdentity {
        VerifiedIdentity {
            id: PrincipalId::new(),
            external_id: ExternalId::new("11111111-1"),
            role: Role::Scholar,
        }
    }

    fn body_of(token: &str) -> serde_json::Value {
        let body_b64 = token.split('.').nth(1).unwrap();
        let body_bytes = URL_SAFE_NO_PAD.decode(body_b64).unwrap();
        serde_json::from_slice(&body_bytes).unwrap()
    }

    #[test]
    fn token_has_three_parts() {
        let (_, token) = issuer().mint(&identity(), Utc::now()).unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn token_body_carries_identity_claims() {
        let id = identity();
        let (_, token) = issuer().mint(&id, Utc::now()).unwrap();
        let body = body_of(&token);
        assert_eq!(body["sub"].as_str().unwrap(), id.id.to_string());
        assert_eq!(body["externalId"].as_str().unwrap(), "11111111-1");
        assert_eq!(body["role"].as_str().unwrap(), "scholar");
    }

    #[test]
    fn expiry_matches_ttl() {
        let (claims, token) = issuer().mint(&identity(), Utc::now()).unwrap();
        let body = body_of(&token);
        let iat = body["iat"].as_i64().unwrap();
        let exp = body["exp"].as_i64().unwrap();
        assert_eq!(exp - iat, 21_600);
        assert_eq!(claims.exp, exp);
    }

    #[test]
    fn minting_is_deterministic_for_the_same_instant() {
        let id = identity();
        let now = Utc::now();
        let (_, a) = issuer().mint(&id, now).unwrap();
        let (_, b) = issuer().mint(&id, now).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn verify_accepts_fresh_token() {
        let id = identity();
        let now = Utc::now();
        let (_, token) = issuer().mint(&id, now).unwrap();
        let claims = issuer().verify(&token, now).unwrap();
        assert_eq!(claims.identity(), id);
    }

    #[test]
    fn flipped_signature_bit_is_rejected() {
        let now = Utc::now();
        let (_, token) = issuer().mint(&identity(), now).unwrap();
        let (head, sig_b64) = token.rsplit_once('.').unwrap();
        let mut sig = URL_SAFE_NO_PAD.decode(sig_b64).unwrap();
        sig[0] ^= 0b0000_0001;
        let tampered = format!("{head}.{}", URL_SAFE_NO_PAD.encode(sig));

        let err = issuer().verify(&tampered, now).unwrap_err();
        assert!(matches!(err, IdentityError::InvalidToken(_)));
    }

    #[test]
    fn other_key_is_rejected() {
        let now = Utc::now();
        let (_, token) = issuer().mint(&identity(), now).unwrap();
        let other = TokenIssuer::new(&SigningSecret::new("other"), Duration::from_secs(60));
        assert!(matches!(
            other.verify(&token, now),
            Err(IdentityError::InvalidToken(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected_despite_valid_signature() {
        let issued = Utc::now();
        let (claims, token) = issuer().mint(&identity(), issued).unwrap();
        let at_expiry = issued + ChronoDuration::seconds(claims.exp - claims.iat);
        assert!(matches!(
            issuer().verify(&token, at_expiry),
            Err(IdentityError::InvalidToken(_))
        ));
        let just_before = at_expiry - ChronoDuration::seconds(1);
        assert!(issuer().verify(&token, just_before).is_ok());
    }

    #[test]
    fn garbage_is_rejected() {
        for token in ["", "abc", "a.b.c", "eyJhbGciOiJub25lIn0.e30."] {
            assert!(issuer().verify(token, Utc::now()).is_err(), "{token}");
        }
    }

    #[test]
    fn renew_strictly_extends_expiry() {
        let now = Utc::now();
        let (claims, _) = issuer().mint(&identity(), now).unwrap();

        // Same instant: the window cannot move forward by time alone.
        let (same_second, _) = issuer().renew(&claims, now).unwrap();
        assert!(same_second.exp > claims.exp);

        let later = now + ChronoDuration::minutes(10);
        let (renewed, token) = issuer().renew(&claims, later).unwrap();
        assert_eq!(renewed.exp, later.timestamp() + 21_600);
        assert_eq!(renewed.identity(), claims.identity());
        assert!(issuer().verify(&token, later).is_ok());
    }
}
