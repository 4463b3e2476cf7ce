//! Request extractors that report failures as faults.

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use scholarlink_models::{LoginRequest, ModelError, RegisterRequest};
use serde::de::DeserializeOwned;

use crate::error::GatewayError;

/// Payloads that carry content checks beyond deserialization.
pub trait Validate {
    /// Check field contents.
    fn validate(&self) -> Result<(), ModelError>;
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ModelError> {
        RegisterRequest::validate(self)
    }
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ModelError> {
        LoginRequest::validate(self)
    }
}

/// JSON body that has been deserialized *and* validated.
///
/// Unknown fields, wrong types, missing fields, and blank values all
/// become a `validationFailure` fault before anything is forwarded.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| GatewayError::Validation(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Token taken from an `Authorization: Bearer <token>` header.
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_bearer(&parts.headers)
            .map(|token| Self(token.to_string()))
            .ok_or(GatewayError::MissingBearer)
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum::http::header::AUTHORIZATION;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_is_extracted() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(extract_bearer(&headers("Bearer  abc ")), Some("abc"));
    }

    #[test]
    fn non_bearer_headers_are_rejected() {
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
        assert_eq!(extract_bearer(&headers("Basic dXNlcg==")), None);
        assert_eq!(extract_bearer(&headers("Bearer ")), None);
        assert_eq!(extract_bearer(&headers("bearer abc")), None);
    }
}
