//! HTTP client for the gateway's `/auth` routes.
//!
//! Used by presentation-tier code (and the route guard) that talks to the
//! gateway rather than to the message bus. Non-success responses are
//! decoded back into the [`Fault`] the gateway relayed.

use reqwest::StatusCode;
use scholarlink_models::{
    AuthSession, Fault, FaultKind, LoginRequest, RegisterRequest, VerifiedSession,
    VerifyTokenRequest,
};
use serde::de::DeserializeOwned;

use crate::api::IdentityApi;
use crate::error::SdkError;

/// Calls the gateway over HTTP.
#[derive(Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    /// `base_url` includes the global prefix, e.g. `http://localhost:3000/api`.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn decode<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, Fault> {
        let status = res.status();
        if status.is_success() {
            return res.json::<T>().await.map_err(|e| SdkError::from(e).into());
        }
        let text = res.text().await.map_err(SdkError::from)?;
        Err(serde_json::from_str::<Fault>(&text).unwrap_or_else(|_| fault_for_status(status, text)))
    }
}

/// Fallback when the body is not a fault object (e.g. a proxy error page).
fn fault_for_status(status: StatusCode, body: String) -> Fault {
    let kind = match status.as_u16() {
        401 => FaultKind::InvalidToken,
        400 | 403 | 422 => FaultKind::ValidationFailure,
        502..=504 => FaultKind::UpstreamUnavailable,
        _ => FaultKind::Internal,
    };
    Fault::new(kind, body)
}

impl IdentityApi for GatewayClient {
    async fn register(&self, req: RegisterRequest) -> Result<AuthSession, Fault> {
        let res = self
            .http
            .post(format!("{}/auth/register", self.base_url))
            .json(&req)
            .send()
            .await
            .map_err(SdkError::from)?;
        Self::decode(res).await
    }

    async fn login(&self, req: LoginRequest) -> Result<AuthSession, Fault> {
        let res = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .json(&req)
            .send()
            .await
            .map_err(SdkError::from)?;
        Self::decode(res).await
    }

    async fn verify_token(&self, req: VerifyTokenRequest) -> Result<VerifiedSession, Fault> {
        let res = self
            .http
            .get(format!("{}/auth/verify-token", self.base_url))
            .bearer_auth(&req.token)
            .send()
            .await
            .map_err(SdkError::from)?;
        Self::decode(res).await
    }
}
