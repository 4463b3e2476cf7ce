//! Origin allow-list.
//!
//! Requests without an `Origin` header (same-origin or non-browser) pass
//! through untouched. Browser requests from an origin outside the list are
//! refused with 403; allowed origins get their preflight answered and the
//! CORS headers added to every response.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ORIGIN, VARY,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::error::GatewayError;

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
const ALLOWED_HEADERS: &str = "authorization, content-type";
const PREFLIGHT_MAX_AGE: &str = "600";

/// The set of origins allowed to call the gateway.
#[derive(Debug, Clone, Default)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
}

impl CorsPolicy {
    /// Build a policy from an explicit list of origins.
    pub fn new(allowed_origins: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            allowed_origins: allowed_origins.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `origin` is on the allow-list.
    pub fn allows(&self, origin: &str) -> bool {
        let origin = origin.trim_end_matches('/');
        self.allowed_origins.iter().any(|o| o == origin)
    }
}

/// Middleware enforcing a [`CorsPolicy`].
pub async fn enforce(
    State(policy): State<Arc<CorsPolicy>>,
    req: Request,
    next: Next,
) -> Response {
    let Some(origin) = req.headers().get(ORIGIN).cloned() else {
        return next.run(req).await;
    };

    let allowed = origin.to_str().is_ok_and(|o| policy.allows(o));
    if !allowed {
        let shown = String::from_utf8_lossy(origin.as_bytes()).into_owned();
        return GatewayError::OriginNotAllowed(shown).into_response();
    }

    if req.method() == Method::OPTIONS {
        debug!(path = %req.uri().path(), "answering preflight");
        let mut response = StatusCode::NO_CONTENT.into_response();
        let headers = response.headers_mut();
        add_cors_headers(headers, origin);
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        headers.insert(
            ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static(PREFLIGHT_MAX_AGE),
        );
        return response;
    }

    let mut response = next.run(req).await;
    add_cors_headers(response.headers_mut(), origin);
    response
}

fn add_cors_headers(headers: &mut HeaderMap, origin: HeaderValue) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.append(VARY, HeaderValue::from_static("origin"));
}
