//! Route table and handlers.
//!
//! | Method | Path                        | Operation     |
//! |--------|-----------------------------|---------------|
//! | `POST` | `{prefix}/auth/register`    | `register`    |
//! | `POST` | `{prefix}/auth/login`       | `login`       |
//! | `GET`  | `{prefix}/auth/verify-token`| `verifyToken` |
//! | `GET`  | `{prefix}/health`           | liveness      |

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use scholarlink_models::{
    AuthSession, LoginRequest, RegisterRequest, VerifiedSession, VerifyTokenRequest,
};
use scholarlink_sdk::IdentityApi;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::config::GatewayConfig;
use crate::cors::{self, CorsPolicy};
use crate::error::GatewayError;
use crate::extract::{BearerToken, ValidatedJson};

/// Shared state for all handlers.
pub struct AppState<A> {
    /// How identity operations are reached.
    pub identity: A,
}

/// Build the full application router.
///
/// `identity` is usually an [`IdentityClient`](scholarlink_sdk::IdentityClient);
/// tests pass the identity service itself or a stub.
pub fn router<A: IdentityApi + 'static>(identity: A, config: &GatewayConfig) -> Router {
    let state = Arc::new(AppState { identity });
    let policy = Arc::new(CorsPolicy::new(config.allowed_origins.iter().cloned()));

    let api = Router::new()
        .route("/auth/register", post(register::<A>))
        .route("/auth/login", post(login::<A>))
        .route("/auth/verify-token", get(verify_token::<A>))
        .route("/health", get(health));

    let app = if config.route_prefix.is_empty() {
        api
    } else {
        Router::new().nest(&config.route_prefix, api)
    };

    app.layer(middleware::from_fn_with_state(policy, cors::enforce))
        .with_state(state)
}

/// `POST /auth/register` — create a principal and return its first token.
async fn register<A: IdentityApi>(
    State(state): State<Arc<AppState<A>>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<Json<AuthSession>, GatewayError> {
    info!(external_id = %req.external_id, role = %req.role, "register request");
    let session = state.identity.register(req).await?;
    Ok(Json(session))
}

/// `POST /auth/login` — exchange credentials for a token.
async fn login<A: IdentityApi>(
    State(state): State<Arc<AppState<A>>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthSession>, GatewayError> {
    info!(external_id = %req.external_id, "login request");
    let session = state.identity.login(req).await?;
    Ok(Json(session))
}

/// `GET /auth/verify-token` — check the bearer token and renew it.
async fn verify_token<A: IdentityApi>(
    State(state): State<Arc<AppState<A>>>,
    BearerToken(token): BearerToken,
) -> Result<Json<VerifiedSession>, GatewayError> {
    debug!("verify-token request");
    let session = state
        .identity
        .verify_token(VerifyTokenRequest { token })
        .await?;
    Ok(Json(session))
}

/// `GET /health` — liveness probe; does not touch the bus.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
