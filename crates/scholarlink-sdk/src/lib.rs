//! # ScholarLink SDK
//!
//! Client-side plumbing for the ScholarLink identity subsystem.
//!
//! The SDK provides:
//!
//! * [`IdentityClient`] — message-bus client used by the gateway to call
//!   the identity service with explicit request correlation.
//! * [`PendingRequests`] — the correlation table behind it.
//! * [`IdentitySubjects`] — canonical subject and bucket names shared by
//!   callers and the identity service.
//! * [`IdentityApi`] — the operation seam implemented by every way of
//!   reaching the identity service.
//! * [`GatewayClient`] — HTTP client for presentation-tier callers.
//! * [`SdkError`] — unified error type for transport-level failures.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use scholarlink_models::{ExternalId, LoginRequest, Secret};
//! use scholarlink_sdk::{IdentityApi, IdentityClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = IdentityClient::connect(
//!     "nats://localhost:4222",
//!     "gateway-1",
//!     Duration::from_secs(5),
//! ).await?;
//!
//! let session = client
//!     .login(LoginRequest {
//!         external_id: ExternalId::new("11111111-1"),
//!         secret: Secret::new("Secr3t!"),
//!     })
//!     .await?;
//! println!("logged in as {}", session.principal.id);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod gateway_client;
pub mod pending;
pub mod subjects;

pub use api::IdentityApi;
pub use client::{decode_reply, encode_request, IdentityClient};
pub use error::SdkError;
pub use gateway_client::GatewayClient;
pub use pending::{PendingReply, PendingRequests, RawResponse};
pub use subjects::{IdentityOperation, IdentitySubjects};
