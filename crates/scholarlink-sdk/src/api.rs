//! The identity operation seam.
//!
//! The gateway is written against [`IdentityApi`] rather than a concrete
//! transport: in production it is backed by [`IdentityClient`](crate::IdentityClient)
//! over NATS, while tests can plug in the identity service directly.

use std::future::Future;

use scholarlink_models::{
    AuthSession, Fault, LoginRequest, RegisterRequest, VerifiedSession, VerifyTokenRequest,
};

/// The three identity operations, each failing with a [`Fault`].
pub trait IdentityApi: Send + Sync {
    /// Create a principal and mint its first token.
    fn register(
        &self,
        req: RegisterRequest,
    ) -> impl Future<Output = Result<AuthSession, Fault>> + Send;

    /// Verify credentials and mint a token.
    fn login(&self, req: LoginRequest) -> impl Future<Output = Result<AuthSession, Fault>> + Send;

    /// Verify a token and mint a renewed one.
    fn verify_token(
        &self,
        req: VerifyTokenRequest,
    ) -> impl Future<Output = Result<VerifiedSession, Fault>> + Send;
}
