//! ScholarLink gateway — the only network-facing component of the
//! identity subsystem.
//!
//! Each `/auth` route is a thin forward to one identity operation through
//! an [`IdentityApi`](scholarlink_sdk::IdentityApi) implementation. The
//! gateway holds no identity state: it validates the payload against the
//! declared schema, forwards it once, and relays the result or fault.

pub mod config;
pub mod cors;
pub mod error;
pub mod extract;
pub mod routes;

pub use config::GatewayConfig;
pub use cors::CorsPolicy;
pub use error::GatewayError;
pub use routes::router;
