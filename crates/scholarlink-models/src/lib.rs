#![deny(missing_docs)]

//! # ScholarLink Models
//!
//! Core data types shared by the identity service, the gateway, and the
//! client-side route guard.
//!
//! ## Request flow
//!
//! ```text
//! HTTP body (RegisterRequest / LoginRequest / bearer token)
//! └── RpcRequest { id, payload }            gateway → identity service
//!     └── RpcResponse { correlationId, outcome }
//!         ├── RpcOutcome::Ok(AuthSession | VerifiedSession)
//!         └── RpcOutcome::Fault(Fault { statusCode, message })
//! ```
//!
//! ## Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`role`] | The closed [`Role`] enumeration |
//! | [`principal`] | Principal identifiers and the public [`Principal`] view |
//! | [`claims`] | Signed-token claims and the verified identity |
//! | [`fault`] | Fault taxonomy crossing process boundaries |
//! | [`rpc`] | Correlated request / response envelopes |
//! | [`wire`] | Operation payloads shared by HTTP and the message bus |

pub mod claims;
pub mod error;
pub mod fault;
pub mod principal;
pub mod role;
pub mod rpc;
pub mod wire;

// Re-export all public types at crate root for convenience.
pub use claims::*;
pub use error::*;
pub use fault::*;
pub use principal::*;
pub use role::*;
pub use rpc::*;
pub use wire::*;
