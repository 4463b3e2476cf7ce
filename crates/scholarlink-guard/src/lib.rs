//! # ScholarLink Guard
//!
//! Presentation-tier half of the identity subsystem. A [`RouteGuard`]
//! holds the currently verified identity, re-verifies the stored token on
//! load, and answers every navigation with exactly one
//! [`Navigation`]: render the target or redirect somewhere else.
//!
//! ```text
//! Unknown ──(token found)──▶ Verifying ──(ok)────▶ Authorized(role)
//!    │                          │                        │
//!    └──(no token)──────────────┴──(fault)──▶ Unauthorized ◀──(logout / auth fault)
//! ```
//!
//! Authorization decisions go through one function,
//! [`RouteTable::is_allowed`].

pub mod error;
pub mod guard;
pub mod routes;
pub mod token_store;

pub use error::GuardError;
pub use guard::{GuardState, Navigation, RouteGuard, VerificationTicket};
pub use routes::{home_route, RoutePolicy, RouteTable, LOGIN_ROUTE};
pub use token_store::{FileTokenStore, MemoryTokenStore, StoredSession, TokenStore};
