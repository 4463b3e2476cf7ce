//! ScholarLink identity service.
//!
//! The only component that reads or writes principal records and the only
//! holder of the token-signing secret. It is reached exclusively through
//! the message bus:
//!
//! 1. [`listener::serve`] receives correlated requests on the identity
//!    subjects.
//! 2. [`IdentityService`] validates input, hashes or verifies secrets, and
//!    talks to the [`CredentialStore`].
//! 3. Every failure leaves the process as a [`Fault`](scholarlink_models::Fault).

pub mod clock;
pub mod config;
pub mod error;
pub mod listener;
pub mod secret;
pub mod service;
pub mod store;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, HashingConfig, IdentityConfig, SigningSecret, StoreBackend};
pub use error::IdentityError;
pub use secret::SecretHasher;
pub use service::IdentityService;
pub use store::{
    CredentialStore, KvCredentialStore, MemoryCredentialStore, NewPrincipal, PrincipalRecord,
    StoreError,
};
pub use token::TokenIssuer;
