//! Canonical subject definitions for the identity message bus.
//!
//! All subject strings used between the gateway and the identity service
//! **must** be built through [`IdentitySubjects`] so that both sides agree
//! on a single naming convention.
//!
//! # Subject layout
//!
//! ```text
//! scholarlink.v1.identity.register          ← gateway REQUESTS here
//! scholarlink.v1.identity.login
//! scholarlink.v1.identity.verifyToken
//! scholarlink.v1.identity.*                 ← identity service wildcard
//! scholarlink.v1.gateway.{instance}.reply   ← replies for one gateway
//! ```
//!
//! # KV bucket names
//!
//! ```text
//! scholarlink-v1-principals                 ← credential store
//! ```

use std::fmt;

/// Current subject version prefix.
const VERSION: &str = "v1";

/// The operations the identity service answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityOperation {
    /// Create a principal.
    Register,
    /// Verify credentials.
    Login,
    /// Verify and renew a token.
    VerifyToken,
}

impl IdentityOperation {
    /// Every operation, in subject order.
    pub const ALL: [IdentityOperation; 3] = [Self::Register, Self::Login, Self::VerifyToken];

    /// The final subject token for this operation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Login => "login",
            Self::VerifyToken => "verifyToken",
        }
    }
}

impl fmt::Display for IdentityOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Central authority for subject, queue-group, and bucket names.
///
/// # Examples
///
/// ```
/// use scholarlink_sdk::{IdentityOperation, IdentitySubjects};
///
/// assert_eq!(
///     IdentitySubjects::operation(IdentityOperation::VerifyToken),
///     "scholarlink.v1.identity.verifyToken",
/// );
/// assert_eq!(
///     IdentitySubjects::reply("gw-1"),
///     "scholarlink.v1.gateway.gw-1.reply",
/// );
/// ```
pub struct IdentitySubjects;

impl IdentitySubjects {
    /// Queue group shared by identity service instances.
    pub const QUEUE_GROUP: &'static str = "scholarlink-identity";

    /// Subject a caller publishes an operation request on.
    pub fn operation(op: IdentityOperation) -> String {
        format!("scholarlink.{VERSION}.identity.{op}")
    }

    /// Wildcard matching every identity operation.
    pub fn operation_wildcard() -> String {
        format!("scholarlink.{VERSION}.identity.*")
    }

    /// Subject a gateway instance receives its replies on.
    pub fn reply(instance: &str) -> String {
        format!("scholarlink.{VERSION}.gateway.{instance}.reply")
    }

    /// KV bucket holding principal records.
    pub fn kv_principals() -> String {
        format!("scholarlink-{VERSION}-principals")
    }

    /// Resolve an operation subject back to its operation.
    ///
    /// Returns `None` for anything outside the identity namespace.
    pub fn parse_operation(subject: &str) -> Option<IdentityOperation> {
        let parts: Vec<&str> = subject.splitn(4, '.').collect();
        if parts.len() != 4
            || parts[0] != "scholarlink"
            || parts[1] != VERSION
            || parts[2] != "identity"
        {
            return None;
        }
        IdentityOperation::ALL
            .into_iter()
            .find(|op| op.as_str() == parts[3])
    }
}
