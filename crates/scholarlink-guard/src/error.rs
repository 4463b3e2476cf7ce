//! Error types for the `scholarlink-guard` crate.

/// Failures of local session persistence.
///
/// Verification failures are not errors here: they move the guard to
/// [`GuardState::Unauthorized`](crate::GuardState::Unauthorized).
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    /// The platform has no per-user configuration directory.
    #[error("no configuration directory available")]
    NoConfigDir,

    /// Reading or writing the session file failed.
    #[error("session file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The session file could not be encoded or decoded.
    #[error("session file is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}
