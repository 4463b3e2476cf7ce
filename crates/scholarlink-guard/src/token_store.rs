//! Local persistence of the signed token between page loads.
//!
//! The stored identity is only a hint: the guard never trusts it until the
//! token has been re-verified.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use scholarlink_models::VerifiedIdentity;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GuardError;

const APP_DIR: &str = "scholarlink";
const SESSION_FILE: &str = "session.json";

/// What survives a reload: the token and the identity it last decoded to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    /// The signed token.
    pub token: String,
    /// The identity last verified for this token.
    pub identity: VerifiedIdentity,
}

/// Where the guard keeps its session.
pub trait TokenStore {
    /// The stored session, if one exists.
    fn load(&self) -> Result<Option<StoredSession>, GuardError>;
    /// Replace the stored session.
    fn save(&self, session: &StoredSession) -> Result<(), GuardError>;
    /// Forget the stored session.
    fn clear(&self) -> Result<(), GuardError>;
}

// ---------------------------------------------------------------------------
// File
// ---------------------------------------------------------------------------

/// JSON file in the user's configuration directory.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store the session at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/scholarlink/session.json`.
    pub fn in_config_dir() -> Result<Self, GuardError> {
        let dir = dirs::config_dir().ok_or(GuardError::NoConfigDir)?;
        Ok(Self::new(dir.join(APP_DIR).join(SESSION_FILE)))
    }

    /// The file the session is kept in.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<StoredSession>, GuardError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // An unreadable session is the same as no session.
                warn!(path = %self.path.display(), error = %e, "discarding corrupt session file");
                self.clear()?;
                Ok(None)
            }
        }
    }

    fn save(&self, session: &StoredSession) -> Result<(), GuardError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        // Write beside the target and rename so readers never see half a file.
        let staging = self.path.with_extension("json.tmp");
        write_private(&staging, json.as_bytes())?;
        fs::rename(&staging, &self.path)?;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), GuardError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Write `bytes` to a file only the owner can read.
fn write_private(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    // `mode` only applies to new files; tighten a leftover one too.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(bytes)?;
    file.sync_all()
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// Process-local store. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    slot: Arc<Mutex<Option<StoredSession>>>,
}

impl MemoryTokenStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `session`.
    pub fn with_session(session: StoredSession) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(session))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<StoredSession>, GuardError> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &StoredSession) -> Result<(), GuardError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), GuardError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
