//! Session credential storage
//!
//! Holds the bearer token for the authenticated session, optionally
//! persisted to a JSON file so a new process resumes where the last one
//! left off. All writes use atomic temp-file + rename to prevent
//! corruption on crash, and the file is 0600 since it contains the
//! session credential. A tokio Mutex serializes login, refresh rotation,
//! and logout.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};
use zeroize::Zeroize;

/// Errors from session persistence.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("session file parse error: {0}")]
    Parse(String),
}

/// Bearer token for the authenticated session.
///
/// Redacted in Debug/Display output and zeroed on drop.
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: String) -> Self {
        Self(token)
    }

    /// Expose the raw token (header construction only).
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl Clone for AccessToken {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl Drop for AccessToken {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// On-disk shape of a persisted session.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    token: String,
}

/// Thread-safe holder for the one session this client has.
///
/// `in_memory()` stores never touch disk (embedded use, tests). Stores
/// created with `load()` persist every change back to their file.
pub struct SessionStore {
    path: Option<PathBuf>,
    state: Mutex<Option<AccessToken>>,
}

impl SessionStore {
    /// Store without persistence.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: Mutex::new(None),
        }
    }

    /// Load a persisted session from the given file path.
    ///
    /// An absent file means logged out; it is not created until the
    /// first `set` so a never-authenticated machine leaves no trace.
    pub async fn load(path: PathBuf) -> Result<Self, SessionError> {
        let state = if path.exists() {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| SessionError::Io(format!("reading session file: {e}")))?;
            let stored: StoredSession = serde_json::from_str(&contents)
                .map_err(|e| SessionError::Parse(format!("parsing session file: {e}")))?;
            info!(path = %path.display(), "resumed persisted session");
            Some(AccessToken::new(stored.token))
        } else {
            debug!(path = %path.display(), "no session file, starting logged out");
            None
        };

        Ok(Self {
            path: Some(path),
            state: Mutex::new(state),
        })
    }

    /// Store a new bearer token (login or refresh rotation) and persist.
    pub async fn set(&self, token: String) -> Result<(), SessionError> {
        let mut state = self.state.lock().await;
        let token = AccessToken::new(token);
        if let Some(path) = &self.path {
            write_atomic(path, token.expose()).await?;
        }
        *state = Some(token);
        Ok(())
    }

    /// Clone of the current bearer token, if authenticated.
    pub async fn bearer(&self) -> Option<AccessToken> {
        self.state.lock().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.lock().await.is_some()
    }

    /// Drop the session and remove the session file, if any.
    pub async fn clear(&self) -> Result<(), SessionError> {
        let mut state = self.state.lock().await;
        *state = None;
        if let Some(path) = &self.path
            && path.exists()
        {
            tokio::fs::remove_file(path)
                .await
                .map_err(|e| SessionError::Io(format!("removing session file: {e}")))?;
            debug!(path = %path.display(), "removed session file");
        }
        Ok(())
    }

    /// Path of the backing file, when persistence is enabled.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Write the session to a file atomically.
///
/// Writes to a temporary file in the same directory, then renames it over
/// the target. Sets 0600 permissions (owner read/write only) since the
/// file contains the bearer token.
async fn write_atomic(path: &Path, token: &str) -> Result<(), SessionError> {
    let json = serde_json::to_string_pretty(&StoredSession {
        token: token.to_owned(),
    })
    .map_err(|e| SessionError::Parse(format!("serializing session: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| SessionError::Io("session path has no parent directory".into()))?;

    let tmp_path = dir.join(format!(".session.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| SessionError::Io(format!("writing temp session file: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms)
            .await
            .map_err(|e| SessionError::Io(format!("setting session file permissions: {e}")))?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| SessionError::Io(format!("renaming temp session file: {e}")))?;

    debug!(path = %path.display(), "persisted session");
    Ok(())
}
