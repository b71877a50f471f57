//! The modify token: a transient exclusive marker file serializing the
//! count-then-admit sequence inside one lock group.
//!
//! The token is created with `create_new` semantics, so at most one joiner
//! can hold it at a time. It records the owning pid (plus owner string and
//! creation timestamp) as JSON, and is removed within the same protocol
//! cycle that created it. A token left behind by a crashed joiner is *not*
//! reclaimed; acquisition under a stale token simply times out.

use crate::error::{FsemError, Result};
use crate::name::LockName;
use crate::semaphore::token_path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Metadata stored in the modify token file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Process id of the joiner holding the token.
    pub pid: u32,

    /// Owner of the token (e.g., `user@HOST`).
    pub owner: String,

    /// Timestamp when the token was created (RFC3339).
    pub created_at: DateTime<Utc>,
}

impl TokenMetadata {
    /// Create metadata for the current process.
    pub fn new() -> Self {
        Self {
            pid: std::process::id(),
            owner: get_owner_string(),
            created_at: Utc::now(),
        }
    }

    /// Parse token metadata from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            FsemError::IoError(format!(
                "failed to read token file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            FsemError::IoError(format!(
                "failed to parse token file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })
    }

    fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FsemError::IoError(format!("failed to serialize token metadata: {}", e)))
    }
}

impl Default for TokenMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of one token acquisition attempt.
pub(crate) enum TokenAttempt {
    /// Token created; the guard removes it when dropped or released.
    Held(TokenGuard),
    /// Another joiner currently holds the token.
    Busy,
    /// The lock group directory disappeared underneath us (a racing release
    /// removed it); the caller should fall back to publishing.
    GroupMissing,
}

/// Try to create the modify token inside a lock group exclusively.
pub(crate) fn try_acquire(namespace: &Path, name: &LockName) -> Result<TokenAttempt> {
    let path = token_path(namespace, name);

    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Ok(TokenAttempt::Busy);
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(TokenAttempt::GroupMissing);
        }
        Err(e) => {
            return Err(FsemError::IoError(format!(
                "failed to create modify token '{}': {}",
                path.display(),
                e
            )));
        }
    };

    let json = TokenMetadata::new().to_json()?;
    file.write_all(json.as_bytes()).map_err(|e| {
        // The token exists; remove it so we never wedge the group.
        let _ = fs::remove_file(&path);
        FsemError::IoError(format!("failed to write token metadata: {}", e))
    })?;

    Ok(TokenAttempt::Held(TokenGuard {
        path,
        released: false,
    }))
}

/// RAII guard for a held modify token.
///
/// The token file is removed when the guard is released or dropped. Removal
/// is best-effort: a failure is reported as a warning, never as an error,
/// since by that point the admission decision has already been made.
#[derive(Debug)]
pub(crate) struct TokenGuard {
    path: PathBuf,
    released: bool,
}

impl TokenGuard {
    /// Remove the token now instead of at end of scope.
    pub(crate) fn release(mut self) {
        self.released = true;
        remove_token(&self.path);
    }
}

impl Drop for TokenGuard {
    fn drop(&mut self) {
        if !self.released {
            remove_token(&self.path);
        }
    }
}

fn remove_token(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "Warning: failed to remove modify token '{}': {}",
            path.display(),
            e
        );
    }
}

/// Get the owner string for token metadata.
pub(crate) fn get_owner_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}
