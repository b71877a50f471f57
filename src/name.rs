//! Lock name validation.
//!
//! Names are validated before any filesystem mutation: a rejected name must
//! leave the lock namespace untouched. Two patterns are reserved for the
//! on-disk layout itself: the staging prefix used for in-flight attempt
//! trees, and the modify-token control filename.

use crate::error::{FsemError, Result};
use crate::semaphore::{STAGE_PREFIX, TOKEN_FILE};

/// A validated lock name.
///
/// Construction is only possible through [`LockName::parse`], so holding a
/// `LockName` proves the name is safe to use as a directory component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockName(String);

impl LockName {
    /// Validate a caller-supplied lock name.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(name_error(raw, "must not be empty"));
        }
        if raw.contains('/') {
            return Err(name_error(raw, "must not contain '/'"));
        }
        if raw.contains(':') {
            return Err(name_error(raw, "must not contain ':'"));
        }
        if raw.starts_with(STAGE_PREFIX) {
            return Err(name_error(
                raw,
                &format!("the '{}' prefix is reserved for staging trees", STAGE_PREFIX),
            ));
        }
        if raw == TOKEN_FILE {
            return Err(name_error(
                raw,
                &format!("'{}' is reserved for the modify token", TOKEN_FILE),
            ));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LockName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn name_error(name: &str, reason: &str) -> FsemError {
    FsemError::NameError {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
