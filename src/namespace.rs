//! Lock namespace resolution.
//!
//! The namespace is the root directory under which all lock groups live.
//! Resolution precedence:
//!
//! 1. Explicit `--lock-dir` override
//! 2. `$FSEM_DIR`
//! 3. `$HOME/.fsem/semaphores`
//! 4. `/tmp/fsem`
//!
//! The resolved directory is created if absent and returned as an absolute
//! path. The core protocol only requires a final absolute, writable
//! directory; everything above is configuration plumbing.

use crate::error::{FsemError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the lock namespace directly.
pub const ENV_LOCK_DIR: &str = "FSEM_DIR";

/// Subpath appended to `$HOME` when `FSEM_DIR` is unset.
const HOME_SUBPATH: &str = ".fsem/semaphores";

/// Last-resort namespace when neither variable is set.
const FALLBACK_DIR: &str = "/tmp/fsem";

/// Resolve the lock namespace, creating the directory if needed.
pub fn resolve(override_dir: Option<&Path>) -> Result<PathBuf> {
    let candidate = match override_dir {
        Some(dir) => dir.to_path_buf(),
        None => match std::env::var_os(ENV_LOCK_DIR) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => match std::env::var_os("HOME") {
                Some(home) if !home.is_empty() => PathBuf::from(home).join(HOME_SUBPATH),
                _ => PathBuf::from(FALLBACK_DIR),
            },
        },
    };

    let namespace = absolutize(candidate)?;

    fs::create_dir_all(&namespace).map_err(|e| {
        FsemError::UserError(format!(
            "failed to create lock directory '{}': {}",
            namespace.display(),
            e
        ))
    })?;

    Ok(namespace)
}

/// Make a path absolute relative to the current working directory.
fn absolutize(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().map_err(|e| {
        FsemError::UserError(format!("failed to resolve current directory: {}", e))
    })?;
    Ok(cwd.join(path))
}
