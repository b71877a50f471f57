//! Filesystem semaphore core.
//!
//! This module implements admission to a named critical section using only
//! atomic filesystem primitives, so that arbitrary, unrelated processes can
//! coordinate through a shared directory with no daemon or shared memory:
//!
//! - **exclusive create** (`create_new` / `create_dir`) for the modify token
//!   and holder entries
//! - **rename-if-absent** for publishing a new lock group
//!
//! # On-disk layout
//!
//! ```text
//! <namespace>/
//!   <name>/                      lock group (exists iff >= 1 holder)
//!     modify                     transient modify token (JSON metadata)
//!     <name>/                    holders directory
//!       <ts>-<pid>.<seq>-<ppid>/ one holder entry per admitted process
//!   stage-<holder-id>/           in-flight staging tree (process-private)
//!     <name>/<name>/<holder-id>/
//! ```
//!
//! The lock name is nested twice so that a single rename of
//! `stage-<id>/<name>` into `<namespace>/<name>` installs a fully formed
//! group with its first holder already inside. The rename is the only
//! cross-process operation that needs atomicity without prior coordination;
//! the filesystem guarantees at most one winner because group directories
//! are never empty and a rename onto a non-empty directory fails.
//!
//! Everything after a lost publish race is serialized by the modify token:
//! counting holders and deciding to admit is non-atomic on its own, so it
//! only happens while this process exclusively holds the token file.

mod holder;
mod protocol;
mod retry;
mod staging;
mod token;


use crate::name::LockName;
use std::path::{Path, PathBuf};

pub use holder::HolderId;
pub use protocol::{Bound, acquire};
pub use retry::{RetrySchedule, Sleeper, SystemSleeper};
pub use token::TokenMetadata;

#[cfg(test)]
pub(crate) use protocol::try_once;
#[cfg(test)]
pub(crate) use retry::test_support;
#[cfg(test)]
pub(crate) use staging::StagingTree;

/// Prefix of staging-tree directory names. Reserved; no lock name may start
/// with it.
pub const STAGE_PREFIX: &str = "stage-";

/// Filename of the modify token inside a lock group. Reserved as a lock name.
pub const TOKEN_FILE: &str = "modify";

/// Directory representing one named lock group.
pub fn group_dir(namespace: &Path, name: &LockName) -> PathBuf {
    namespace.join(name.as_str())
}

/// Directory holding the holder entries of a lock group.
pub fn holders_dir(namespace: &Path, name: &LockName) -> PathBuf {
    namespace.join(name.as_str()).join(name.as_str())
}

/// Path of the modify token inside a lock group.
pub fn token_path(namespace: &Path, name: &LockName) -> PathBuf {
    namespace.join(name.as_str()).join(TOKEN_FILE)
}

/// Check that a path has the shape of a lock-id returned by `acquire`:
/// `<namespace>/<name>/<name>/<holder-id>`, i.e. its parent and grandparent
/// share the same directory name. Used by `release` and `touch` to refuse
/// paths that were never handed out by this tool.
pub fn is_holder_path(path: &Path) -> bool {
    let Some(holders) = path.parent() else {
        return false;
    };
    let Some(group) = holders.parent() else {
        return false;
    };
    match (holders.file_name(), group.file_name()) {
        (Some(inner), Some(outer)) => inner == outer,
        _ => false,
    }
}
