//! The publish/admit protocol.
//!
//! One acquisition runs the state machine
//! `STAGE -> TRY_PUBLISH -> {PUBLISHED | JOIN_EXISTING} ->
//! {ADMITTED | RETRY | TIMEOUT | ABORTED}`:
//!
//! 1. If the group directory is absent, rename the staged `<name>` node into
//!    its position. At most one racer wins; the winner is admitted with its
//!    staged holder entry and needs no token.
//! 2. Otherwise join the existing group: create the modify token
//!    exclusively. A held token means contention; retry next cycle.
//! 3. Token held: enumerate holder entries. Under the bound (or unbounded),
//!    create a new holder entry, drop the token, admitted.
//! 4. At capacity: drop the token, retry next cycle.
//! 5. Budget exhausted: timeout, a per-name failure.
//! 6. Holder creation failing *after* the admission check passed means the
//!    token-protected window was invalidated: abort, never report success.

use crate::error::{FsemError, Result};
use crate::name::LockName;
use crate::semaphore::staging::StagingTree;
use crate::semaphore::token::{self, TokenAttempt};
use crate::semaphore::{HolderId, RetrySchedule, Sleeper, group_dir, holders_dir};
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum number of simultaneous holders for one lock name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// No limit: every requester is eventually admitted.
    Unbounded,
    /// At most this many holder entries at any instant.
    Max(u64),
}

impl Bound {
    /// Build a bound from the `--max-holders` flag (-1 = unbounded).
    pub fn from_flag(value: i64) -> Result<Self> {
        match value {
            -1 => Ok(Bound::Unbounded),
            n if n >= 0 => Ok(Bound::Max(n as u64)),
            other => Err(FsemError::UserError(format!(
                "invalid max holders {}: must be -1 (unbounded) or >= 0",
                other
            ))),
        }
    }

    fn admits(&self, current_holders: u64) -> bool {
        match self {
            Bound::Unbounded => true,
            Bound::Max(max) => current_holders < *max,
        }
    }
}

/// Outcome of one protocol cycle.
#[derive(Debug)]
pub(crate) enum Attempt {
    /// Admitted; the value is the lock-id path of the new holder entry.
    Admitted(PathBuf),
    /// Neither admitted nor failed; retry after one pacing unit.
    Contended,
}

/// Acquire one lock name, polling until admitted, timed out, or interrupted.
///
/// On success returns the absolute lock-id path
/// `<namespace>/<name>/<name>/<holder-id>` — the opaque token that `release`
/// and `touch` consume. All staging artifacts are cleaned up on every exit
/// path by the `StagingTree` and token guards.
///
/// `cancelled` is probed at cycle boundaries; callers wire it to the signal
/// flag so an interrupt unwinds through the guards instead of killing the
/// process mid-attempt.
pub fn acquire(
    namespace: &Path,
    name: &LockName,
    bound: Bound,
    mut schedule: RetrySchedule,
    sleeper: &dyn Sleeper,
    cancelled: &dyn Fn() -> bool,
) -> Result<PathBuf> {
    // A zero bound admits nobody; burn the retry budget without touching
    // the namespace so a rejected request leaves no trace.
    if bound == Bound::Max(0) {
        loop {
            if cancelled() {
                return Err(FsemError::Interrupted);
            }
            if !schedule.wait(sleeper) {
                return Err(FsemError::Timeout(name.as_str().to_string()));
            }
        }
    }

    let holder = HolderId::generate();
    let staging = StagingTree::build(namespace, name, &holder)?;

    loop {
        if cancelled() {
            return Err(FsemError::Interrupted);
        }

        match try_once(namespace, name, &staging, &holder, bound)? {
            Attempt::Admitted(path) => return Ok(path),
            Attempt::Contended => {
                if !schedule.wait(sleeper) {
                    return Err(FsemError::Timeout(name.as_str().to_string()));
                }
            }
        }
    }
}

/// Run one cycle of the publish/admit state machine.
pub(crate) fn try_once(
    namespace: &Path,
    name: &LockName,
    staging: &StagingTree,
    holder: &HolderId,
    bound: Bound,
) -> Result<Attempt> {
    let group = group_dir(namespace, name);
    let holders = holders_dir(namespace, name);

    // TRY_PUBLISH: rename-if-absent of the staged tree into the group
    // position. Group directories are never empty, so renaming onto a live
    // group fails and exactly one racer wins a fresh name.
    if !group.exists() {
        match fs::rename(staging.publish_source(), &group) {
            Ok(()) => {
                return Ok(Attempt::Admitted(holders.join(holder.as_str())));
            }
            Err(_) if group.is_dir() => {
                // Lost the publish race; fall through to join the winner's
                // group in this same cycle.
            }
            Err(e) => {
                return Err(FsemError::IoError(format!(
                    "failed to publish lock group '{}': {}",
                    group.display(),
                    e
                )));
            }
        }
    }

    // JOIN_EXISTING: the count-then-admit sequence is only atomic while the
    // modify token is held.
    let token = match token::try_acquire(namespace, name)? {
        TokenAttempt::Held(token) => token,
        TokenAttempt::Busy => return Ok(Attempt::Contended),
        TokenAttempt::GroupMissing => {
            // The group was released between our existence check and the
            // token create; next cycle publishes it fresh.
            return Ok(Attempt::Contended);
        }
    };

    let current = count_holders(&holders)?;
    if !bound.admits(current) {
        token.release();
        return Ok(Attempt::Contended);
    }

    match fs::create_dir(holders.join(holder.as_str())) {
        Ok(()) => {
            token.release();
            Ok(Attempt::Admitted(holders.join(holder.as_str())))
        }
        Err(e) => {
            token.release();
            Err(FsemError::ProtocolViolation {
                name: name.as_str().to_string(),
                reason: format!("holder entry could not be created after admission: {}", e),
            })
        }
    }
}

/// Count holder entries under token protection.
///
/// Direct enumeration of the holders directory, deliberately not the
/// link-count shortcut: link-count semantics for directories are
/// filesystem-specific, while `read_dir` gives the same answer everywhere.
/// A missing holders directory means a racing release tore the group down
/// around a surviving token file; recreate it and report zero holders.
fn count_holders(holders: &Path) -> Result<u64> {
    let entries = match fs::read_dir(holders) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            fs::create_dir_all(holders).map_err(|e| {
                FsemError::IoError(format!(
                    "failed to recreate holders directory '{}': {}",
                    holders.display(),
                    e
                ))
            })?;
            return Ok(0);
        }
        Err(e) => {
            return Err(FsemError::IoError(format!(
                "failed to enumerate holders in '{}': {}",
                holders.display(),
                e
            )));
        }
    };

    let mut count = 0;
    for entry in entries {
        entry.map_err(|e| {
            FsemError::IoError(format!(
                "failed to enumerate holders in '{}': {}",
                holders.display(),
                e
            ))
        })?;
        count += 1;
    }
    Ok(count)
}
