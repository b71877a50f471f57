//! Implementation of `fsem touch`: liveness extension.
//!
//! A holder entry's modification time is the liveness signal an external
//! reaper reads when aging out abandoned locks. Touching bumps it to now;
//! the acquire protocol itself never reads or updates it.

use crate::cli::TouchArgs;
use crate::error::{FsemError, Result};
use crate::semaphore::is_holder_path;
use std::fs::{self, FileTimes};
use std::path::Path;
use std::time::SystemTime;

pub fn cmd_touch(args: TouchArgs) -> Result<()> {
    let mut touched = 0usize;
    let mut failed = 0usize;

    for lock_id in &args.lock_ids {
        match touch_one(lock_id) {
            Ok(()) => touched += 1,
            Err(e) => {
                eprintln!("Warning: {}", e);
                failed += 1;
            }
        }
    }

    if touched == 0 && failed > 0 {
        return Err(FsemError::BatchFailed(failed));
    }
    Ok(())
}

/// Bump the modification time of one holder entry.
pub(crate) fn touch_one(lock_id: &Path) -> Result<()> {
    if !is_holder_path(lock_id) {
        return Err(FsemError::UserError(format!(
            "'{}' is not a lock-id path produced by 'fsem acquire'",
            lock_id.display()
        )));
    }

    let file = fs::File::open(lock_id).map_err(|e| {
        FsemError::UserError(format!(
            "failed to open holder '{}': {}",
            lock_id.display(),
            e
        ))
    })?;

    let now = SystemTime::now();
    file.set_times(FileTimes::new().set_accessed(now).set_modified(now))
        .map_err(|e| {
            FsemError::IoError(format!(
                "failed to update holder timestamp '{}': {}",
                lock_id.display(),
                e
            ))
        })
}
