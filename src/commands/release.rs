//! Implementation of `fsem release`.
//!
//! A lock-id path names one holder entry. Releasing removes exactly that
//! entry and then, only if it was the last holder, reclaims the emptied
//! group. Reclamation uses plain non-recursive removal: a concurrent joiner
//! or publisher makes the directories non-empty again, the removal fails,
//! and the group simply lives on — no holder belonging to another process
//! is ever touched.

use crate::cli::ReleaseArgs;
use crate::error::{FsemError, Result};
use crate::semaphore::is_holder_path;
use std::fs;
use std::path::Path;

pub fn cmd_release(args: ReleaseArgs) -> Result<()> {
    let mut released = 0usize;
    let mut failed = 0usize;

    for lock_id in &args.lock_ids {
        match release_one(lock_id) {
            Ok(()) => released += 1,
            Err(e) => {
                eprintln!("Warning: {}", e);
                failed += 1;
            }
        }
    }

    if released == 0 && failed > 0 {
        return Err(FsemError::BatchFailed(failed));
    }
    Ok(())
}

/// Release one holder entry.
pub(crate) fn release_one(lock_id: &Path) -> Result<()> {
    if !is_holder_path(lock_id) {
        return Err(FsemError::UserError(format!(
            "'{}' is not a lock-id path produced by 'fsem acquire'",
            lock_id.display()
        )));
    }

    fs::remove_dir(lock_id).map_err(|e| {
        FsemError::UserError(format!(
            "failed to release holder '{}': {}",
            lock_id.display(),
            e
        ))
    })?;

    // Reclaim the group if this was the last holder. Both removals are
    // best-effort: failure means the group is (again) in use.
    if let Some(holders) = lock_id.parent()
        && fs::remove_dir(holders).is_ok()
        && let Some(group) = holders.parent()
    {
        let _ = fs::remove_dir(group);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::LockName;
    use crate::semaphore::test_support::MockSleeper;
    use crate::semaphore::{Bound, RetrySchedule, acquire, group_dir};
    use tempfile::TempDir;

    fn acquire_one(namespace: &Path, name: &str) -> std::path::PathBuf {
        let name = LockName::parse(name).unwrap();
        acquire(
            namespace,
            &name,
            Bound::Unbounded,
            RetrySchedule::new(0).unwrap(),
            &MockSleeper::new(),
            &|| false,
        )
        .unwrap()
    }

    #[test]
    fn releasing_last_holder_reclaims_the_group() {
        let temp_dir = TempDir::new().unwrap();
        let lock_id = acquire_one(temp_dir.path(), "jobA");

        release_one(&lock_id).unwrap();

        assert!(!lock_id.exists());
        let name = LockName::parse("jobA").unwrap();
        assert!(!group_dir(temp_dir.path(), &name).exists());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn releasing_one_of_two_holders_keeps_the_group() {
        let temp_dir = TempDir::new().unwrap();
        let first = acquire_one(temp_dir.path(), "jobA");
        let second = acquire_one(temp_dir.path(), "jobA");

        release_one(&first).unwrap();

        assert!(!first.exists());
        assert!(second.is_dir());
        let name = LockName::parse("jobA").unwrap();
        assert!(group_dir(temp_dir.path(), &name).is_dir());
    }

    #[test]
    fn reclaimed_group_can_be_published_again() {
        let temp_dir = TempDir::new().unwrap();
        let lock_id = acquire_one(temp_dir.path(), "jobA");
        release_one(&lock_id).unwrap();

        let again = acquire_one(temp_dir.path(), "jobA");
        assert!(again.is_dir());
        assert_ne!(again, lock_id);
    }

    #[test]
    fn rejects_paths_that_are_not_lock_ids() {
        let temp_dir = TempDir::new().unwrap();
        let stray = temp_dir.path().join("stray");
        fs::create_dir(&stray).unwrap();

        let err = release_one(&stray).unwrap_err();
        assert!(matches!(err, FsemError::UserError(_)));
        assert!(stray.is_dir());
    }

    #[test]
    fn releasing_a_missing_holder_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let lock_id = acquire_one(temp_dir.path(), "jobA");
        release_one(&lock_id).unwrap();

        let err = release_one(&lock_id).unwrap_err();
        assert!(err.to_string().contains("failed to release"));
    }
}
