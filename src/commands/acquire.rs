//! Implementation of `fsem acquire`: the batch driver.
//!
//! Each requested name is handled independently and in request order:
//! validate, acquire, print the lock-id line. A per-name failure is a
//! single-line warning on stderr and the batch continues; stdout carries
//! nothing but lock-id paths. An interrupt stops the batch and reports the
//! subset already admitted.

use crate::cli::AcquireArgs;
use crate::error::{FsemError, Result};
use crate::interrupt;
use crate::name::LockName;
use crate::namespace;
use crate::semaphore::{self, Bound, RetrySchedule, Sleeper, SystemSleeper};
use std::path::{Path, PathBuf};

/// Result of one acquire batch.
#[derive(Debug, Default)]
pub(crate) struct BatchSummary {
    /// Lock-id paths of admitted names, in request order.
    pub admitted: Vec<PathBuf>,
    /// Number of names that failed.
    pub failed: usize,
    /// Whether the batch stopped early on a signal.
    pub interrupted: bool,
}

pub fn cmd_acquire(args: AcquireArgs) -> Result<()> {
    // Validate the numeric options before touching the filesystem.
    let bound = Bound::from_flag(args.max_holders)?;
    let schedule = RetrySchedule::new(args.timeout)?;

    let namespace = namespace::resolve(args.lock_dir.as_deref())?;

    interrupt::install();

    let summary = acquire_all(
        &namespace,
        &args.names,
        bound,
        schedule,
        &SystemSleeper,
        &interrupt::interrupted,
        |lock_id| println!("{}", lock_id.display()),
    );

    if !summary.admitted.is_empty() {
        return Ok(());
    }
    if summary.interrupted {
        return Err(FsemError::Interrupted);
    }
    Err(FsemError::BatchFailed(summary.failed))
}

/// Run the batch against a resolved namespace.
///
/// `on_admit` is called once per admission, in request order, with the
/// lock-id path; `cmd_acquire` wires it to stdout.
pub(crate) fn acquire_all(
    namespace: &Path,
    names: &[String],
    bound: Bound,
    schedule: RetrySchedule,
    sleeper: &dyn Sleeper,
    cancelled: &dyn Fn() -> bool,
    mut on_admit: impl FnMut(&Path),
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for raw in names {
        if cancelled() {
            summary.interrupted = true;
            break;
        }

        let result = LockName::parse(raw).and_then(|name| {
            semaphore::acquire(namespace, &name, bound, schedule, sleeper, cancelled)
        });

        match result {
            Ok(lock_id) => {
                on_admit(&lock_id);
                summary.admitted.push(lock_id);
            }
            Err(FsemError::Interrupted) => {
                summary.interrupted = true;
                break;
            }
            Err(e) => {
                eprintln!("Warning: {}", e);
                summary.failed += 1;
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semaphore::test_support::MockSleeper;
    use crate::semaphore::{STAGE_PREFIX, holders_dir};
    use std::fs;
    use tempfile::TempDir;

    fn run_batch(namespace: &Path, names: &[&str], bound: Bound, timeout: i64) -> BatchSummary {
        let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        acquire_all(
            namespace,
            &names,
            bound,
            RetrySchedule::new(timeout).unwrap(),
            &MockSleeper::new(),
            &|| false,
            |_| {},
        )
    }

    #[test]
    fn admits_multiple_names_in_request_order() {
        let temp_dir = TempDir::new().unwrap();

        let mut seen = Vec::new();
        let names = vec!["foo".to_string(), "bar".to_string()];
        let summary = acquire_all(
            temp_dir.path(),
            &names,
            Bound::Unbounded,
            RetrySchedule::new(0).unwrap(),
            &MockSleeper::new(),
            &|| false,
            |lock_id| seen.push(lock_id.to_path_buf()),
        );

        assert_eq!(summary.admitted.len(), 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(seen, summary.admitted);
        assert!(summary.admitted[0].starts_with(temp_dir.path().join("foo")));
        assert!(summary.admitted[1].starts_with(temp_dir.path().join("bar")));
    }

    #[test]
    fn invalid_name_fails_without_filesystem_mutation() {
        let temp_dir = TempDir::new().unwrap();

        let summary = run_batch(temp_dir.path(), &["bad/name"], Bound::Unbounded, 0);

        assert!(summary.admitted.is_empty());
        assert_eq!(summary.failed, 1);
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn per_name_failure_does_not_stop_the_batch() {
        let temp_dir = TempDir::new().unwrap();

        let summary = run_batch(
            temp_dir.path(),
            &["bad:name", "good"],
            Bound::Unbounded,
            0,
        );

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.admitted.len(), 1);
        let good = crate::name::LockName::parse("good").unwrap();
        assert_eq!(
            fs::read_dir(holders_dir(temp_dir.path(), &good))
                .unwrap()
                .count(),
            1
        );
    }

    #[test]
    fn timeout_on_one_name_is_scoped_to_that_name() {
        let temp_dir = TempDir::new().unwrap();

        // Saturate jobA, then request it plus a free name.
        let first = run_batch(temp_dir.path(), &["jobA"], Bound::Max(1), 0);
        assert_eq!(first.admitted.len(), 1);

        let summary = run_batch(temp_dir.path(), &["jobA", "jobB"], Bound::Max(1), 0);

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.admitted.len(), 1);
        assert!(summary.admitted[0].starts_with(temp_dir.path().join("jobB")));
    }

    #[test]
    fn cancellation_stops_before_the_next_name() {
        let temp_dir = TempDir::new().unwrap();

        let names = vec!["foo".to_string(), "bar".to_string()];
        let summary = acquire_all(
            temp_dir.path(),
            &names,
            Bound::Unbounded,
            RetrySchedule::new(0).unwrap(),
            &MockSleeper::new(),
            &|| true,
            |_| {},
        );

        assert!(summary.interrupted);
        assert!(summary.admitted.is_empty());
        // No staging artifacts survive the interrupted batch.
        let leftovers = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(STAGE_PREFIX))
            .count();
        assert_eq!(leftovers, 0);
    }
}
