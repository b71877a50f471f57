//! Retry pacing for acquisition attempts.
//!
//! The protocol is poll-based by contract: there is no notification-based
//! wakeup, only a one-second sleep between attempt cycles. The schedule is
//! decoupled from the protocol behind the [`Sleeper`] trait so bounded and
//! unbounded waiting can be tested without real delays.

use crate::error::{FsemError, Result};
use std::time::Duration;

/// One pacing unit between attempt cycles.
const RETRY_UNIT: Duration = Duration::from_secs(1);

/// Injectable time source for retry pacing.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Real-time sleeper used outside of tests.
pub struct SystemSleeper;

impl Sleeper for SystemSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Remaining retry budget for one lock name.
#[derive(Debug, Clone, Copy)]
pub struct RetrySchedule {
    /// `None` = retry forever.
    remaining: Option<u64>,
}

impl RetrySchedule {
    /// Build a schedule from the `--timeout` flag: -1 waits forever, a
    /// non-negative value allows that many one-second pacing units after the
    /// initial attempt.
    pub fn new(max_wait_secs: i64) -> Result<Self> {
        match max_wait_secs {
            -1 => Ok(Self { remaining: None }),
            secs if secs >= 0 => Ok(Self {
                remaining: Some(secs as u64),
            }),
            other => Err(FsemError::UserError(format!(
                "invalid timeout {}: must be -1 (wait forever) or >= 0 seconds",
                other
            ))),
        }
    }

    /// Pace before the next attempt cycle.
    ///
    /// Returns `false` without sleeping when the budget is exhausted; the
    /// caller reports a timeout. Otherwise sleeps one unit (consuming one
    /// second of a bounded budget) and returns `true`.
    pub fn wait(&mut self, sleeper: &dyn Sleeper) -> bool {
        match &mut self.remaining {
            None => {
                sleeper.sleep(RETRY_UNIT);
                true
            }
            Some(0) => false,
            Some(remaining) => {
                *remaining -= 1;
                sleeper.sleep(RETRY_UNIT);
                true
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Sleeper;
    use std::cell::RefCell;
    use std::time::Duration;

    /// Records sleeps and runs an optional hook on each one, so tests can
    /// mutate the namespace "while the process is waiting".
    pub(crate) struct MockSleeper {
        pub slept: RefCell<Vec<Duration>>,
        hook: Option<Box<dyn Fn(usize)>>,
    }

    impl MockSleeper {
        pub(crate) fn new() -> Self {
            Self {
                slept: RefCell::new(Vec::new()),
                hook: None,
            }
        }

        pub(crate) fn with_hook(hook: impl Fn(usize) + 'static) -> Self {
            Self {
                slept: RefCell::new(Vec::new()),
                hook: Some(Box::new(hook)),
            }
        }

        pub(crate) fn sleep_count(&self) -> usize {
            self.slept.borrow().len()
        }
    }

    impl Sleeper for MockSleeper {
        fn sleep(&self, duration: Duration) {
            self.slept.borrow_mut().push(duration);
            let count = self.slept.borrow().len();
            if let Some(hook) = &self.hook {
                hook(count);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::MockSleeper;
    use super::*;

    #[test]
    fn zero_budget_allows_no_retry() {
        let mut schedule = RetrySchedule::new(0).unwrap();
        let sleeper = MockSleeper::new();

        assert!(!schedule.wait(&sleeper));
        assert_eq!(sleeper.sleep_count(), 0);
    }

    #[test]
    fn bounded_budget_sleeps_once_per_second() {
        let mut schedule = RetrySchedule::new(5).unwrap();
        let sleeper = MockSleeper::new();

        let mut waits = 0;
        while schedule.wait(&sleeper) {
            waits += 1;
        }

        assert_eq!(waits, 5);
        assert_eq!(sleeper.sleep_count(), 5);
        assert!(
            sleeper
                .slept
                .borrow()
                .iter()
                .all(|d| *d == Duration::from_secs(1))
        );
    }

    #[test]
    fn unbounded_budget_never_exhausts() {
        let mut schedule = RetrySchedule::new(-1).unwrap();
        let sleeper = MockSleeper::new();

        for _ in 0..100 {
            assert!(schedule.wait(&sleeper));
        }
        assert_eq!(sleeper.sleep_count(), 100);
    }

    #[test]
    fn negative_timeout_other_than_minus_one_is_rejected() {
        let err = RetrySchedule::new(-2).unwrap_err();
        assert!(matches!(err, FsemError::UserError(_)));
        assert!(err.to_string().contains("-2"));
    }
}
