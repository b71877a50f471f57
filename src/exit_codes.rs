//! Exit code constants for the fsem CLI.
//!
//! - 0: Success (at least one requested lock was admitted)
//! - 1: User error (bad args, invalid lock name, unresolvable lock directory)
//! - 2: Acquisition failure (timeout under contention, or every name failed)
//! - 3: I/O failure in the lock namespace
//! - 4: Protocol violation (admission check invalidated before commit)
//! - 130: Interrupted by SIGINT/SIGTERM

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid lock name, or bad configuration.
pub const USER_ERROR: i32 = 1;

/// Acquisition failure: retry budget exhausted or all requested names failed.
pub const ACQUIRE_FAILURE: i32 = 2;

/// I/O failure: the shared filesystem rejected an operation.
pub const IO_FAILURE: i32 = 3;

/// Protocol violation: the token-protected admission window was invalidated.
pub const PROTOCOL_FAILURE: i32 = 4;

/// Terminated by an external signal before the batch completed.
pub const INTERRUPTED: i32 = 130;
