//! Error types for the fsem CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for fsem operations.
///
/// Each variant maps to a specific exit code. Timeout-under-contention and
/// protocol violation are deliberately distinct: a timeout is an expected,
/// retryable outcome, while a protocol violation means the admission-check-to-
/// commit window was invalidated and must never be reported as success.
#[derive(Error, Debug)]
pub enum FsemError {
    /// User provided invalid arguments or the system is in an invalid state.
    #[error("{0}")]
    UserError(String),

    /// A lock name failed validation (reserved pattern or illegal character).
    #[error("invalid lock name {name:?}: {reason}")]
    NameError { name: String, reason: String },

    /// A filesystem operation in the lock namespace failed.
    #[error("{0}")]
    IoError(String),

    /// The retry budget for one lock name was exhausted without admission.
    #[error("timed out waiting for lock '{0}'")]
    Timeout(String),

    /// The admission check passed but the holder entry could not be committed.
    #[error("protocol violation acquiring lock '{name}': {reason}")]
    ProtocolViolation { name: String, reason: String },

    /// No requested lock name could be acquired.
    #[error("no locks acquired ({0} name(s) failed)")]
    BatchFailed(usize),

    /// The process received SIGINT/SIGTERM before the batch completed.
    #[error("interrupted")]
    Interrupted,
}

impl FsemError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            FsemError::UserError(_) => exit_codes::USER_ERROR,
            FsemError::NameError { .. } => exit_codes::USER_ERROR,
            FsemError::IoError(_) => exit_codes::IO_FAILURE,
            FsemError::Timeout(_) => exit_codes::ACQUIRE_FAILURE,
            FsemError::ProtocolViolation { .. } => exit_codes::PROTOCOL_FAILURE,
            FsemError::BatchFailed(_) => exit_codes::ACQUIRE_FAILURE,
            FsemError::Interrupted => exit_codes::INTERRUPTED,
        }
    }
}

/// Result type alias for fsem operations.
pub type Result<T> = std::result::Result<T, FsemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_error_has_correct_exit_code() {
        let err = FsemError::UserError("bad argument".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn name_error_has_correct_exit_code() {
        let err = FsemError::NameError {
            name: "a/b".to_string(),
            reason: "must not contain '/'".to_string(),
        };
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn timeout_has_correct_exit_code() {
        let err = FsemError::Timeout("jobA".to_string());
        assert_eq!(err.exit_code(), exit_codes::ACQUIRE_FAILURE);
    }

    #[test]
    fn protocol_violation_has_correct_exit_code() {
        let err = FsemError::ProtocolViolation {
            name: "jobA".to_string(),
            reason: "holder entry already exists".to_string(),
        };
        assert_eq!(err.exit_code(), exit_codes::PROTOCOL_FAILURE);
    }

    #[test]
    fn interrupted_has_correct_exit_code() {
        assert_eq!(FsemError::Interrupted.exit_code(), exit_codes::INTERRUPTED);
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = FsemError::Timeout("jobA".to_string());
        assert_eq!(err.to_string(), "timed out waiting for lock 'jobA'");

        let err = FsemError::NameError {
            name: "mod:ule".to_string(),
            reason: "must not contain ':'".to_string(),
        };
        assert!(err.to_string().contains("mod:ule"));
        assert!(err.to_string().contains("':'"));
    }
}
