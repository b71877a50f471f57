//! Command implementations for fsem.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations.

mod acquire;
mod list;
mod release;
mod touch;

use crate::cli::Command;
use crate::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Acquire(args) => acquire::cmd_acquire(args),
        Command::Release(args) => release::cmd_release(args),
        Command::Touch(args) => touch::cmd_touch(args),
        Command::List(args) => list::cmd_list(args),
    }
}
