//! CLI argument parsing for fsem.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// fsem: filesystem-backed counting semaphores for unrelated processes.
///
/// Locks live as directories under a shared namespace; coordination uses
/// only atomic filesystem operations (exclusive create, rename-if-absent),
/// so any set of processes sharing a filesystem can use them — no daemon,
/// no shared memory, no network service.
#[derive(Parser, Debug)]
#[command(name = "fsem")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for fsem.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Acquire one or more named locks.
    ///
    /// For each admitted name, prints exactly one line to stdout: the
    /// absolute lock-id path that `release` and `touch` consume. Per-name
    /// failures are warnings on stderr; exit status is 0 if at least one
    /// name was admitted.
    Acquire(AcquireArgs),

    /// Release previously acquired locks.
    ///
    /// Removes exactly the given holder entries and, when one was the last
    /// holder of its lock, reclaims the emptied lock group directory.
    Release(ReleaseArgs),

    /// Extend the liveness of held locks.
    ///
    /// Bumps the modification time of the given holder entries, the signal
    /// an external reaper uses to age out abandoned locks.
    Touch(TouchArgs),

    /// List lock groups, holder counts, and in-flight modify tokens.
    List(ListArgs),
}

/// Arguments for the `acquire` command.
#[derive(Parser, Debug)]
pub struct AcquireArgs {
    /// Lock names to acquire (must not contain '/' or ':').
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Maximum concurrent holders per lock (-1 = unbounded).
    #[arg(short = 'm', long, default_value_t = -1, allow_negative_numbers = true)]
    pub max_holders: i64,

    /// Maximum seconds to wait per lock (-1 = wait forever).
    #[arg(short = 't', long, default_value_t = 10, allow_negative_numbers = true)]
    pub timeout: i64,

    /// Lock directory override (default: $FSEM_DIR, then ~/.fsem/semaphores).
    #[arg(long)]
    pub lock_dir: Option<PathBuf>,
}

/// Arguments for the `release` command.
#[derive(Parser, Debug)]
pub struct ReleaseArgs {
    /// Lock-id paths as printed by `acquire`.
    #[arg(required = true)]
    pub lock_ids: Vec<PathBuf>,
}

/// Arguments for the `touch` command.
#[derive(Parser, Debug)]
pub struct TouchArgs {
    /// Lock-id paths as printed by `acquire`.
    #[arg(required = true)]
    pub lock_ids: Vec<PathBuf>,
}

/// Arguments for the `list` command.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Lock directory override (default: $FSEM_DIR, then ~/.fsem/semaphores).
    #[arg(long)]
    pub lock_dir: Option<PathBuf>,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
