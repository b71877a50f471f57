//! Interrupt handling for the acquire batch.
//!
//! SIGINT/SIGTERM must not kill the process mid-attempt: in-flight staging
//! trees and a held modify token belong to this process and have to be
//! removed before exit. The handler only raises a flag; the batch and retry
//! loops observe it at cycle boundaries and unwind normally, which lets the
//! RAII guards run their cleanup.

use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Install the signal handler. Safe to call more than once; only the first
/// call installs. A failure to install is reported but not fatal: the tool
/// still works, it just loses cleanup-on-signal.
pub fn install() {
    static INSTALLED: AtomicBool = AtomicBool::new(false);
    if INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }
    if let Err(e) = ctrlc::set_handler(|| INTERRUPTED.store(true, Ordering::SeqCst)) {
        eprintln!("Warning: failed to install signal handler: {}", e);
    }
}

/// True once SIGINT or SIGTERM has been received.
pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}
