//! Holder entry naming.

use std::sync::atomic::{AtomicU64, Ordering};

/// Process-local attempt counter. Timestamp + pid alone would collide if one
/// process acquired the same lock name twice within a second.
static ATTEMPT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Unique name for one admitted holder (or one acquisition attempt).
///
/// Format: `{unix-secs}-{pid}.{attempt-seq}-{parent-pid}`. The pid/ppid pair
/// makes the name collision-free across processes without any coordination;
/// the attempt sequence disambiguates within a process. None of the
/// components may contain `/` or `:`, so the id is always a safe single
/// path component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolderId(String);

impl HolderId {
    /// Generate a fresh id for one acquisition attempt.
    pub fn generate() -> Self {
        let secs = chrono::Utc::now().timestamp();
        let pid = std::process::id();
        let seq = ATTEMPT_SEQ.fetch_add(1, Ordering::Relaxed);
        Self(format!("{}-{}.{}-{}", secs, pid, seq, parent_pid()))
    }

    /// Construct from a fixed string. Test-only; production ids always come
    /// from `generate`.
    #[cfg(test)]
    pub(crate) fn fixed(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HolderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(unix)]
fn parent_pid() -> u32 {
    std::os::unix::process::parent_id()
}

#[cfg(not(unix))]
fn parent_pid() -> u32 {
    0
}
