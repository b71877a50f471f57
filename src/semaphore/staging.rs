//! Staging tree construction and cleanup.
//!
//! One acquisition attempt builds a private candidate tree under the
//! namespace root:
//!
//! ```text
//! <namespace>/stage-<holder-id>/<name>/<name>/<holder-id>/
//! ```
//!
//! The outer `stage-<holder-id>` directory is unique to this attempt, so no
//! other process ever looks inside it. Publishing renames the `<name>` child
//! into the group position; the remaining shell (and, on a failed attempt,
//! the whole tree including the unpublished holder entry) is removed when
//! the `StagingTree` is dropped.

use crate::error::{FsemError, Result};
use crate::name::LockName;
use crate::semaphore::{HolderId, STAGE_PREFIX};
use std::fs;
use std::path::{Path, PathBuf};

/// A staged candidate tree, cleaned up on drop.
#[derive(Debug)]
pub(crate) struct StagingTree {
    root: PathBuf,
    publish_source: PathBuf,
}

impl StagingTree {
    /// Build the staging tree for one attempt.
    ///
    /// Fails with an I/O error if the shared filesystem rejects directory
    /// creation; the failure is scoped to the current lock name.
    pub(crate) fn build(namespace: &Path, name: &LockName, holder: &HolderId) -> Result<Self> {
        let root = namespace.join(format!("{}{}", STAGE_PREFIX, holder));
        let publish_source = root.join(name.as_str());
        let staged_holder = publish_source.join(name.as_str()).join(holder.as_str());

        fs::create_dir(&root).map_err(|e| {
            FsemError::IoError(format!(
                "failed to create staging directory '{}': {}",
                root.display(),
                e
            ))
        })?;

        if let Err(e) = fs::create_dir_all(&staged_holder) {
            let _ = fs::remove_dir_all(&root);
            return Err(FsemError::IoError(format!(
                "failed to build staging tree '{}': {}",
                staged_holder.display(),
                e
            )));
        }

        Ok(Self {
            root,
            publish_source,
        })
    }

    /// The `<name>` node that a publish renames into the group position.
    pub(crate) fn publish_source(&self) -> &Path {
        &self.publish_source
    }
}

impl Drop for StagingTree {
    fn drop(&mut self) {
        // After a successful publish only the empty outer shell remains;
        // after a failed attempt this also removes the unpublished holder.
        if let Err(e) = fs::remove_dir_all(&self.root)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            eprintln!(
                "Warning: failed to remove staging tree '{}': {}",
                self.root.display(),
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn build_creates_double_nested_tree() {
        let temp_dir = TempDir::new().unwrap();
        let name = LockName::parse("jobA").unwrap();
        let holder = HolderId::generate();

        let staging = StagingTree::build(temp_dir.path(), &name, &holder).unwrap();

        let staged_holder = temp_dir
            .path()
            .join(format!("{}{}", STAGE_PREFIX, holder))
            .join("jobA")
            .join("jobA")
            .join(holder.as_str());
        assert!(staged_holder.is_dir());
        assert_eq!(
            staging.publish_source(),
            temp_dir
                .path()
                .join(format!("{}{}", STAGE_PREFIX, holder))
                .join("jobA")
        );
    }

    #[test]
    fn drop_removes_entire_tree() {
        let temp_dir = TempDir::new().unwrap();
        let name = LockName::parse("jobA").unwrap();
        let holder = HolderId::generate();

        let staging = StagingTree::build(temp_dir.path(), &name, &holder).unwrap();
        let root = temp_dir.path().join(format!("{}{}", STAGE_PREFIX, holder));
        assert!(root.is_dir());

        drop(staging);
        assert!(!root.exists());
        // Nothing else was left under the namespace.
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn build_fails_when_namespace_missing() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        let name = LockName::parse("jobA").unwrap();
        let holder = HolderId::generate();

        let result = StagingTree::build(&missing, &name, &holder);
        assert!(matches!(result, Err(FsemError::IoError(_))));
    }
}
