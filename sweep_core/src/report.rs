//! Diagnostic report for a failed tree deletion.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

pub(crate) const HELP_FAILED_CHILDREN: &str = "Failed to delete some children. This might happen because a process has files open or has its working directory set in the target directory.";
pub(crate) const HELP_NEW_CHILDREN: &str = "New files were found. This might happen because a process is still writing to the target directory.";

/// What is known about a tree that could not be fully deleted.
///
/// The two lists answer different operator questions. `failed_paths` means
/// "wait for whatever holds these open, then retry"; `new_paths` means
/// "find the process still writing into the directory and stop it".
///
/// The `Display` impl renders the report as the multi-line message carried
/// by [`Error::TreeDeleteFailed`](crate::Error::TreeDeleteFailed).
#[derive(Debug, Clone, Serialize)]
pub struct DeleteReport {
    /// Absolute path of the deletion root.
    pub root: PathBuf,
    /// Whether the root itself is a symlink.
    pub root_is_symlink: bool,
    /// Whether the root is a directory.
    pub root_is_dir: bool,
    /// Whether the traversal was eligible to descend into the root.
    pub descended: bool,
    /// Paths that could not be deleted, in the order the failures occurred.
    /// Does not include the root when the root was descended into.
    pub failed_paths: Vec<PathBuf>,
    /// More failures exist beyond `failed_paths` (the cap was reached and
    /// the traversal aborted early).
    pub more_failures: bool,
    /// Paths whose modification time is at or after the operation start,
    /// found by the secondary scan. Never contains the root or any entry
    /// of `failed_paths`.
    pub new_paths: Vec<PathBuf>,
    /// The new-paths scan stopped at the cap.
    pub more_new_paths: bool,
}

impl fmt::Display for DeleteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unable to delete ")?;
        if self.root_is_symlink {
            write!(f, "symlink to ")?;
        }
        if self.root_is_dir {
            write!(f, "directory ")?;
        } else {
            write!(f, "file ")?;
        }
        write!(f, "'{}'", self.root.display())?;

        // Child-level details only make sense for a root we walked into.
        if self.descended {
            if !self.failed_paths.is_empty() {
                write!(f, "\n  {HELP_FAILED_CHILDREN}")?;
                for path in &self.failed_paths {
                    write!(f, "\n  - {}", path.display())?;
                }
                if self.more_failures {
                    write!(f, "\n  - and more ...")?;
                }
            }
            if !self.new_paths.is_empty() {
                write!(f, "\n  {HELP_NEW_CHILDREN}")?;
                for path in &self.new_paths {
                    write!(f, "\n  - {}", path.display())?;
                }
                if self.more_new_paths {
                    write!(f, "\n  - and more ...")?;
                }
            }
        }
        Ok(())
    }
}
