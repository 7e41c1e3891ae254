//! Tree deletion with retry and bounded diagnostics.

use crate::bounded::{BoundedPathSet, Insert};
use crate::error::{Error, Result};
use crate::report::DeleteReport;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, SystemTime};
use tracing::debug;

/// Maximum number of paths recorded per report section.
pub const MAX_REPORTED_PATHS: usize = 16;

/// Pause between the first and second delete attempt, giving the OS time
/// to release a handle.
const RETRY_PAUSE: Duration = Duration::from_millis(10);

type Clock = Box<dyn Fn() -> SystemTime + Send + Sync>;
type SymlinkCheck = Box<dyn Fn(&Path) -> bool + Send + Sync>;
type ReclaimHint = Box<dyn Fn() + Send + Sync>;
type RemoveFn = Box<dyn Fn(&Path) -> io::Result<bool> + Send + Sync>;

/// Deletes directory trees, tolerating transient per-node failures.
///
/// Each node gets one retry after a short pause. Failures are recorded up
/// to [`MAX_REPORTED_PATHS`]; the insertion that fills the set aborts the
/// traversal so a badly stuck tree costs bounded work. A tree that cannot
/// be fully removed produces a [`DeleteReport`] that also lists paths
/// which appeared while the deletion was running, since those explain why
/// an ostensibly empty directory refused to go away.
pub struct Deleter {
    clock: Clock,
    is_symlink: SymlinkCheck,
    reclaim_hint: Option<ReclaimHint>,
    remove: RemoveFn,
}

impl Default for Deleter {
    fn default() -> Self {
        Self::new()
    }
}

impl Deleter {
    /// Create a deleter with the system clock and platform symlink detection.
    pub fn new() -> Self {
        Self {
            clock: Box::new(SystemTime::now),
            is_symlink: Box::new(is_symlink_entry),
            reclaim_hint: None,
            remove: Box::new(remove_node),
        }
    }

    /// Replace the clock used to stamp the operation start time.
    ///
    /// The start time is compared against file modification times by the
    /// new-paths scan.
    pub fn with_clock(mut self, clock: impl Fn() -> SystemTime + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replace the symlink predicate.
    ///
    /// The predicate decides whether a directory entry is a link that must
    /// not be followed; the default uses `fs::symlink_metadata`.
    pub fn with_symlink_check(
        mut self,
        check: impl Fn(&Path) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.is_symlink = Box::new(check);
        self
    }

    /// Install a hook invoked before the retry pause.
    ///
    /// On some platforms a delete fails only because a recently dropped
    /// handle has not been released yet; a caller can use this hook to
    /// encourage its runtime to let go. No-op by default, and not required
    /// for correctness.
    pub fn with_reclaim_hint(mut self, hint: impl Fn() + Send + Sync + 'static) -> Self {
        self.reclaim_hint = Some(Box::new(hint));
        self
    }

    #[cfg(test)]
    pub(crate) fn with_remove_fn(
        mut self,
        remove: impl Fn(&Path) -> io::Result<bool> + Send + Sync + 'static,
    ) -> Self {
        self.remove = Box::new(remove);
        self
    }

    /// Delete `root` and everything beneath it.
    ///
    /// Returns `Ok(false)` without touching the filesystem when `root`
    /// does not exist, and `Ok(true)` when the tree was fully removed.
    /// Otherwise fails with [`Error::TreeDeleteFailed`]; children that
    /// were already deleted stay deleted.
    ///
    /// With `follow_symlinks` disabled (the safe choice for anything that
    /// may contain user-made links), a symlinked directory inside the tree
    /// is deleted as a link entry and its target is never entered.
    pub fn delete_tree(&self, root: &Path, follow_symlinks: bool) -> Result<bool> {
        let root = std::path::absolute(root)?;
        if !root.exists() {
            return Ok(false);
        }
        debug!(root = %root.display(), "deleting tree");
        let start_time = (self.clock)();
        let mut failed = BoundedPathSet::new(MAX_REPORTED_PATHS);
        let aborted = self.walk_delete(&root, follow_symlinks, &mut failed);
        if failed.is_empty() {
            return Ok(true);
        }
        let report = self.build_report(start_time, &root, follow_symlinks, failed, aborted);
        Err(Error::tree_delete_failed(report))
    }

    /// Delete a single file, symlink entry, or empty directory.
    ///
    /// Deleting a path that no longer exists is a success and returns
    /// `Ok(false)`. A failed attempt is retried exactly once after a short
    /// pause; the second failure is returned to the caller.
    pub fn delete(&self, path: &Path) -> Result<bool> {
        match (self.remove)(path) {
            Ok(existed) => Ok(existed),
            Err(first) => {
                debug!(path = %path.display(), error = %first, "retrying removal after failure");
                self.pause_before_retry();
                (self.remove)(path).map_err(|source| Error::delete_failed(path, source))
            }
        }
    }

    /// Post-order walk deleting children before their parent.
    ///
    /// Returns `true` when the walk aborted because the failure set filled
    /// up. Uses an explicit stack: recursion depth would otherwise track
    /// directory depth.
    fn walk_delete(
        &self,
        root: &Path,
        follow_symlinks: bool,
        failed: &mut BoundedPathSet,
    ) -> bool {
        let mut stack = vec![WalkFrame {
            path: root.to_path_buf(),
            expanded: false,
        }];
        while let Some(frame) = stack.pop() {
            if !frame.expanded && self.should_descend(&frame.path, follow_symlinks) {
                match fs::read_dir(&frame.path) {
                    Ok(entries) => {
                        // Collect before pushing so the directory handle is
                        // closed before any delete attempt.
                        let children: Vec<PathBuf> = entries
                            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
                            .collect();
                        stack.push(WalkFrame {
                            path: frame.path,
                            expanded: true,
                        });
                        // Reversed so children are visited in listing order.
                        for child in children.into_iter().rev() {
                            stack.push(WalkFrame {
                                path: child,
                                expanded: false,
                            });
                        }
                        continue;
                    }
                    Err(_) if !frame.path.exists() => {
                        // Something else removed it first; nothing to do.
                        continue;
                    }
                    // Listing failed but the directory is still there, e.g.
                    // a permissions problem. Fall through and let the delete
                    // attempt surface it.
                    Err(_) => {}
                }
            }
            if self.delete(&frame.path).is_err()
                && matches!(failed.insert(frame.path), Insert::Filled)
            {
                return true;
            }
        }
        false
    }

    fn should_descend(&self, path: &Path, follow_symlinks: bool) -> bool {
        path.is_dir() && (follow_symlinks || !(self.is_symlink)(path))
    }

    fn pause_before_retry(&self) {
        if let Some(hint) = &self.reclaim_hint {
            hint();
        }
        thread::sleep(RETRY_PAUSE);
    }

    fn build_report(
        &self,
        start_time: SystemTime,
        root: &Path,
        follow_symlinks: bool,
        mut failed: BoundedPathSet,
        more_failures: bool,
    ) -> DeleteReport {
        let root_is_symlink = (self.is_symlink)(root);
        let root_is_dir = root.is_dir();
        let descended = self.should_descend(root, follow_symlinks);
        let (new_paths, more_new_paths) = if descended {
            // The root is the subject of the report, not a child failure.
            failed.remove(root);
            self.scan_new_paths(start_time, root, &failed)
        } else {
            (Vec::new(), false)
        };
        DeleteReport {
            root: root.to_path_buf(),
            root_is_symlink,
            root_is_dir,
            descended,
            failed_paths: failed.into_vec(),
            more_failures,
            new_paths,
            more_new_paths,
        }
    }

    /// Find paths that appeared while the deletion was running.
    ///
    /// Collects up to [`MAX_REPORTED_PATHS`] paths under `root` whose
    /// modification time is at or after `start_time`, skipping the root
    /// itself and anything already reported as failed. Stops as soon as
    /// the cap is reached, so the cost stays bounded on huge trees.
    fn scan_new_paths(
        &self,
        start_time: SystemTime,
        root: &Path,
        failed: &BoundedPathSet,
    ) -> (Vec<PathBuf>, bool) {
        let mut found = BoundedPathSet::new(MAX_REPORTED_PATHS);
        let mut stack = vec![root.to_path_buf()];
        while let Some(current) = stack.pop() {
            if current != root
                && !failed.contains(&current)
                && modified_since(&current, start_time)
                && matches!(found.insert(current.clone()), Insert::Filled)
            {
                break;
            }
            if current.is_dir() {
                if let Ok(entries) = fs::read_dir(&current) {
                    for entry in entries.flatten() {
                        stack.push(entry.path());
                    }
                }
            }
        }
        let more = found.is_full();
        (found.into_vec(), more)
    }
}

struct WalkFrame {
    path: PathBuf,
    /// Children already pushed; the next visit deletes the node itself.
    expanded: bool,
}

/// Platform symlink test that does not follow the link.
fn is_symlink_entry(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|metadata| metadata.file_type().is_symlink())
        .unwrap_or(false)
}

/// Remove a single filesystem entry without following symlinks.
///
/// Idempotent: returns `Ok(false)` when the path was already gone and
/// `Ok(true)` when an entry was removed.
fn remove_node(path: &Path) -> io::Result<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    let removed = if metadata.is_dir() {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    };
    match removed {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

fn modified_since(path: &Path, start_time: SystemTime) -> bool {
    fs::symlink_metadata(path)
        .and_then(|metadata| metadata.modified())
        .map(|mtime| mtime >= start_time)
        .unwrap_or(false)
}
