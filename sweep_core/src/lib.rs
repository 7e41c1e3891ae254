//! # Sweep Core
//!
//! Reliable recursive directory deletion.
//!
//! Removing a directory tree is allowed to fail transiently on some
//! platforms: another process has a file open or its working directory set
//! inside the tree, a virus scanner is holding a handle, or the OS has not
//! yet released a handle that was closed a moment ago. This library deletes
//! trees with one retry per node and, when it still cannot finish, reports
//! exactly which paths were stuck and which paths appeared while the
//! deletion was running.
//!
//! ## Features
//!
//! - Post-order traversal with per-node failure tolerance
//! - One retry per node after a short pause, with an optional reclaim hint
//! - Bounded diagnostics: at most 16 paths are recorded before aborting
//! - A secondary scan separating "could not delete" from "appeared mid-delete"
//! - Symlinked directories are deleted as link entries, never followed,
//!   unless explicitly requested
//!
//! ## Example
//!
//! ```no_run
//! use sweep_core::Deleter;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let deleter = Deleter::new();
//!
//! // Ok(false) means there was nothing at the path to begin with.
//! let existed = deleter.delete_tree(Path::new("./build/out"), false)?;
//! println!("removed anything: {existed}");
//! # Ok(())
//! # }
//! ```

mod bounded;
mod deleter;
mod error;
mod report;

pub use deleter::{Deleter, MAX_REPORTED_PATHS};
pub use error::{Error, Result};
pub use report::DeleteReport;
