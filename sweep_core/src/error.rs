//! Error types for sweep_core.

use crate::report::DeleteReport;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using sweep_core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during deletion.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error outside of a delete attempt (e.g. resolving the root path).
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// A single path could not be deleted even after the retry.
    #[error("Unable to delete '{path}': {source}")]
    DeleteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A tree could not be fully deleted; the report lists what is known.
    #[error("{report}")]
    TreeDeleteFailed { report: Box<DeleteReport> },
}

impl Error {
    /// Create a DeleteFailed error.
    pub fn delete_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::DeleteFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a TreeDeleteFailed error.
    pub fn tree_delete_failed(report: DeleteReport) -> Self {
        Error::TreeDeleteFailed {
            report: Box::new(report),
        }
    }
}
