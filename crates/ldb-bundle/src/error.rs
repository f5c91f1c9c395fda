//! # Error Types
//!
//! Only failures that abort an operation are errors here. A file missing
//! from both roots or an unresolvable reference is an empty result, not an
//! error.

use std::path::PathBuf;

use thiserror::Error;

/// A file store could not be set up.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A configured root does not exist or is not a directory.
    #[error("library root is not a directory: {}", .0.display())]
    MissingRoot(PathBuf),

    /// No roots were configured.
    #[error("at least one library root is required")]
    NoRoots,
}

/// An artifact could not be built, read, or persisted.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Filesystem failure on a cache directory or artifact.
    #[error("cache io error at {}: {source}", path.display())]
    Io {
        /// Path being read, written or created.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Zip encoding failed.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// A blocking build task panicked or was cancelled.
    #[error("build task failed: {0}")]
    Task(String),
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<tokio::task::JoinError> for CacheError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}
