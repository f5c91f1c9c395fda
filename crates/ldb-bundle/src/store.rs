//! # File Store
//!
//! Looks a [`LogicalFileName`] up in an ordered list of library roots and
//! returns the bytes from the first root that can read it. The usual
//! configuration has two roots: the part directory (`parts/`) ranked first
//! and the primitive directory (`p/`) as fallback.
//!
//! Every call performs fresh I/O. Content is never cached here; the
//! filesystem is the single source of truth.

use std::path::PathBuf;

use ldb_core::LogicalFileName;

use crate::error::StoreError;

/// A file read from a library root.
///
/// Two resolutions of the same name produce two independent values with
/// equal content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    /// Name the file was requested under.
    pub name: LogicalFileName,
    /// Raw file content.
    pub data: Vec<u8>,
}

/// Anything that can resolve a logical file name to its content.
///
/// `None` means the name could not be resolved. Callers omit it; it is
/// never fatal.
pub trait FileSource {
    /// Resolve `name` to its content.
    fn resolve(&self, name: &LogicalFileName) -> Option<ResolvedFile>;
}

impl<T: FileSource + ?Sized> FileSource for &T {
    fn resolve(&self, name: &LogicalFileName) -> Option<ResolvedFile> {
        (**self).resolve(name)
    }
}

impl<T: FileSource + ?Sized> FileSource for std::sync::Arc<T> {
    fn resolve(&self, name: &LogicalFileName) -> Option<ResolvedFile> {
        (**self).resolve(name)
    }
}

/// Ranked library roots on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileStore {
    roots: Vec<PathBuf>,
}

impl FileStore {
    /// A store with a primary root and a fallback root.
    pub fn new(primary: impl Into<PathBuf>, fallback: impl Into<PathBuf>) -> Self {
        Self {
            roots: vec![primary.into(), fallback.into()],
        }
    }

    /// A store searching `roots` in order.
    pub fn with_roots(roots: Vec<PathBuf>) -> Result<Self, StoreError> {
        if roots.is_empty() {
            return Err(StoreError::NoRoots);
        }
        Ok(Self { roots })
    }

    /// Check that every root is an existing directory.
    pub fn validate(&self) -> Result<(), StoreError> {
        match self.roots.iter().find(|root| !root.is_dir()) {
            Some(missing) => Err(StoreError::MissingRoot(missing.clone())),
            None => Ok(()),
        }
    }

    /// The configured roots, highest rank first.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl FileSource for FileStore {
    fn resolve(&self, name: &LogicalFileName) -> Option<ResolvedFile> {
        for root in &self.roots {
            let path = root.join(name.as_str());
            match std::fs::read(&path) {
                Ok(data) => {
                    return Some(ResolvedFile {
                        name: name.clone(),
                        data,
                    })
                }
                Err(e) => {
                    tracing::trace!(path = %path.display(), error = %e, "not readable in root");
                }
            }
        }
        None
    }
}
