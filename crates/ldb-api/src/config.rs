//! # Service Configuration
//!
//! Paths and port read from the environment at startup.
//!
//! Variables:
//! - `PORT` (default: `8080`)
//! - `LDRAW_LIB`: library root holding `LDConfig.ldr` and the license
//!   files (default: `./ldraw`)
//! - `LDRAW_PARTS_DIR`: primary root (default: `$LDRAW_LIB/parts`)
//! - `LDRAW_PRIMITIVES_DIR`: fallback root (default: `$LDRAW_LIB/p`)
//! - `ZIP_DIR`: archive cache directory (default: `./zip`)
//! - `LST_DIR`: manifest cache directory (default: `./lst`)

use std::path::PathBuf;

use ldb_bundle::{ArtifactCache, CacheError, FileStore, StoreError};

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Library root with the fixed config and license files.
    pub library_root: PathBuf,
    /// Root searched first for part files.
    pub parts_dir: PathBuf,
    /// Root searched when the primary root has no match.
    pub primitives_dir: PathBuf,
    /// Directory of cached `<id>.zip` archives.
    pub archive_dir: PathBuf,
    /// Directory of cached `<id>.lst` manifests.
    pub manifest_dir: PathBuf,
}

impl AppConfig {
    /// Configuration rooted at a library directory, with default cache
    /// directories.
    pub fn for_library(library_root: impl Into<PathBuf>) -> Self {
        let library_root = library_root.into();
        Self {
            port: 8080,
            parts_dir: library_root.join("parts"),
            primitives_dir: library_root.join("p"),
            library_root,
            archive_dir: PathBuf::from("./zip"),
            manifest_dir: PathBuf::from("./lst"),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => 8080,
        };
        let library_root = lookup("LDRAW_LIB")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./ldraw"));
        let dir = |key: &str, default: PathBuf| lookup(key).map(PathBuf::from).unwrap_or(default);

        Ok(Self {
            port,
            parts_dir: dir("LDRAW_PARTS_DIR", library_root.join("parts")),
            primitives_dir: dir("LDRAW_PRIMITIVES_DIR", library_root.join("p")),
            archive_dir: dir("ZIP_DIR", PathBuf::from("./zip")),
            manifest_dir: dir("LST_DIR", PathBuf::from("./lst")),
            library_root,
        })
    }

    /// The file store over the primary and fallback roots, checked to exist.
    pub fn file_store(&self) -> Result<FileStore, ConfigError> {
        let store = FileStore::new(&self.parts_dir, &self.primitives_dir);
        store.validate()?;
        Ok(store)
    }

    /// Validate roots and open the artifact cache, creating its directories.
    pub fn open_cache(&self) -> Result<ArtifactCache, ConfigError> {
        let store = self.file_store()?;
        Ok(ArtifactCache::init(store, &self.archive_dir, &self.manifest_dir)?)
    }
}

/// Startup configuration errors. All are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PORT is not a valid port number: {0}")]
    InvalidPort(String),
    #[error(transparent)]
    MissingRoot(#[from] StoreError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}
