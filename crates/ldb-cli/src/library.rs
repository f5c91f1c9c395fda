//! # Library and Cache Locations
//!
//! Flags shared by the subcommands. Defaults match the HTTP service.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use ldb_bundle::{ArtifactCache, FileStore};

/// Where part files are read from.
#[derive(Args, Debug, Clone)]
pub struct LibraryArgs {
    /// Library root; the part and primitive roots default beneath it.
    #[arg(long, env = "LDRAW_LIB", default_value = "./ldraw")]
    pub library: PathBuf,

    /// Primary root (default: `<library>/parts`).
    #[arg(long, env = "LDRAW_PARTS_DIR")]
    pub parts: Option<PathBuf>,

    /// Fallback root (default: `<library>/p`).
    #[arg(long, env = "LDRAW_PRIMITIVES_DIR")]
    pub primitives: Option<PathBuf>,
}

impl LibraryArgs {
    pub fn parts_dir(&self) -> PathBuf {
        self.parts
            .clone()
            .unwrap_or_else(|| self.library.join("parts"))
    }

    pub fn primitives_dir(&self) -> PathBuf {
        self.primitives
            .clone()
            .unwrap_or_else(|| self.library.join("p"))
    }

    /// The file store over both roots, checked to exist.
    pub fn file_store(&self) -> anyhow::Result<FileStore> {
        let store = FileStore::new(self.parts_dir(), self.primitives_dir());
        store.validate().context("opening part library")?;
        Ok(store)
    }
}

/// Where built bundles are cached.
#[derive(Args, Debug, Clone)]
pub struct CacheArgs {
    /// Archive cache directory.
    #[arg(long, env = "ZIP_DIR", default_value = "./zip")]
    pub archive_dir: PathBuf,

    /// Manifest cache directory.
    #[arg(long, env = "LST_DIR", default_value = "./lst")]
    pub manifest_dir: PathBuf,
}

impl CacheArgs {
    /// Open the cache over `store`, creating its directories.
    pub fn open(&self, store: FileStore) -> anyhow::Result<ArtifactCache> {
        ArtifactCache::init(store, &self.archive_dir, &self.manifest_dir)
            .context("opening bundle cache")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roots_default_beneath_library() {
        let args = LibraryArgs {
            library: PathBuf::from("/lib"),
            parts: None,
            primitives: None,
        };
        assert_eq!(args.parts_dir(), PathBuf::from("/lib/parts"));
        assert_eq!(args.primitives_dir(), PathBuf::from("/lib/p"));
    }

    #[test]
    fn explicit_roots_win() {
        let args = LibraryArgs {
            library: PathBuf::from("/lib"),
            parts: Some(PathBuf::from("/elsewhere/parts")),
            primitives: Some(PathBuf::from("/elsewhere/prims")),
        };
        assert_eq!(args.parts_dir(), PathBuf::from("/elsewhere/parts"));
        assert_eq!(args.primitives_dir(), PathBuf::from("/elsewhere/prims"));
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = LibraryArgs {
            library: dir.path().join("absent"),
            parts: None,
            primitives: None,
        };
        let err = args.file_store().unwrap_err();
        assert!(format!("{err:#}").contains("not a directory"));
    }

    #[test]
    fn cache_open_creates_directories() {
        let (dir, library) = crate::fixture::library();
        let cache = crate::fixture::cache(&dir.path().join("cache"));
        cache.open(library.file_store().unwrap()).unwrap();
        assert!(cache.archive_dir.is_dir());
        assert!(cache.manifest_dir.is_dir());
    }
}
