//! # Artifact Assembly
//!
//! Turns a closure into the bytes that are served and cached.
//!
//! - Archive: a zip with one entry per file, stored under its logical name.
//!   Entries are written in name order with a fixed timestamp, so equal
//!   closures give byte-identical archives.
//! - Manifest: the file names joined with `\r\n`.

use std::collections::BTreeSet;
use std::io::{Cursor, Write};

use ldb_core::{BundleId, LogicalFileName, Representation};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::closure::{resolve_files, resolve_names, Closure};
use crate::error::CacheError;
use crate::store::FileSource;

/// Separator between manifest entries.
pub const MANIFEST_LINE_TERMINATOR: &str = "\r\n";

/// Encode a closure as a zip archive.
pub fn build_archive(closure: &Closure) -> Result<Vec<u8>, CacheError> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut zip = ZipWriter::new(Cursor::new(Vec::with_capacity(closure.total_bytes())));
    for (name, data) in closure.iter() {
        zip.start_file(name.as_str(), options)?;
        zip.write_all(data).map_err(|e| CacheError::Archive(e.into()))?;
    }
    Ok(zip.finish()?.into_inner())
}

/// Encode closure names as a manifest.
pub fn build_manifest(names: &BTreeSet<LogicalFileName>) -> Vec<u8> {
    names
        .iter()
        .map(LogicalFileName::as_str)
        .collect::<Vec<_>>()
        .join(MANIFEST_LINE_TERMINATOR)
        .into_bytes()
}

/// Resolve and encode the artifact for `id` without touching the cache.
///
/// Returns `Ok(None)` when the entry file resolves to nothing.
pub fn build_artifact<S: FileSource + ?Sized>(
    store: &S,
    id: &BundleId,
    representation: Representation,
) -> Result<Option<Vec<u8>>, CacheError> {
    let entry = id.entry_file_name();
    match representation {
        Representation::Archive => {
            let closure = resolve_files(store, &entry);
            if closure.is_empty() {
                return Ok(None);
            }
            tracing::debug!(
                id = %id,
                files = closure.len(),
                bytes = closure.total_bytes(),
                "closure resolved"
            );
            build_archive(&closure).map(Some)
        }
        Representation::Manifest => {
            let names = resolve_names(store, &entry);
            if names.is_empty() {
                return Ok(None);
            }
            tracing::debug!(id = %id, files = names.len(), "closure resolved");
            Ok(Some(build_manifest(&names)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FileStore;
    use std::fs;
    use std::io::Read;
    use tempfile::tempdir;
    use zip::ZipArchive;

    fn name(raw: &str) -> LogicalFileName {
        LogicalFileName::new(raw).unwrap()
    }

    fn library() -> (tempfile::TempDir, tempfile::TempDir) {
        let parts = tempdir().unwrap();
        let prims = tempdir().unwrap();
        fs::write(
            parts.path().join("A.dat"),
            "0 Root\r\n1 16 0 0 0 1 0 0 0 1 0 0 0 1 B.dat\r\n",
        )
        .unwrap();
        fs::write(prims.path().join("B.dat"), "0 Leaf\r\n").unwrap();
        (parts, prims)
    }

    #[test]
    fn manifest_joins_with_crlf() {
        let names: BTreeSet<_> = [name("B.dat"), name("A.dat")].into_iter().collect();
        assert_eq!(build_manifest(&names), b"A.dat\r\nB.dat");
    }

    #[test]
    fn manifest_of_single_file_has_no_terminator() {
        let names: BTreeSet<_> = [name("A.dat")].into_iter().collect();
        assert_eq!(build_manifest(&names), b"A.dat");
    }

    #[test]
    fn archive_entries_are_logical_names() {
        let (parts, prims) = library();
        let store = FileStore::new(parts.path(), prims.path());
        let closure = resolve_files(&store, &name("A.dat"));
        let bytes = build_archive(&closure).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        let mut leaf = String::new();
        archive
            .by_name("B.dat")
            .unwrap()
            .read_to_string(&mut leaf)
            .unwrap();
        assert_eq!(leaf, "0 Leaf\r\n");
    }

    #[test]
    fn archive_bytes_are_reproducible() {
        let (parts, prims) = library();
        let store = FileStore::new(parts.path(), prims.path());
        let first = build_archive(&resolve_files(&store, &name("A.dat"))).unwrap();
        let second = build_archive(&resolve_files(&store, &name("A.dat"))).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn build_artifact_unknown_id_is_none() {
        let (parts, prims) = library();
        let store = FileStore::new(parts.path(), prims.path());
        let id = BundleId::new("nope").unwrap();
        for repr in Representation::ALL {
            assert!(build_artifact(&store, &id, repr).unwrap().is_none());
        }
    }

    #[test]
    fn build_artifact_manifest_for_known_id() {
        let (parts, prims) = library();
        let store = FileStore::new(parts.path(), prims.path());
        let id = BundleId::new("A").unwrap();
        let manifest = build_artifact(&store, &id, Representation::Manifest)
            .unwrap()
            .unwrap();
        assert_eq!(manifest, b"A.dat\r\nB.dat");
    }
}
