//! # ldb-bundle — Part Bundles
//!
//! Resolves an entry part file to every file it transitively references,
//! packages that closure as a zip archive or a plain-text manifest, and
//! caches the result on disk.
//!
//! ## Components
//!
//! | Module        | Role                                                        |
//! |---------------|-------------------------------------------------------------|
//! | [`store`]     | Ranked library roots, first match wins                      |
//! | [`closure`]   | Transitive resolution keyed by file name, cycle-safe        |
//! | [`artifact`]  | Zip archive and `\r\n` manifest assembly                    |
//! | [`cache`]     | Cache lookup, per-identifier build lock, atomic persistence |
//!
//! ## Flow
//!
//! ```text
//! ArtifactCache::fetch(id, repr)
//!   ├── hit  → read <dir>/<id>.<ext>
//!   └── miss → resolve_files / resolve_names(<id>.dat)
//!                ├── empty     → Ok(None)            (unknown identifier)
//!                └── non-empty → build, persist (spawned), return bytes
//! ```

pub mod artifact;
pub mod cache;
pub mod closure;
pub mod error;
pub mod store;

pub use artifact::{build_archive, build_artifact, build_manifest, MANIFEST_LINE_TERMINATOR};
pub use cache::{Artifact, ArtifactCache, ArtifactSource, CacheStats};
pub use closure::{resolve_files, resolve_names, Closure};
pub use error::{CacheError, StoreError};
pub use store::{FileSource, FileStore, ResolvedFile};
