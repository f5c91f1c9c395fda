//! # Artifact Cache
//!
//! Serves bundles from `<archive_dir>/<id>.zip` and `<manifest_dir>/<id>.lst`
//! when present, and otherwise builds them from the file store and
//! persists them for the next request.
//!
//! ## Request lifecycle
//!
//! ```text
//! lookup ── hit ──────────────────────────────────────────► Cached
//!    └── miss ─► build lock ─► lookup again ── hit ───────► Cached
//!                                 └── miss ─► resolve ── empty ─► None
//!                                               └── build ─► persist (spawned) ─► Built
//! ```
//!
//! ## Invariants
//!
//! - Artifacts are immutable once written. Nothing here expires or
//!   replaces them; operators delete stale files by hand.
//! - At most one build per `(id, representation)` runs at a time. The
//!   spawned persistence task keeps the build lock until the file is
//!   visible, so a waiter always finds it on its second lookup.
//! - Files become visible only under their final name, through a
//!   temporary file in the same directory and a rename.
//! - A failed write is logged and otherwise ignored. The caller still gets
//!   the built bytes, and the next request builds again.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ldb_core::{sha256_digest, BundleId, ContentDigest, Representation};
use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::artifact::build_artifact;
use crate::error::CacheError;
use crate::store::FileStore;

type BuildKey = (BundleId, Representation);

/// Where an artifact's bytes came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactSource {
    /// Read from the cache directory.
    Cached,
    /// Built for this request.
    Built,
}

/// A bundle ready to be sent.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub id: BundleId,
    pub representation: Representation,
    pub bytes: Vec<u8>,
    pub digest: ContentDigest,
    pub source: ArtifactSource,
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub builds: u64,
    pub not_found: u64,
    pub persist_failures: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    builds: AtomicU64,
    not_found: AtomicU64,
    persist_failures: AtomicU64,
}

/// On-disk cache of built bundles. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ArtifactCache {
    store: Arc<FileStore>,
    archive_dir: PathBuf,
    manifest_dir: PathBuf,
    locks: Arc<Mutex<HashMap<BuildKey, Arc<AsyncMutex<()>>>>>,
    counters: Arc<Counters>,
}

impl ArtifactCache {
    /// Create the cache, making both directories if they are absent.
    pub fn init(
        store: FileStore,
        archive_dir: impl Into<PathBuf>,
        manifest_dir: impl Into<PathBuf>,
    ) -> Result<Self, CacheError> {
        let archive_dir = archive_dir.into();
        let manifest_dir = manifest_dir.into();
        for dir in [&archive_dir, &manifest_dir] {
            std::fs::create_dir_all(dir).map_err(|e| CacheError::io(dir, e))?;
        }
        tracing::info!(
            archive_dir = %archive_dir.display(),
            manifest_dir = %manifest_dir.display(),
            "artifact cache ready"
        );
        Ok(Self {
            store: Arc::new(store),
            archive_dir,
            manifest_dir,
            locks: Arc::new(Mutex::new(HashMap::new())),
            counters: Arc::new(Counters::default()),
        })
    }

    /// The file store bundles are built from.
    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Directory holding artifacts of one representation.
    pub fn directory(&self, representation: Representation) -> &Path {
        match representation {
            Representation::Archive => &self.archive_dir,
            Representation::Manifest => &self.manifest_dir,
        }
    }

    /// Cache key of an artifact.
    pub fn artifact_path(&self, id: &BundleId, representation: Representation) -> PathBuf {
        self.directory(representation)
            .join(id.artifact_file_name(representation))
    }

    /// Current counter values.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            builds: self.counters.builds.load(Ordering::Relaxed),
            not_found: self.counters.not_found.load(Ordering::Relaxed),
            persist_failures: self.counters.persist_failures.load(Ordering::Relaxed),
        }
    }

    /// Fetch the artifact for `id`, building and persisting it on a miss.
    ///
    /// Returns `Ok(None)` when the identifier's entry file resolves to
    /// nothing.
    pub async fn fetch(
        &self,
        id: &BundleId,
        representation: Representation,
    ) -> Result<Option<Artifact>, CacheError> {
        if let Some(artifact) = self.lookup(id, representation).await {
            return Ok(Some(artifact));
        }

        let key = (id.clone(), representation);
        let guard = self.build_lock(&key).lock_owned().await;

        // Another request may have built it while we waited.
        if let Some(artifact) = self.lookup(id, representation).await {
            drop(guard);
            self.release_lock(&key);
            return Ok(Some(artifact));
        }

        let store = Arc::clone(&self.store);
        let build_id = id.clone();
        let built = tokio::task::spawn_blocking(move || {
            build_artifact(store.as_ref(), &build_id, representation)
        })
        .await??;

        let Some(bytes) = built else {
            self.counters.not_found.fetch_add(1, Ordering::Relaxed);
            tracing::info!(id = %id, kind = %representation, "unknown identifier");
            drop(guard);
            self.release_lock(&key);
            return Ok(None);
        };

        self.counters.builds.fetch_add(1, Ordering::Relaxed);
        let digest = sha256_digest(&bytes);
        tracing::info!(
            id = %id,
            kind = %representation,
            bytes = bytes.len(),
            digest = %digest,
            "artifact built"
        );

        self.spawn_persist(key, guard, bytes.clone(), digest);

        Ok(Some(Artifact {
            id: id.clone(),
            representation,
            bytes,
            digest,
            source: ArtifactSource::Built,
        }))
    }

    /// Wait until no build or write of `(id, representation)` is in flight.
    ///
    /// Short-lived callers use this before exiting so a spawned write is
    /// not cut off with the runtime.
    pub async fn settle(&self, id: &BundleId, representation: Representation) {
        let key = (id.clone(), representation);
        let guard = self.build_lock(&key).lock_owned().await;
        drop(guard);
        self.release_lock(&key);
    }

    /// Read a cached artifact. Unreadable files count as misses.
    async fn lookup(&self, id: &BundleId, representation: Representation) -> Option<Artifact> {
        let path = self.artifact_path(id, representation);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(id = %id, kind = %representation, bytes = bytes.len(), "cache hit");
                Some(Artifact {
                    id: id.clone(),
                    representation,
                    digest: sha256_digest(&bytes),
                    bytes,
                    source: ArtifactSource::Cached,
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cached artifact unreadable");
                None
            }
        }
    }

    fn build_lock(&self, key: &BuildKey) -> Arc<AsyncMutex<()>> {
        Arc::clone(
            self.locks
                .lock()
                .entry(key.clone())
                .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
        )
    }

    /// Drop the lock entry once nobody else holds or waits on it.
    fn release_lock(&self, key: &BuildKey) {
        release_lock(&self.locks, key);
    }

    fn spawn_persist(
        &self,
        key: BuildKey,
        guard: OwnedMutexGuard<()>,
        bytes: Vec<u8>,
        digest: ContentDigest,
    ) {
        let dir = self.directory(key.1).to_path_buf();
        let file_name = key.0.artifact_file_name(key.1);
        let locks = Arc::clone(&self.locks);
        let counters = Arc::clone(&self.counters);

        tokio::spawn(async move {
            let target = dir.join(&file_name);
            let written =
                tokio::task::spawn_blocking(move || write_atomic(&dir, &file_name, &bytes)).await;
            match written {
                Ok(Ok(())) => {
                    tracing::info!(path = %target.display(), digest = %digest, "artifact persisted");
                }
                Ok(Err(e)) => {
                    counters.persist_failures.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(error = %e, "artifact not persisted");
                }
                Err(e) => {
                    counters.persist_failures.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(path = %target.display(), error = %e, "persist task failed");
                }
            }
            drop(guard);
            release_lock(&locks, &key);
        });
    }
}

fn release_lock(locks: &Mutex<HashMap<BuildKey, Arc<AsyncMutex<()>>>>, key: &BuildKey) {
    let mut map = locks.lock();
    if map
        .get(key)
        .is_some_and(|lock| Arc::strong_count(lock) == 1)
    {
        map.remove(key);
    }
}

/// Write `bytes` to `dir/file_name` via a temporary file and a rename.
fn write_atomic(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<(), CacheError> {
    let target = dir.join(file_name);
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| CacheError::io(dir, e))?;
    tmp.write_all(bytes)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| CacheError::io(tmp.path(), e))?;
    tmp.persist(&target)
        .map_err(|e| CacheError::io(&target, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    struct Fixture {
        _lib: TempDir,
        cache_root: TempDir,
        cache: ArtifactCache,
    }

    fn fixture() -> Fixture {
        let lib = tempdir().unwrap();
        let parts = lib.path().join("parts");
        let prims = lib.path().join("p");
        fs::create_dir_all(&parts).unwrap();
        fs::create_dir_all(&prims).unwrap();
        fs::write(
            parts.join("A.dat"),
            "0 Root\r\n1 16 0 0 0 1 0 0 0 1 0 0 0 1 B.dat\r\n",
        )
        .unwrap();
        fs::write(prims.join("B.dat"), "0 Leaf\r\n").unwrap();

        let cache_root = tempdir().unwrap();
        let cache = ArtifactCache::init(
            FileStore::new(parts, prims),
            cache_root.path().join("zip"),
            cache_root.path().join("lst"),
        )
        .unwrap();
        Fixture {
            _lib: lib,
            cache_root,
            cache,
        }
    }

    fn id(raw: &str) -> BundleId {
        BundleId::new(raw).unwrap()
    }

    #[test]
    fn init_creates_directories_idempotently() {
        let fx = fixture();
        assert!(fx.cache_root.path().join("zip").is_dir());
        assert!(fx.cache_root.path().join("lst").is_dir());
        let again = ArtifactCache::init(
            fx.cache.store().clone(),
            fx.cache_root.path().join("zip"),
            fx.cache_root.path().join("lst"),
        );
        assert!(again.is_ok());
    }

    #[test]
    fn artifact_paths_follow_representation() {
        let fx = fixture();
        assert_eq!(
            fx.cache.artifact_path(&id("A"), Representation::Archive),
            fx.cache_root.path().join("zip").join("A.zip")
        );
        assert_eq!(
            fx.cache.artifact_path(&id("A"), Representation::Manifest),
            fx.cache_root.path().join("lst").join("A.lst")
        );
    }

    #[tokio::test]
    async fn miss_builds_then_hit_serves_same_bytes() {
        let fx = fixture();
        let first = fx
            .cache
            .fetch(&id("A"), Representation::Manifest)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.source, ArtifactSource::Built);
        assert_eq!(first.bytes, b"A.dat\r\nB.dat");

        let second = fx
            .cache
            .fetch(&id("A"), Representation::Manifest)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.source, ArtifactSource::Cached);
        assert_eq!(second.bytes, first.bytes);
        assert_eq!(second.digest, first.digest);

        let stats = fx.cache.stats();
        assert_eq!(stats.builds, 1);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn existing_file_is_served_without_rebuild() {
        let fx = fixture();
        let path = fx.cache.artifact_path(&id("A"), Representation::Manifest);
        fs::write(&path, "stale but trusted").unwrap();

        let artifact = fx
            .cache
            .fetch(&id("A"), Representation::Manifest)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(artifact.source, ArtifactSource::Cached);
        assert_eq!(artifact.bytes, b"stale but trusted");
        assert_eq!(fx.cache.stats().builds, 0);
    }

    #[tokio::test]
    async fn unknown_identifier_is_none_and_not_persisted() {
        let fx = fixture();
        for repr in Representation::ALL {
            let result = fx.cache.fetch(&id("missing"), repr).await.unwrap();
            assert!(result.is_none());
            assert!(!fx.cache.artifact_path(&id("missing"), repr).exists());
        }
        assert_eq!(fx.cache.stats().not_found, 2);
    }

    #[tokio::test]
    async fn persist_failure_still_serves() {
        let fx = fixture();
        fs::remove_dir_all(fx.cache_root.path().join("zip")).unwrap();

        let first = fx
            .cache
            .fetch(&id("A"), Representation::Archive)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.source, ArtifactSource::Built);
        assert!(!first.bytes.is_empty());

        // The next request waits for the failed write, then builds again.
        let second = fx
            .cache
            .fetch(&id("A"), Representation::Archive)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.source, ArtifactSource::Built);
        assert_eq!(second.bytes, first.bytes);
        assert!(fx.cache.stats().persist_failures >= 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_misses_build_once() {
        let fx = fixture();
        let mut tasks = Vec::new();
        for _ in 0..8 {
            let cache = fx.cache.clone();
            tasks.push(tokio::spawn(async move {
                cache
                    .fetch(&BundleId::new("A").unwrap(), Representation::Archive)
                    .await
                    .unwrap()
                    .unwrap()
            }));
        }
        let mut bodies = Vec::new();
        for task in tasks {
            bodies.push(task.await.unwrap().bytes);
        }
        assert!(bodies.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(fx.cache.stats().builds, 1);
    }

    #[tokio::test]
    async fn settle_waits_for_spawned_write() {
        let fx = fixture();
        fx.cache
            .fetch(&id("A"), Representation::Archive)
            .await
            .unwrap()
            .unwrap();
        fx.cache.settle(&id("A"), Representation::Archive).await;
        assert!(fx
            .cache
            .artifact_path(&id("A"), Representation::Archive)
            .is_file());
        assert!(fx.cache.locks.lock().is_empty());
    }

    #[test]
    fn write_atomic_replaces_whole_file() {
        let dir = tempdir().unwrap();
        write_atomic(dir.path(), "x.lst", b"first").unwrap();
        write_atomic(dir.path(), "x.lst", b"second").unwrap();
        assert_eq!(fs::read(dir.path().join("x.lst")).unwrap(), b"second");
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
