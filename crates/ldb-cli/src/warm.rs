//! # Warm Subcommand
//!
//! Builds and persists cache entries so the first HTTP request for a part
//! is already a hit. Entries that exist are left untouched.

use clap::Args;
use ldb_bundle::ArtifactSource;
use ldb_core::{BundleId, Representation};

use crate::library::{CacheArgs, LibraryArgs};

/// Arguments for the warm subcommand.
#[derive(Args, Debug)]
pub struct WarmArgs {
    #[command(flatten)]
    pub library: LibraryArgs,

    #[command(flatten)]
    pub cache: CacheArgs,

    /// Warm only this representation (`zip` or `lst`); both by default.
    #[arg(long)]
    pub only: Option<Representation>,

    /// Part identifiers to warm.
    #[arg(required = true)]
    pub ids: Vec<BundleId>,
}

/// Outcome of a warm run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct WarmReport {
    /// Entries built by this run.
    pub built: usize,
    /// Entries that were already cached.
    pub cached: usize,
    /// Identifiers with no entry file.
    pub unknown: Vec<BundleId>,
}

/// Warm the cache for every requested identifier.
pub async fn run(args: &WarmArgs) -> anyhow::Result<WarmReport> {
    let cache = args.cache.open(args.library.file_store()?)?;
    let representations = match args.only {
        Some(only) => vec![only],
        None => Representation::ALL.to_vec(),
    };

    let mut report = WarmReport::default();
    for id in &args.ids {
        let mut known = true;
        for &representation in &representations {
            match cache.fetch(id, representation).await? {
                Some(artifact) => {
                    cache.settle(id, representation).await;
                    match artifact.source {
                        ArtifactSource::Built => report.built += 1,
                        ArtifactSource::Cached => report.cached += 1,
                    }
                }
                None => known = false,
            }
        }
        if !known {
            tracing::warn!(id = %id, "no part file; skipped");
            report.unknown.push(id.clone());
        }
    }

    let stats = cache.stats();
    if stats.persist_failures > 0 {
        anyhow::bail!("{} cache entries could not be written", stats.persist_failures);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(dir: &std::path::Path, library: LibraryArgs, ids: &[&str]) -> WarmArgs {
        WarmArgs {
            library,
            cache: crate::fixture::cache(&dir.join("cache")),
            only: None,
            ids: ids.iter().map(|id| id.parse().unwrap()).collect(),
        }
    }

    #[tokio::test]
    async fn builds_both_representations() {
        let (dir, library) = crate::fixture::library();
        let args = args(dir.path(), library, &["A"]);
        let report = run(&args).await.unwrap();
        assert_eq!(report.built, 2);
        assert_eq!(report.cached, 0);
        assert!(report.unknown.is_empty());

        assert!(args.cache.archive_dir.join("A.zip").is_file());
        let manifest = std::fs::read(args.cache.manifest_dir.join("A.lst")).unwrap();
        assert_eq!(manifest, b"A.dat\r\nB.dat");
    }

    #[tokio::test]
    async fn second_run_finds_everything_cached() {
        let (dir, library) = crate::fixture::library();
        let args = args(dir.path(), library, &["A"]);
        run(&args).await.unwrap();
        let report = run(&args).await.unwrap();
        assert_eq!(report.built, 0);
        assert_eq!(report.cached, 2);
    }

    #[tokio::test]
    async fn unknown_identifiers_are_reported() {
        let (dir, library) = crate::fixture::library();
        let mut args = args(dir.path(), library, &["A", "ghost"]);
        args.only = Some(Representation::Manifest);
        let report = run(&args).await.unwrap();
        assert_eq!(report.built, 1);
        assert_eq!(report.unknown, vec!["ghost".parse::<BundleId>().unwrap()]);
        assert!(!args.cache.archive_dir.join("A.zip").exists());
        assert!(!args.cache.manifest_dir.join("ghost.lst").exists());
    }
}
