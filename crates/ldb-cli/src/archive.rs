//! # Archive Subcommand
//!
//! Writes the zip archive of a part's closure to a chosen path, built
//! straight from the library.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use ldb_bundle::build_artifact;
use ldb_core::{BundleId, Representation};

use crate::library::LibraryArgs;

/// Arguments for the archive subcommand.
#[derive(Args, Debug)]
pub struct ArchiveArgs {
    #[command(flatten)]
    pub library: LibraryArgs,

    /// Part identifier, without the `.dat` suffix.
    pub id: BundleId,

    /// Output file (default: `<id>.zip` in the working directory).
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

/// Build the archive and write it. Returns the path written.
pub fn run(args: &ArchiveArgs) -> anyhow::Result<PathBuf> {
    let store = args.library.file_store()?;
    let bytes = build_artifact(&store, &args.id, Representation::Archive)?
        .with_context(|| format!("no part file {}", args.id.entry_file_name()))?;

    let out = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(args.id.artifact_file_name(Representation::Archive)));
    std::fs::write(&out, &bytes).with_context(|| format!("writing {}", out.display()))?;
    tracing::info!(id = %args.id, path = %out.display(), bytes = bytes.len(), "archive written");
    Ok(out)
}
