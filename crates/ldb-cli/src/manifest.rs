//! # Manifest Subcommand
//!
//! Prints the closure of `<id>.dat` as it would be served from
//! `/ldraw/bundle/<id>.lst`. Reads the library directly; the cache is
//! neither consulted nor written.

use std::io::Write;

use anyhow::Context;
use clap::Args;
use ldb_bundle::{build_artifact, FileSource};
use ldb_core::{BundleId, Representation};

use crate::library::LibraryArgs;

/// Arguments for the manifest subcommand.
#[derive(Args, Debug)]
pub struct ManifestArgs {
    #[command(flatten)]
    pub library: LibraryArgs,

    /// Part identifier, without the `.dat` suffix.
    pub id: BundleId,
}

/// Write the manifest for `args.id` to `out`.
pub fn run(args: &ManifestArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let store = args.library.file_store()?;
    write_manifest(&store, &args.id, out)
}

fn write_manifest<S: FileSource>(
    store: &S,
    id: &BundleId,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let manifest = build_artifact(store, id, Representation::Manifest)?
        .with_context(|| format!("no part file {}", id.entry_file_name()))?;
    out.write_all(&manifest)?;
    // The served manifest has no trailing terminator; a terminal wants one.
    writeln!(out)?;
    out.flush().context("writing manifest")?;
    Ok(())
}
