//! # ldb-core — Foundational Types for the LDraw Bundler
//!
//! Defines the identifiers and the parsing step that every other crate in
//! the workspace builds on. Nothing in this crate touches the filesystem.
//!
//! ## Key Design Principles
//!
//! 1. **Newtypes for names.** `LogicalFileName` and `BundleId` are validated
//!    on construction. A value of either type can never escape a library
//!    root or a cache directory when joined onto it.
//!
//! 2. **Backslash normalization happens once.** `LogicalFileName::new`
//!    rewrites `\` to `/`, so every comparison and map key downstream sees
//!    the same spelling.
//!
//! 3. **Extraction is pure.** [`extract_references`] maps file bytes to the
//!    set of referenced names and performs no I/O.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ldb-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod digest;
pub mod error;
pub mod name;
pub mod reference;

// Re-export primary types for ergonomic imports.
pub use digest::{sha256_digest, ContentDigest};
pub use error::{NameError, UnknownRepresentation};
pub use name::{BundleId, LogicalFileName, Representation, ENTRY_EXTENSION};
pub use reference::{extract_references, is_reference_line, REFERENCE_LINE_MARKER};
