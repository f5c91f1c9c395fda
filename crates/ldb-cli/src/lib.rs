//! # ldb-cli — Part Bundle Command-Line Interface
//!
//! Offline access to the same bundles the HTTP service serves.
//!
//! ## Subcommands
//!
//! - `manifest`: print the `\r\n`-joined closure of a part
//! - `archive`: write the zip archive of a part's closure to a file
//! - `warm`: build and persist cache entries ahead of requests
//!
//! Library roots and cache directories are flags that fall back to the
//! service's environment variables, so the tool and the server agree on
//! where things live.
//!
//! ## Crate Policy
//!
//! - Argument structs live next to their handler.
//! - Handlers delegate to `ldb-bundle`; nothing here resolves or encodes.

pub mod archive;
pub mod library;
pub mod manifest;
pub mod warm;
