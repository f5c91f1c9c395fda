//! # Route Modules
//!
//! Each module defines an Axum Router for one API surface area.
//! Routers are assembled under `/ldraw` in [`crate::app`].

pub mod bundle;
pub mod library;
