//! # Middleware
//!
//! Tower layers shared by every route.

pub mod metrics;
pub mod tracing_layer;
