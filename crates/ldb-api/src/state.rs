//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor. Cloning is cheap: the cache shares its
//! internals behind `Arc`s.

use ldb_bundle::ArtifactCache;

use crate::config::{AppConfig, ConfigError};

/// Shared application state passed to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Bundle cache over the configured file store.
    pub cache: ArtifactCache,
    /// Startup configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Validate the library roots and open the cache.
    pub fn new(config: AppConfig) -> Result<Self, ConfigError> {
        let cache = config.open_cache()?;
        Ok(Self { cache, config })
    }
}
