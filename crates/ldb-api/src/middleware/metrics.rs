//! # Request Metrics
//!
//! In-process request counters kept in atomics. Cache-level counters live
//! on [`ldb_bundle::ArtifactCache`]; these count what clients saw.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Shared metrics state.
#[derive(Debug, Clone, Default)]
pub struct ApiMetrics {
    pub request_count: Arc<AtomicU64>,
    pub not_found_count: Arc<AtomicU64>,
    pub error_count: Arc<AtomicU64>,
}

impl ApiMetrics {
    /// Create a new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return current request count.
    pub fn requests(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Return how many requests answered 404.
    pub fn not_found(&self) -> u64 {
        self.not_found_count.load(Ordering::Relaxed)
    }

    /// Return how many requests answered with a server error.
    pub fn errors(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }
}

/// Middleware that increments request, not-found and error counters.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        m.request_count.fetch_add(1, Ordering::Relaxed);
        let status = response.status();
        if status == axum::http::StatusCode::NOT_FOUND {
            m.not_found_count.fetch_add(1, Ordering::Relaxed);
        } else if status.is_server_error() {
            m.error_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    response
}
