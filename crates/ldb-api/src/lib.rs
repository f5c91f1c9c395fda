//! # ldb-api — Axum HTTP Service for Part Bundles
//!
//! Serves the dependency closure of an LDraw part as a zip archive or a
//! manifest, caching each on disk, and exposes the part library itself
//! read-only.
//!
//! ## API Surface
//!
//! | Route                                | Module                 |
//! |--------------------------------------|------------------------|
//! | `/ldraw/bundle/{id}.zip` / `.lst`    | [`routes::bundle`]     |
//! | `/ldraw/data/parts/*`                | [`routes::library`]    |
//! | `/ldraw/config/*`, `/ldraw/license/*`| [`routes::library`]    |
//! | `/health/*`                          | this module            |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! CorsLayer → TraceLayer → MetricsMiddleware → Handler
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::http::Uri;
use axum::middleware::from_fn;
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::error::AppError;
use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

pub use config::{AppConfig, ConfigError};

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    app_with_metrics(state, ApiMetrics::new())
}

/// Assemble the application, recording into the given metrics.
pub fn app_with_metrics(state: AppState, metrics: ApiMetrics) -> Router {
    let ldraw = Router::new()
        .merge(routes::bundle::router())
        .merge(routes::library::router(&state.config));

    let api = Router::new()
        .nest("/ldraw", ldraw)
        .fallback(not_found)
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .layer(CorsLayer::permissive())
        .layer(axum::Extension(metrics))
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: the roots were validated at startup, so being up
/// means being ready.
async fn readiness() -> &'static str {
    "ready"
}
