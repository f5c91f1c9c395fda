//! # ldb-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for part bundles.
//! Binds to configurable port (default 8080).

use ldb_api::state::AppState;
use ldb_api::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Configuration failed: {e}");
        e
    })?;
    tracing::info!(
        parts = %config.parts_dir.display(),
        primitives = %config.primitives_dir.display(),
        "library roots"
    );

    // Missing library roots are fatal; cache directories are created.
    let state = AppState::new(config.clone()).map_err(|e| {
        tracing::error!("Startup failed: {e}");
        e
    })?;

    let app = ldb_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("LDraw bundle server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
