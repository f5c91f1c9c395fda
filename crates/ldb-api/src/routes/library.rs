//! # Library Passthrough
//!
//! Read-only static serving of the part library so clients can fetch
//! single files by name.
//!
//! Routes:
//! - GET /ldraw/data/parts/{path}: primary root, then fallback root
//! - GET /ldraw/config/LDConfig.ldr: colour configuration
//! - GET /ldraw/license/CAlicense.txt
//! - GET /ldraw/license/CAlicense4.txt
//! - GET /ldraw/license/CAreadme.txt

use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::AppConfig;
use crate::state::AppState;

/// Fixed files served from the library root, by route.
pub const FIXED_FILES: [(&str, &str); 4] = [
    ("/config/LDConfig.ldr", "LDConfig.ldr"),
    ("/license/CAlicense.txt", "CAlicense.txt"),
    ("/license/CAlicense4.txt", "CAlicense4.txt"),
    ("/license/CAreadme.txt", "CAreadme.txt"),
];

/// Build the library router over the configured roots.
pub fn router(config: &AppConfig) -> Router<AppState> {
    let parts =
        ServeDir::new(&config.parts_dir).fallback(ServeDir::new(&config.primitives_dir));

    FIXED_FILES.into_iter().fold(
        Router::new().nest_service("/data/parts", parts),
        |router, (route, file)| {
            router.route_service(route, ServeFile::new(config.library_root.join(file)))
        },
    )
}
