//! # Bundle Routes
//!
//! Routes:
//! - GET /ldraw/bundle/{id}.zip: zip archive of every file `{id}.dat` needs
//! - GET /ldraw/bundle/{id}.lst: the same closure as a `\r\n`-joined list
//!
//! Any other suffix, an identifier whose entry file resolves to nothing,
//! and any failure while producing the bundle answer 404.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE, ETAG};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use ldb_bundle::{Artifact, ArtifactSource};
use ldb_core::BundleId;

use crate::error::AppError;
use crate::state::AppState;

/// Reports whether the body came from the cache (`hit`) or was built (`miss`).
pub const CACHE_STATUS_HEADER: HeaderName = HeaderName::from_static("x-bundle-cache");

/// Build the bundle router.
pub fn router() -> Router<AppState> {
    Router::new().route("/bundle/{file}", get(get_bundle))
}

/// GET /ldraw/bundle/{file}: serve a cached or freshly built bundle.
async fn get_bundle(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, AppError> {
    let (id, representation) = BundleId::parse_request(&file)
        .ok_or_else(|| AppError::NotFound(format!("bundle {file}")))?;

    let artifact = state
        .cache
        .fetch(&id, representation)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("bundle {file}")))?;

    Ok(bundle_response(artifact))
}

fn bundle_response(artifact: Artifact) -> Response {
    let file_name = artifact.id.artifact_file_name(artifact.representation);
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    let etag = HeaderValue::from_str(&format!("\"{}\"", artifact.digest.to_hex()))
        .unwrap_or_else(|_| HeaderValue::from_static("\"\""));
    let cache_status = match artifact.source {
        ArtifactSource::Cached => HeaderValue::from_static("hit"),
        ArtifactSource::Built => HeaderValue::from_static("miss"),
    };

    (
        StatusCode::OK,
        [
            (
                CONTENT_TYPE,
                HeaderValue::from_static(artifact.representation.content_type()),
            ),
            (CONTENT_DISPOSITION, disposition),
            (ETAG, etag),
            (CACHE_STATUS_HEADER, cache_status),
        ],
        Body::from(artifact.bytes),
    )
        .into_response()
}
