//! Serves stored equation images over HTTP.

use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::fs;
use tracing::{debug, warn};

use crate::image_store::ImageStore;
use crate::mime_detect::mime_for_extension;

/// Build the media-serving router. Mount under `/media`:
///   GET /media/:filename — serve a stored image
pub fn media_router(store: ImageStore) -> Router {
    Router::new()
        .route("/:filename", get(serve_image))
        .with_state(store)
}

async fn serve_image(Path(filename): Path<String>, State(store): State<ImageStore>) -> Response {
    // Reject traversal attempts before touching the filesystem.
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        warn!(filename = %filename, "Rejected suspicious media path");
        return (StatusCode::BAD_REQUEST, "Invalid filename").into_response();
    }

    let ext = filename.rsplit('.').next().unwrap_or("");
    let path = store.media_dir().join(&filename);
    debug!(path = %path.display(), "Serving stored image");

    match fs::read(&path).await {
        Ok(bytes) => {
            let mut headers = HeaderMap::new();
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(mime_for_extension(ext)),
            );
            headers.insert(
                header::CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=86400"),
            );
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(bytes.len() as u64));
            (StatusCode::OK, headers, bytes).into_response()
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "Image not found").into_response()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read stored image");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read image").into_response()
        }
    }
}
