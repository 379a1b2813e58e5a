//! Upload route definitions

use std::path::Path;

use axum::{extract::DefaultBodyLimit, routing::post, Router};
use tower_http::services::ServeDir;

use crate::app_state::AppState;
use crate::handlers::upload_file;
use crate::uploads::UPLOADS_URL_PREFIX;

/// Room for multipart boundaries and part headers on top of the file cap
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// `POST /api/upload`, body-limited to the file cap plus multipart framing
pub fn upload_routes(max_file_bytes: usize) -> Router<AppState> {
    Router::new().route(
        "/api/upload",
        post(upload_file).layer(DefaultBodyLimit::max(
            max_file_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
        )),
    )
}

/// Serves stored uploads as raw bytes; unknown names are 404
pub fn uploaded_files(upload_dir: &Path) -> Router<AppState> {
    Router::new().nest_service(UPLOADS_URL_PREFIX, ServeDir::new(upload_dir))
}
