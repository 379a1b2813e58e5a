//! Route definitions for the NexBank API

mod loan;
mod upload;

use axum::http::{HeaderValue, Method};
use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::app_state::AppState;
use crate::config::Config;
use crate::handlers::health_check;
use crate::middleware;

pub use loan::loan_routes;
pub use upload::{upload_routes, uploaded_files};

/// Assemble the full application router
pub fn app_router(state: AppState, config: &Config) -> Router {
    let max_file_bytes = state.upload_service.max_size_bytes();
    let upload_dir = state.upload_service.dir().to_path_buf();

    let mut app = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(loan_routes())
        .merge(upload_routes(max_file_bytes))
        .merge(uploaded_files(&upload_dir))
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::security_headers));

    if config.environment.is_production() {
        app = app.layer(axum::middleware::from_fn(middleware::hsts_header));
    }

    app.layer(axum::middleware::from_fn(middleware::request_tracing))
        .layer(configure_cors(config.cors_allowed_origins.as_deref()))
}

async fn root() -> &'static str {
    "NexBank Loan API"
}

fn configure_cors(allowed_origins: Option<&str>) -> CorsLayer {
    let allowed_origins = allowed_origins.unwrap_or_default();

    if allowed_origins.trim().is_empty() {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}
