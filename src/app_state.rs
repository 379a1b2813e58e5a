//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::applications::ApplicationService;
use crate::uploads::UploadService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub application_service: Arc<ApplicationService>,
    pub upload_service: Arc<UploadService>,
    /// Present only when applications are stored in Postgres
    pub db_pool: Option<PgPool>,
}

impl AppState {
    pub fn new(
        application_service: Arc<ApplicationService>,
        upload_service: Arc<UploadService>,
        db_pool: Option<PgPool>,
    ) -> Self {
        Self {
            application_service,
            upload_service,
            db_pool,
        }
    }
}

impl FromRef<AppState> for Arc<ApplicationService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.application_service.clone()
    }
}

impl FromRef<AppState> for Arc<UploadService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.upload_service.clone()
    }
}
