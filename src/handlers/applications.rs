//! Loan application API handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::applications::ApplicationService;
use crate::error::ApiResult;
use crate::models::LoanApplication;

/// Submit a loan application
///
/// The body is taken as raw JSON so schema violations can be reported
/// per field instead of as a generic deserialization failure.
pub async fn submit_application(
    State(service): State<Arc<ApplicationService>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<LoanApplication>)> {
    let Json(payload) = payload?;
    let application = service.submit(payload).await?;

    Ok((StatusCode::CREATED, Json(application)))
}
