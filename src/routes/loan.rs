//! Loan application route definitions

use axum::{routing::post, Router};

use crate::app_state::AppState;
use crate::handlers::submit_application;

pub fn loan_routes() -> Router<AppState> {
    Router::new().route("/api/loans", post(submit_application))
}
