//! Health check endpoint.

use axum::{Json, Router, routing::get};
use serde::Serialize;
use tsnt_core::finance::FinanceStore;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Creates health check routes.
pub fn routes<S: FinanceStore>() -> Router<AppState<S>> {
    Router::new().route("/health", get(health_check))
}
