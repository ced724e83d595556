pub mod auth;
pub mod billing;
pub mod sales;
pub mod stock;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub async fn home() -> impl IntoResponse {
    Json(json!("Welcome to the pharmacy service"))
}

/// Liveness probe.
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "pharmacy-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}
