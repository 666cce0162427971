use crate::error::ExtractError;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;
use service_core::observability::render_metrics;

/// Liveness probe. Independent of the Gemini credential.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Prometheus scrape endpoint.
pub async fn metrics_endpoint() -> Result<impl IntoResponse, AppError> {
    let body = render_metrics().ok_or(AppError::ServiceUnavailable)?;
    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        body,
    ))
}

/// Fallback for unknown routes, rendered in the usual envelope.
pub async fn not_found() -> ExtractError {
    ExtractError::NotFound
}
