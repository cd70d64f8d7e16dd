use axum::{http::StatusCode, response::IntoResponse};
use tracing::info;

use super::error_responses::AppError;

pub async fn not_found() -> impl IntoResponse {
    info!("router: not_found handler invoked");
    AppError::NotFound("Route not found".to_string())
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK").into_response()
}
