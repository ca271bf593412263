//! Maps `AppError` onto HTTP responses. Validation failures come back
//! per-field; storage failures stay generic on purpose.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use domains::error::AppError;

pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "errors": errors }),
            ),
            AppError::RateLimited { retry_after_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({
                    "error": "please wait before commenting again",
                    "retry_after_secs": retry_after_secs,
                }),
            ),
            AppError::NotFound(what, id) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("{what} not found: {id}") }),
            ),
            AppError::Storage(message) => (StatusCode::BAD_GATEWAY, json!({ "error": message })),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "internal error" }),
            ),
        };
        (status, Json(body)).into_response()
    }
}
