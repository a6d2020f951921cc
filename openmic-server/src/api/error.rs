//! API error taxonomy and its mapping onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use openmic_common::models::FieldError;
use serde_json::json;
use tracing::error;

/// Errors surfaced by request handlers.
///
/// Database failures and configuration problems collapse into an opaque
/// `SERVER_ERROR` body; the cause is logged server-side only.
#[derive(Debug)]
pub enum ApiError {
    /// 400 with a per-field breakdown.
    Validation(Vec<FieldError>),
    /// 400 with a single message.
    InvalidArgument(String),
    /// 404.
    NotFound(String),
    /// 401 for a missing or wrong admin key.
    Unauthorized,
    /// 500 for a missing server-side secret.
    Misconfigured(&'static str),
    /// 500, logged with the underlying cause.
    Internal(openmic_common::Error),
}

impl From<openmic_common::Error> for ApiError {
    fn from(err: openmic_common::Error) -> Self {
        match err {
            openmic_common::Error::NotFound(msg) => ApiError::NotFound(msg),
            openmic_common::Error::InvalidInput(msg) => ApiError::InvalidArgument(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "VALIDATION_ERROR", "details": details }),
            ),
            ApiError::InvalidArgument(message) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "error": message })),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Unauthorized" }),
            ),
            ApiError::Misconfigured(what) => {
                error!("{what}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "SERVER_ERROR" }),
                )
            }
            ApiError::Internal(err) => {
                error!("Unhandled error while serving request: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "SERVER_ERROR" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
