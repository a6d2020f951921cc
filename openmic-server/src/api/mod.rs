//! HTTP route handlers.

pub mod admin;
pub mod artists;
pub mod auth;
pub mod error;
pub mod health;
pub mod requests;
pub mod songs;

pub use error::ApiError;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Catalog responses may be cached briefly by clients and proxies.
pub(crate) const CATALOG_CACHE_CONTROL: &str = "public, max-age=60, stale-while-revalidate=120";

/// JSON fallback for unknown routes.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
