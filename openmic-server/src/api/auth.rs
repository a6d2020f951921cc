//! Admin authentication middleware.
//!
//! Admin routes require the shared secret in the `x-admin-key` header. The
//! comparison runs over SHA-256 digests so its timing does not depend on
//! where the provided value diverges from the secret.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use sha2::{Digest, Sha256};

use crate::api::ApiError;
use crate::AppState;

/// Header carrying the admin secret.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Middleware for the `/api/admin` routes.
///
/// Responds 500 when no admin key is configured on the server and 401 when
/// the header is absent, unreadable, or wrong.
pub async fn admin_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.settings.admin_key.as_deref() else {
        return Err(ApiError::Misconfigured(
            "ADMIN_KEY is not configured; refusing admin request",
        ));
    };

    let provided = request
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .unwrap_or("");

    if provided.is_empty() || !keys_match(provided, expected) {
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(request).await)
}

fn keys_match(provided: &str, expected: &str) -> bool {
    let provided_digest = Sha256::digest(provided.as_bytes());
    let expected_digest = Sha256::digest(expected.as_bytes());
    provided.len() == expected.len() && provided_digest == expected_digest
}
