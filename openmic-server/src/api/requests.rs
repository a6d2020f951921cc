//! Public request submission endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use openmic_common::models::{NewRequestInput, Request};
use tracing::info;

use crate::api::ApiError;
use crate::db;
use crate::AppState;

/// `POST /api/requests`: guest submission form.
pub async fn create_request(
    State(state): State<AppState>,
    Json(input): Json<NewRequestInput>,
) -> Result<(StatusCode, Json<Request>), ApiError> {
    submit(&state, input).await
}

/// `POST /api/requests/quick`: host-side shortcut.
///
/// Source and performer are forced to `quick`/`host` no matter what the
/// payload says.
pub async fn create_quick_request(
    State(state): State<AppState>,
    Json(input): Json<NewRequestInput>,
) -> Result<(StatusCode, Json<Request>), ApiError> {
    submit(&state, input.quick()).await
}

async fn submit(
    state: &AppState,
    input: NewRequestInput,
) -> Result<(StatusCode, Json<Request>), ApiError> {
    let new = input
        .validate(state.settings.strict_enums)
        .map_err(ApiError::Validation)?;
    let request = db::requests::insert_request(&state.db, &new).await?;
    info!(id = %request.id, source = %request.source, "Request queued");
    state.notifier.request_created(request.clone());
    Ok((StatusCode::CREATED, Json(request)))
}
