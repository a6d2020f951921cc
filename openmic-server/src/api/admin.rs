//! Admin queue management endpoints. All of these sit behind
//! [`crate::api::auth::admin_auth`].

use axum::extract::{Path, Query, State};
use axum::Json;
use openmic_common::models::{Request, RequestStatus};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::ApiError;
use crate::db::requests::{self, StatusCounts};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AdminListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdminListResponse {
    pub data: Vec<Request>,
    pub counts: StatusCounts,
}

/// `GET /api/admin/requests`: full queue plus per-status totals.
///
/// `?status=` takes a comma-separated list; unknown names are ignored. The
/// counts always describe the whole queue, not the filtered view.
pub async fn list_requests(
    State(state): State<AppState>,
    Query(params): Query<AdminListQuery>,
) -> Result<Json<AdminListResponse>, ApiError> {
    let mut statuses: Vec<RequestStatus> = Vec::new();
    if let Some(raw) = &params.status {
        for part in raw.split(',') {
            if let Some(status) = RequestStatus::parse(part.trim()) {
                if !statuses.contains(&status) {
                    statuses.push(status);
                }
            }
        }
    }

    let data = requests::list_requests(&state.db, &statuses).await?;
    let counts = requests::status_counts(&state.db).await?;
    Ok(Json(AdminListResponse { data, counts }))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: Option<String>,
}

/// `PATCH /api/admin/requests/:id/status`
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> Result<Json<Request>, ApiError> {
    let id = requests::parse_id(&id)?;
    let status = body
        .status
        .as_deref()
        .map(str::trim)
        .and_then(RequestStatus::parse)
        .ok_or_else(|| ApiError::InvalidArgument("Invalid status".to_string()))?;

    let request = requests::set_status(&state.db, id, status).await?;
    info!(id = %request.id, status = %request.status, "Request status changed");
    state
        .notifier
        .status_changed(request.id.clone(), request.status, request.updated_at);
    Ok(Json(request))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub ok: bool,
    pub deleted: u64,
}

/// `DELETE /api/admin/requests/:id`
pub async fn delete_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = requests::parse_id(&id)?;
    requests::delete_request(&state.db, id).await?;
    info!(%id, "Request removed");
    state.notifier.request_removed(id.to_string());
    Ok(Json(DeleteResponse { ok: true, deleted: 1 }))
}

/// `DELETE /api/admin/requests`: clear the whole queue.
pub async fn clear_requests(
    State(state): State<AppState>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = requests::delete_all_requests(&state.db).await?;
    info!(deleted, "Request queue cleared");
    state.notifier.queue_cleared();
    Ok(Json(DeleteResponse { ok: true, deleted }))
}
