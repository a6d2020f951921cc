//! Public song catalog endpoint.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, CATALOG_CACHE_CONTROL};
use crate::db::catalog::{self, SongItem};
use crate::pagination::{resolve_page_params, total_pages};
use crate::AppState;

/// Query parameters for `GET /api/songs`.
///
/// `page` and `limit` stay raw strings because `limit` accepts the `all`
/// sentinel. `style` and `styles` are interchangeable comma-separated lists.
#[derive(Debug, Default, Deserialize)]
pub struct SongsQuery {
    pub q: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub style: Option<String>,
    pub styles: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SongsResponse {
    page: i64,
    per_page: i64,
    total: i64,
    total_pages: i64,
    has_next: bool,
    items: Vec<SongItem>,
}

/// `GET /api/songs`: paged catalog search.
///
/// The total match count is repeated in the `X-Total-Count` header so list
/// clients can size their pagers without parsing the body.
pub async fn list_songs(
    State(state): State<AppState>,
    Query(params): Query<SongsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page_params = resolve_page_params(
        params.page.as_deref(),
        params.limit.as_deref(),
        state.settings.songs_max_limit,
    );

    let mut styles: Vec<String> = Vec::new();
    for raw in params.style.iter().chain(params.styles.iter()) {
        styles.extend(
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        );
    }

    let query = params.q.as_deref().unwrap_or("");
    let (items, total) = catalog::search_songs(&state.db, query, &styles, page_params).await?;

    let has_next = page_params.offset() + (items.len() as i64) < total;
    let body = SongsResponse {
        page: page_params.page,
        per_page: page_params.per_page,
        total,
        total_pages: total_pages(total, page_params.per_page),
        has_next,
        items,
    };
    Ok((
        [
            ("x-total-count", total.to_string()),
            ("cache-control", CATALOG_CACHE_CONTROL.to_string()),
        ],
        Json(body),
    ))
}
