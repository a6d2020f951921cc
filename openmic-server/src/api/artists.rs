//! Artist browsing endpoints.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, CATALOG_CACHE_CONTROL};
use crate::db::catalog::{self, ArtistItem};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ArtistsQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
struct ArtistsResponse {
    items: Vec<ArtistItem>,
}

/// `GET /api/artists`: artist groups with song counts.
pub async fn list_artists(
    State(state): State<AppState>,
    Query(params): Query<ArtistsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let items = catalog::list_artists(&state.db, params.q.as_deref().unwrap_or("")).await?;
    Ok((
        [("cache-control", CATALOG_CACHE_CONTROL)],
        Json(ArtistsResponse { items }),
    ))
}

#[derive(Debug, Serialize)]
struct ArtistSongsResponse {
    artist: String,
    items: Vec<TitleItem>,
}

#[derive(Debug, Serialize)]
struct TitleItem {
    title: String,
}

/// `GET /api/artists/:artist/songs`: every title filed under one artist.
///
/// The path segment matches by normalized name, so any surface spelling
/// works. Unknown artists yield an empty list with the parameter echoed back
/// as the display name.
pub async fn songs_for_artist(
    State(state): State<AppState>,
    Path(artist): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (display, titles) = catalog::songs_for_artist(&state.db, &artist).await?;
    let body = ArtistSongsResponse {
        artist: display.unwrap_or(artist),
        items: titles.into_iter().map(|title| TitleItem { title }).collect(),
    };
    Ok(([("cache-control", CATALOG_CACHE_CONTROL)], Json(body)))
}
