//! HTTP and WebSocket API for the karaoke request backend.
//!
//! Serves the public song catalog, accepts song requests from guests,
//! and exposes an authenticated admin surface for managing the request
//! queue. Every queue mutation is broadcast to connected WebSocket
//! clients through [`ws::Notifier`].

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::middleware;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod pagination;
pub mod ws;

pub use ws::Notifier;

/// Maximum accepted request body, in bytes.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Runtime configuration shared by all handlers.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Secret expected in the `x-admin-key` header. `None` means the
    /// admin surface is unconfigured and refuses every call.
    pub admin_key: Option<String>,
    /// Allowed CORS origin, `*` for any.
    pub client_origin: String,
    /// Upper bound for the `limit` query parameter on song listings.
    pub songs_max_limit: i64,
    /// Reject unknown `source`/`performer` values instead of coercing them.
    pub strict_enums: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            admin_key: None,
            client_origin: "*".to_string(),
            songs_max_limit: 2000,
            strict_enums: false,
        }
    }
}

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub settings: Arc<ApiSettings>,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(db: SqlitePool, settings: ApiSettings) -> Self {
        Self {
            db,
            settings: Arc::new(settings),
            notifier: Notifier::new(256),
        }
    }
}

/// Build the application router with all routes configured.
pub fn build_router(state: AppState) -> Router {
    // Admin routes require the x-admin-key header and must never be cached.
    let admin_routes = Router::new()
        .route(
            "/api/admin/requests",
            get(api::admin::list_requests).delete(api::admin::clear_requests),
        )
        .route("/api/admin/requests/:id", delete(api::admin::delete_request))
        .route("/api/admin/requests/:id/status", patch(api::admin::update_status))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::admin_auth,
        ))
        // Outermost layers so auth rejections carry the headers too.
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ));

    let public_routes = Router::new()
        .route("/api/songs", get(api::songs::list_songs))
        .route("/api/artists", get(api::artists::list_artists))
        .route("/api/artists/:artist/songs", get(api::artists::songs_for_artist))
        .route("/api/requests", post(api::requests::create_request))
        .route("/api/requests/quick", post(api::requests::create_quick_request))
        .route("/api/health", get(api::health::health))
        .route("/ws", get(ws::socket::ws_handler));

    Router::new()
        .merge(admin_routes)
        .merge(public_routes)
        .fallback(api::not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer(&state.settings))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(settings: &ApiSettings) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-admin-key"),
        ])
        .expose_headers([HeaderName::from_static("x-total-count")]);

    if settings.client_origin == "*" {
        return cors.allow_origin(Any);
    }
    match settings.client_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            tracing::warn!(
                origin = %settings.client_origin,
                "Invalid CLIENT_ORIGIN value, allowing any origin"
            );
            cors.allow_origin(Any)
        }
    }
}
