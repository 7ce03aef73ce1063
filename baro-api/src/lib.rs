//! baro-api library - read-only transparency data API
//!
//! Serves the citizen-facing JSON API: advanced community search,
//! per-community detail and statistics, autocomplete, rankings and
//! interpellation messages. All endpoints read from a database opened
//! in read-only mode; the ingestion pipeline that writes it is a
//! separate system.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (read-only)
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
///
/// CORS is permissive: the API serves public open data and is consumed
/// directly by browsers.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/health", get(api::health_check))
        .route("/api/communities", get(api::search_communities))
        .route("/api/communities/:siren", get(api::get_community))
        .route("/api/communities/:siren/marches", get(api::get_marches))
        .route("/api/communities/:siren/subventions", get(api::get_subventions))
        .route("/api/communities/:siren/stats", get(api::get_community_stats))
        .route("/api/suggest", get(api::suggest_communities))
        .route("/api/interpellation/:siren", get(api::get_interpellation))
        .route("/api/palmares", get(api::get_palmares))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
