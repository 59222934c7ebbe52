//! HTTP API for the radio daemon
//!
//! Read-only observer surface: track metadata for the currently playing
//! item, and a server-push feed of now-playing changes.

pub mod handlers;
pub mod sse;

use aircast_common::events::NowPlayingBus;
use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::json;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Track metadata database
    pub db: SqlitePool,
    /// Now-playing bus fed by the playback loop
    pub bus: Arc<NowPlayingBus>,
    /// Base URL for cover names that are not absolute URLs
    pub cover_public_url: String,
    /// Server port
    pub port: u16,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check (no prefix for health endpoint)
        .route("/health", get(health_check))
        // API v1 routes
        .nest(
            "/api/v1",
            Router::new()
                .route("/track-info", get(handlers::track_info))
                .route("/track-updates", get(sse::track_updates)),
        )
        // The web frontend is served from another origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "module": "aircast-rd",
        "version": env!("CARGO_PKG_VERSION"),
        "port": state.port,
    }))
}
