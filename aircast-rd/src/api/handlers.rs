//! HTTP request handlers

use crate::api::AppState;
use crate::catalog::AUDIO_SUFFIX;
use crate::db;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

#[derive(Debug, Serialize)]
pub struct TrackInfoResponse {
    pub artist: String,
    pub title: String,
    pub cover_url: String,
}

/// GET /api/v1/track-info
///
/// Resolves the now-playing object key against the metadata store. The
/// key carries the audio suffix (`song.mp3`); metadata is keyed by title.
pub async fn track_info(
    State(state): State<AppState>,
) -> Result<Json<TrackInfoResponse>, (StatusCode, Json<Value>)> {
    let Some(current) = state.bus.current() else {
        return Err(not_found("no track currently playing"));
    };

    let title = clean_title(&current);
    let track = db::get_track_by_title(&state.db, title)
        .await
        .map_err(|e| {
            error!(error = %e, "track metadata lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "metadata store unavailable" })),
            )
        })?;

    let Some(track) = track else {
        return Err(not_found(&format!("track '{title}' not found")));
    };

    Ok(Json(TrackInfoResponse {
        artist: track.artist,
        title: track.title,
        cover_url: resolve_cover_url(&track.cover_url, &state.cover_public_url),
    }))
}

/// Object key → metadata title: drop the audio suffix and surrounding
/// whitespace
pub(crate) fn clean_title(key: &str) -> &str {
    key.strip_suffix(AUDIO_SUFFIX).unwrap_or(key).trim()
}

/// Cover names that are not absolute URLs live in the public image bucket
pub(crate) fn resolve_cover_url(cover: &str, public_base: &str) -> String {
    if cover.starts_with("http://") || cover.starts_with("https://") {
        cover.to_string()
    } else {
        format!("{}/{}", public_base.trim_end_matches('/'), cover)
    }
}

fn not_found(detail: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": detail })))
}
