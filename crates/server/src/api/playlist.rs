//! Playlist relay handler.
//!
//! Playlists are resolved by a separate upstream service; this
//! endpoint just forwards the playlist id and hands back whatever the
//! upstream returns. Every failure collapses to `{"valid": false}`.

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::state::AppState;

/// POST /api/v1/playlist
pub async fn relay(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Json<Value> {
    let invalid = || Json(json!({"valid": false}));

    let playlist_id = match headers.get("playlistid").and_then(|v| v.to_str().ok()) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => return invalid(),
    };

    let Some(upstream) = state.playlist_upstream() else {
        debug!("Playlist request received but no upstream is configured");
        return invalid();
    };

    debug!(playlist_id = %playlist_id, "Relaying playlist request");

    let response = state
        .relay_client()
        .post(upstream)
        .header("playlistId", &playlist_id)
        .send()
        .await;

    match response {
        Ok(response) if response.status().is_success() => {
            match response.json::<Value>().await {
                Ok(body) => Json(body),
                Err(e) => {
                    warn!(error = %e, "Playlist upstream returned unparseable body");
                    invalid()
                }
            }
        }
        Ok(response) => {
            warn!(status = %response.status(), "Playlist upstream rejected request");
            invalid()
        }
        Err(e) => {
            warn!(error = %e, "Playlist upstream unreachable");
            invalid()
        }
    }
}
