//! Download queue API handler.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use jukebox_core::TrackRequest;

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueRequest {
    pub video_id: String,
    pub video_title: String,
    #[serde(rename = "server")]
    pub server_name: String,
    pub account_id: String,
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(default)]
    pub server_webhook: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueResponse {
    pub valid: bool,
    pub video_id: String,
    pub video_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_res: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Handler
// ============================================================================

/// POST /api/v1/queue
///
/// Run the download protocol for one track. Policy rejections and
/// download failures both come back as a well-formed `valid: false`
/// response; this endpoint never errors outward.
pub async fn queue(
    State(state): State<Arc<AppState>>,
    Json(body): Json<QueueRequest>,
) -> Json<QueueResponse> {
    let request = TrackRequest {
        video_id: body.video_id.clone(),
        title: body.video_title.clone(),
        server_name: body.server_name,
        account_id: body.account_id,
        display_name: body.player_name,
        webhook_url: body.server_webhook,
    };

    match state.orchestrator().download(&request).await {
        Ok(track) => Json(QueueResponse {
            valid: true,
            video_id: body.video_id,
            video_title: body.video_title,
            url: Some(track.url),
            max_res: Some(track.max_res),
            proxy: track.proxy,
            error: None,
        }),
        Err(failure) => Json(QueueResponse {
            valid: false,
            video_id: body.video_id,
            video_title: body.video_title,
            url: None,
            max_res: None,
            proxy: failure.proxy,
            error: Some(failure.error.to_string()),
        }),
    }
}
