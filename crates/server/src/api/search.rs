//! Search API handler.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use jukebox_core::SearchHit;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub search_string: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub valid: bool,
    pub results: Vec<SearchHit>,
}

/// POST /api/v1/search
///
/// The searcher itself never fails; an upstream error just means the
/// placeholder result comes back.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchRequest>,
) -> Json<SearchResponse> {
    let results = state.searcher().search(&body.search_string).await;
    Json(SearchResponse {
        valid: true,
        results,
    })
}
