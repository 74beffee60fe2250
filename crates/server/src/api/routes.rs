use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use super::{handlers, playlist, queue, search};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>, storage_dir: &Path) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        // Search
        .route("/search", post(search::search))
        // Download queue
        .route("/queue", post(queue::queue))
        // Playlist relay
        .route("/playlist", post(playlist::relay))
        .with_state(state);

    // Game clients fetch from plain origins, so the surface is open to
    // cross-origin GET/POST.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    // Downloaded tracks are served read-only from the storage root, at
    // the same paths the queue endpoint hands out.
    Router::new()
        .nest("/api/v1", api_routes)
        .fallback_service(ServeDir::new(storage_dir))
        .layer(cors)
}
