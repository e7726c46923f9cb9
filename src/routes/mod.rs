//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The server listens on two ports. The socket port carries the websocket hub
//! only. The HTTP port serves the exported scene, the sync API, and the built
//! viewer as static files. Both answer `/healthz`.

pub mod scene;
pub mod ws;


use std::path::Path;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Websocket hub. The upgrade is accepted on `/` and `/ws`.
pub fn socket_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(ws::handle_ws))
        .route("/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Scene file, sync API, and static viewer fallback.
pub fn http_app(state: AppState, static_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(wire::SCENE_PATH, get(scene::get_scene))
        .route("/api/sync", post(scene::post_sync))
        .route("/healthz", get(healthz))
        .fallback_service(ServeDir::new(static_dir).append_index_html_on_directories(true))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
