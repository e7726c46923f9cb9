//! `GET /scene.glb` and `POST /api/sync`.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::warn;

use crate::services::sync;
use crate::state::AppState;

/// Body of a successful `POST /api/sync`.
#[derive(Debug, Serialize)]
pub struct SyncReply {
    pub clients: usize,
}

/// Serve the current scene file. The file is re-read on every request.
pub async fn get_scene(State(state): State<AppState>) -> Response {
    let path = state.scene_path.as_path();
    match tokio::fs::read(path).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, wire::SCENE_CONTENT_TYPE),
                (header::CACHE_CONTROL, "no-store"),
            ],
            bytes,
        )
            .into_response(),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, format!("scene not exported yet: {}", path.display())).into_response()
        }
        Err(err) => {
            warn!(error = %err, path = %path.display(), "scene: read failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("scene unreadable: {err}")).into_response()
        }
    }
}

pub async fn post_sync(State(state): State<AppState>) -> Response {
    match sync::run_sync(&state).await {
        Ok(clients) => Json(SyncReply { clients }).into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}
