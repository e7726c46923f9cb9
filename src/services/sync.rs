//! Export-then-broadcast, shared by the websocket trigger and `POST /api/sync`.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use tracing::{info, warn};

use crate::services::export::{ExportError, validate_scene};
use crate::services::hub;
use crate::state::AppState;

/// Export the scene, validate it, and tell every client to reload.
///
/// Concurrent calls run one at a time. Returns the number of clients the
/// trigger was queued for.
///
/// # Errors
///
/// Any [`ExportError`]; nothing is broadcast in that case.
pub async fn run_sync(state: &AppState) -> Result<usize, ExportError> {
    let _guard = state.sync_lock.lock().await;
    let path = state.scene_path.as_path();

    let result = async {
        state.exporter.export(path).await?;
        validate_scene(path).await
    }
    .await;

    match result {
        Ok(header) => {
            let clients = hub::broadcast(state, wire::SYNC_TRIGGER).await;
            info!(bytes = header.length, clients, exporter = %state.exporter.describe(), "sync: scene exported");
            Ok(clients)
        }
        Err(err) => {
            warn!(error = %err, exporter = %state.exporter.describe(), "sync: export failed; nothing broadcast");
            Err(err)
        }
    }
}
