//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor and is
//! shared by both listeners. It holds the connected websocket clients, the
//! scene exporter, and the lock that serializes exports.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, mpsc};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::services::export::SceneExporter;

/// Connected clients: `client_id` -> sender for outgoing text frames.
pub type Clients = HashMap<Uuid, mpsc::Sender<String>>;

/// Clone is required by Axum; every field is Arc-wrapped or Copy.
#[derive(Clone)]
pub struct AppState {
    pub clients: Arc<RwLock<Clients>>,
    pub exporter: Arc<dyn SceneExporter>,
    /// Scene file served at `/scene.glb` and written by the exporter.
    pub scene_path: Arc<PathBuf>,
    /// Held for the duration of one export + broadcast.
    pub sync_lock: Arc<Mutex<()>>,
    /// Outbound queue depth per client.
    pub client_buffer: usize,
}

impl AppState {
    #[must_use]
    pub fn new(config: &ServerConfig, exporter: Arc<dyn SceneExporter>) -> Self {
        Self {
            clients: Arc::new(RwLock::new(HashMap::new())),
            exporter,
            scene_path: Arc::new(config.glb_path.clone()),
            sync_lock: Arc::new(Mutex::new(())),
            client_buffer: config.client_buffer,
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
