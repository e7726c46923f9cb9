//! WebSocket handler for the sync hub.
//!
//! DESIGN
//! ======
//! On upgrade, registers the client with the hub and enters a `select!` loop:
//! - Incoming text → echo to the sender; `sync glb` also runs an export and
//!   broadcasts the trigger to everyone (sender included)
//! - Hub frames → forward to the client
//!
//! Binary frames are ignored. Close or any socket error ends the loop and
//! unregisters the client.

#[cfg(test)]
#[path = "ws_test.rs"]
mod ws_test;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tracing::{info, warn};
use uuid::Uuid;
use wire::Signal;

use crate::services::{hub, sync};
use crate::state::AppState;

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let (client_id, mut client_rx) = hub::register(&state).await;
    let clients = hub::client_count(&state).await;
    info!(%client_id, clients, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => handle_text(&state, client_id, text.as_str()).await,
                    Message::Binary(bytes) => warn!(%client_id, len = bytes.len(), "ws: binary frame ignored"),
                    Message::Close(_) => break,
                    Message::Ping(_) | Message::Pong(_) => {}
                }
            }
            Some(text) = client_rx.recv() => {
                if socket.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    }

    hub::unregister(&state, client_id).await;
    info!(%client_id, "ws: client disconnected");
}

/// Echo first, then act. The echo is queued before any broadcast so the
/// sender always sees it ahead of the trigger.
async fn handle_text(state: &AppState, client_id: Uuid, text: &str) {
    info!(%client_id, message = text, "ws: message received");
    let echo = Signal::echo_of(text).to_string();
    if !hub::send_to(state, client_id, &echo).await {
        warn!(%client_id, "ws: echo dropped");
    }

    if Signal::parse(text).is_sync() {
        // Failures are logged by the sync service.
        if let Ok(clients) = sync::run_sync(state).await {
            info!(%client_id, clients, "ws: sync broadcast");
        }
    }
}
