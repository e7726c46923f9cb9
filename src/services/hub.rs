//! Connected-client registry and fan-out.
//!
//! Each websocket connection registers a bounded channel. Broadcasts are
//! best-effort: a client whose queue is full misses the frame and stays
//! connected.

#[cfg(test)]
#[path = "hub_test.rs"]
mod hub_test;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::state::AppState;

/// Add a client and return its id plus the receiving end of its queue.
pub async fn register(state: &AppState) -> (Uuid, mpsc::Receiver<String>) {
    let client_id = Uuid::new_v4();
    let (tx, rx) = mpsc::channel(state.client_buffer);
    state.clients.write().await.insert(client_id, tx);
    (client_id, rx)
}

/// Remove a client. Returns `false` if it was not registered.
pub async fn unregister(state: &AppState, client_id: Uuid) -> bool {
    state.clients.write().await.remove(&client_id).is_some()
}

pub async fn client_count(state: &AppState) -> usize {
    state.clients.read().await.len()
}

/// Queue `message` for every connected client. Returns how many accepted it.
pub async fn broadcast(state: &AppState, message: &str) -> usize {
    let clients = state.clients.read().await;
    let mut delivered = 0;
    for (client_id, tx) in clients.iter() {
        match tx.try_send(message.to_owned()) {
            Ok(()) => delivered += 1,
            Err(TrySendError::Full(_)) => warn!(%client_id, "hub: client queue full; frame dropped"),
            Err(TrySendError::Closed(_)) => debug!(%client_id, "hub: client already gone"),
        }
    }
    delivered
}

/// Queue `message` for one client. Returns `false` if it is unknown or its
/// queue is full.
pub async fn send_to(state: &AppState, client_id: Uuid, message: &str) -> bool {
    let clients = state.clients.read().await;
    clients
        .get(&client_id)
        .is_some_and(|tx| tx.try_send(message.to_owned()).is_ok())
}
