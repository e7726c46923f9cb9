//! Shared wire vocabulary for the sync socket and the scene endpoint.
//!
//! This crate owns the text protocol used by the server, the browser viewer,
//! and the CLI. Frames are plain UTF-8 strings. Exactly one message carries
//! meaning, the sync trigger: a client sends it to ask for a fresh export, and
//! the server broadcasts it to tell every viewer to reload the scene file.
//! Every inbound message is also echoed back to its sender.

pub mod glb;

use std::fmt;

use serde::{Deserialize, Serialize};

/// The sync trigger, sent verbatim in both directions.
pub const SYNC_TRIGGER: &str = "sync glb";

/// Prefix the server puts in front of an echoed message.
pub const ECHO_PREFIX: &str = "Echo: ";

/// HTTP path of the exported scene file.
pub const SCENE_PATH: &str = "/scene.glb";

/// Content type served for the scene file.
pub const SCENE_CONTENT_TYPE: &str = "model/gltf-binary";

/// Default port of the websocket hub.
pub const DEFAULT_SOCKET_PORT: u16 = 8000;

/// Default port of the HTTP scene endpoint.
pub const DEFAULT_HTTP_PORT: u16 = 8001;

/// Default socket URL a viewer on the same machine connects to.
#[must_use]
pub fn default_socket_url() -> String {
    format!("ws://localhost:{DEFAULT_SOCKET_PORT}")
}

/// Default scene URL a viewer on the same machine loads.
#[must_use]
pub fn default_scene_url() -> String {
    format!("http://localhost:{DEFAULT_HTTP_PORT}{SCENE_PATH}")
}

/// A classified text frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Signal {
    /// The sync trigger.
    Sync,
    /// An echo of a message the peer sent earlier (prefix stripped).
    Echo(String),
    /// Anything else. Carried through untouched.
    Text(String),
}

impl Signal {
    /// Classify a raw frame. Matching is exact: no trimming, no case folding.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw == SYNC_TRIGGER {
            Self::Sync
        } else if let Some(rest) = raw.strip_prefix(ECHO_PREFIX) {
            Self::Echo(rest.to_owned())
        } else {
            Self::Text(raw.to_owned())
        }
    }

    /// The reply the server sends for an inbound `raw` frame.
    #[must_use]
    pub fn echo_of(raw: &str) -> Self {
        Self::Echo(raw.to_owned())
    }

    #[must_use]
    pub fn is_sync(&self) -> bool {
        matches!(self, Self::Sync)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync => f.write_str(SYNC_TRIGGER),
            Self::Echo(text) => write!(f, "{ECHO_PREFIX}{text}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
