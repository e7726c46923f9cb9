//! Viewer endpoints, resolved from the page's query string.
//!
//! | Parameter | Effect | Default |
//! |-----------|--------|---------|
//! | `ws` | Socket URL | `ws://<page host>:8000` |
//! | `scene` | Scene file URL | `http://<page host>:8001/scene.glb` |
//! | `inspector` | Open the inspector at startup (`1`, `true`, `on`) | off |

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};
use wire::{DEFAULT_HTTP_PORT, DEFAULT_SOCKET_PORT, SCENE_PATH};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerConfig {
    pub socket_url: String,
    pub scene_url: String,
    pub inspector_on_start: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self { socket_url: wire::default_socket_url(), scene_url: wire::default_scene_url(), inspector_on_start: false }
    }
}

impl ViewerConfig {
    /// Build a config from query parameters.
    ///
    /// `page_host` is the hostname the page was served from; defaults point at
    /// the sync server on that host so a viewer opened from another machine
    /// still finds it. Empty parameters count as absent.
    pub fn resolve(page_host: Option<&str>, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = page_host.filter(|h| !h.is_empty()).unwrap_or("localhost");
        let param = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            socket_url: param("ws").unwrap_or_else(|| format!("ws://{host}:{DEFAULT_SOCKET_PORT}")),
            scene_url: param("scene").unwrap_or_else(|| format!("http://{host}:{DEFAULT_HTTP_PORT}{SCENE_PATH}")),
            inspector_on_start: param("inspector").is_some_and(|v| is_truthy(&v)),
        }
    }

    /// Resolve from `window.location`.
    #[cfg(feature = "csr")]
    pub fn from_location() -> Self {
        let Some(location) = web_sys::window().map(|w| w.location()) else {
            return Self::default();
        };
        let host = location.hostname().unwrap_or_default();
        let search = location.search().unwrap_or_default();
        match web_sys::UrlSearchParams::new_with_str(&search) {
            Ok(params) => Self::resolve(Some(&host), |key| params.get(key)),
            Err(_) => Self::resolve(Some(&host), |_| None),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "on" | "yes")
}
