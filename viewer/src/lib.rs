//! Browser GLB viewer.
//!
//! A Leptos shell that composes two pieces: a [`net::comms::Comms`] channel
//! to the sync server and a [`scene::host::SceneHost`] on a Babylon canvas.
//! When the server broadcasts the sync trigger, the host reloads the scene
//! file and swaps it in without moving the camera.
//!
//! Everything that touches the browser is behind the `csr` feature; the rest
//! builds and tests natively.

pub mod app;
pub mod components;
pub mod config;
pub mod debug;
pub mod net;
pub mod reload;
pub mod state;

/// WASM entry point.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Debug).is_err() {
        leptos::logging::warn!("logger already installed");
    }
    log::info!("glbview viewer starting");
    leptos::mount::mount_to_body(app::App);
}
