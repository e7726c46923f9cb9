//! Sync trigger to scene reload.

#[cfg(test)]
#[path = "reload_test.rs"]
mod reload_test;

use std::rc::Rc;

use scene::engine::SceneEngine;
use scene::host::SceneHost;
use wire::Signal;

use crate::net::comms::{Comms, Transport};

/// Call `start_load` with `scene_url` each time `comms` receives the sync
/// trigger. Echoes and other text are ignored. `start_load` decides how the
/// load runs; the browser spawns it on the local executor.
pub fn reload_on_sync<T, E>(
    comms: &Comms<T>,
    host: &Rc<SceneHost<E>>,
    scene_url: impl Into<String>,
    start_load: impl Fn(Rc<SceneHost<E>>, String) + 'static,
) where
    T: Transport,
    E: SceneEngine + 'static,
{
    let host = Rc::clone(host);
    let scene_url = scene_url.into();
    comms.add_listener(move |raw| {
        if Signal::parse(raw).is_sync() {
            log::info!("sync trigger received; reloading {scene_url}");
            start_load(Rc::clone(&host), scene_url.clone());
        }
    });
}
