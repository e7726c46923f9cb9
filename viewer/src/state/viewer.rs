//! UI-facing projection of the socket and scene host.
//!
//! SYSTEM CONTEXT
//! ==============
//! Held in a `RwSignal<ViewerState>` provided by [`crate::app::App`]. The
//! canvas host writes it from Comms and SceneHost callbacks; the toolbar and
//! status bar read it. Only the toolbar writes the request counters.

#[cfg(test)]
#[path = "viewer_test.rs"]
mod viewer_test;

use scene::camera::CameraPose;
use scene::engine::LoadError;
use scene::host::{SceneReady, SwapOutcome};
use wire::Signal;

use crate::net::comms::ConnectionState;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewerState {
    /// Current socket lifecycle state.
    pub connection: ConnectionState,
    /// Whether the inspector should be shown on the active scene.
    pub inspector_visible: bool,
    /// True while a scene import is pending.
    pub loading: bool,
    /// Last scene-load or send failure, cleared by the next successful swap.
    pub last_error: Option<String>,
    /// Generation of the scene on screen; 0 is the empty startup scene.
    pub scene_generation: u64,
    pub scene_url: Option<String>,
    /// Pose applied to the latest scene's camera.
    pub camera: Option<CameraPose>,
    /// Most recent inbound message.
    pub last_signal: Option<Signal>,
    /// Sync button presses. The canvas host reacts to each increment.
    pub sync_requests: u64,
    /// Sync triggers received from the server.
    pub syncs_received: u64,
}

impl ViewerState {
    /// Classify and record an inbound message.
    pub fn record_message(&mut self, raw: &str) -> Signal {
        let signal = Signal::parse(raw);
        if signal.is_sync() {
            self.syncs_received += 1;
        }
        self.last_signal = Some(signal.clone());
        signal
    }

    pub fn request_sync(&mut self) {
        self.sync_requests += 1;
    }

    pub fn toggle_inspector(&mut self) {
        self.inspector_visible = !self.inspector_visible;
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    /// Fold a finished load into the state. `still_loading` reports whether a
    /// newer load is pending.
    pub fn finish_load(&mut self, result: &Result<SwapOutcome, LoadError>, still_loading: bool) {
        self.loading = still_loading;
        match result {
            Ok(SwapOutcome::Activated { .. }) => self.last_error = None,
            Ok(SwapOutcome::Superseded { .. }) => {}
            Err(err) => self.last_error = Some(err.to_string()),
        }
    }

    pub fn apply_ready(&mut self, ready: &SceneReady) {
        self.scene_generation = ready.generation;
        self.scene_url = Some(ready.url.clone());
        self.camera = Some(ready.pose);
    }

    /// Short label for the status bar.
    #[must_use]
    pub fn scene_label(&self) -> String {
        match (&self.scene_url, self.loading) {
            (_, true) => "loading…".to_owned(),
            (Some(url), false) => format!("#{} {}", self.scene_generation, file_name(url)),
            (None, false) => "no scene".to_owned(),
        }
    }
}

fn file_name(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path)
}
