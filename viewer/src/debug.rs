//! Diagnostics for the running viewer.
//!
//! [`DebugBindings`] is built once at startup from the Comms and SceneHost
//! handles and handed to whatever needs to inspect them (the status bar,
//! tests). [`DebugReport`] is a plain serializable snapshot.

#[cfg(test)]
#[path = "debug_test.rs"]
mod debug_test;

use std::rc::Rc;

use scene::camera::CameraPose;
use scene::engine::SceneEngine;
use scene::host::SceneHost;
use serde::Serialize;

use crate::net::comms::{Comms, ConnectionState, Transport};

/// Point-in-time view of the socket channel and the scene host.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DebugReport {
    pub connection: ConnectionState,
    pub pending_messages: usize,
    pub listeners: usize,
    pub scene_generation: u64,
    pub requested_generation: u64,
    pub swaps: u64,
    pub loading: bool,
    pub camera: Option<CameraPose>,
}

impl DebugReport {
    /// Compact one-line rendering for the status bar.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{} | queued {} | scene {}/{} | swaps {}",
            self.connection, self.pending_messages, self.scene_generation, self.requested_generation, self.swaps
        );
        if let Some(pose) = self.camera {
            line.push_str(&format!(" | α {:.2} β {:.2} r {:.2}", pose.alpha, pose.beta, pose.radius));
        }
        line
    }
}

pub struct DebugBindings<T: Transport, E: SceneEngine> {
    comms: Rc<Comms<T>>,
    host: Rc<SceneHost<E>>,
}

impl<T: Transport, E: SceneEngine> DebugBindings<T, E> {
    pub fn new(comms: Rc<Comms<T>>, host: Rc<SceneHost<E>>) -> Self {
        Self { comms, host }
    }

    #[must_use]
    pub fn comms(&self) -> &Rc<Comms<T>> {
        &self.comms
    }

    #[must_use]
    pub fn host(&self) -> &Rc<SceneHost<E>> {
        &self.host
    }

    #[must_use]
    pub fn report(&self) -> DebugReport {
        DebugReport {
            connection: self.comms.state(),
            pending_messages: self.comms.pending(),
            listeners: self.comms.listener_count(),
            scene_generation: self.host.active_generation(),
            requested_generation: self.host.generation(),
            swaps: self.host.swap_count(),
            loading: self.host.is_loading(),
            camera: self.host.snapshot(),
        }
    }

    /// The current report as pretty JSON, for logging.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if the report cannot be encoded.
    pub fn report_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.report())
    }
}

impl<T: Transport, E: SceneEngine> Clone for DebugBindings<T, E> {
    fn clone(&self) -> Self {
        Self { comms: Rc::clone(&self.comms), host: Rc::clone(&self.host) }
    }
}
