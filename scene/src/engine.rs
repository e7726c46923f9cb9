//! The seam between [`crate::host::SceneHost`] and a concrete 3D engine.
//!
//! The host decides *when* things happen: staging, camera transfer, activation,
//! disposal. The engine decides *how*. Implementations are single-threaded and
//! may be driven from browser callbacks, so nothing here is `Send`.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::rc::Rc;

use crate::camera::{CameraPose, Vec3};
use crate::consts::{CLEAR_COLOR, FILL_LIGHT_DIRECTION, FILL_LIGHT_INTENSITY};

/// Callback invoked with the camera pose on every view change.
pub type PoseListener = Rc<dyn Fn(CameraPose)>;

/// Why a scene could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// The resource could not be retrieved.
    #[error("failed to fetch scene from {url}: {reason}")]
    Fetch { url: String, reason: String },
    /// The resource was retrieved but is not a usable scene.
    #[error("failed to parse scene from {url}: {reason}")]
    Parse { url: String, reason: String },
}

impl LoadError {
    /// URL of the resource that failed.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Fetch { url, .. } | Self::Parse { url, .. } => url,
        }
    }

    /// Classify a loader failure message.
    ///
    /// Engines usually report a single rejection for both network and format
    /// problems; network failures are recognizable by their wording.
    #[must_use]
    pub fn classify(url: &str, reason: &str) -> Self {
        let lowered = reason.to_ascii_lowercase();
        let is_fetch = ["unable to load", "failed to fetch", "networkerror", "404", "status"]
            .iter()
            .any(|needle| lowered.contains(needle));
        if is_fetch {
            Self::Fetch { url: url.to_owned(), reason: reason.to_owned() }
        } else {
            Self::Parse { url: url.to_owned(), reason: reason.to_owned() }
        }
    }
}

/// RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color4 {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color4 {
    #[must_use]
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }
}

/// How every scene is staged before it becomes active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneSettings {
    pub clear_color: Color4,
    pub fill_light_intensity: f64,
    pub fill_light_direction: Vec3,
    /// Pose of the camera installed by [`crate::host::SceneHost::initialize`].
    pub initial_pose: CameraPose,
}

impl Default for SceneSettings {
    fn default() -> Self {
        let [r, g, b, a] = CLEAR_COLOR;
        let [x, y, z] = FILL_LIGHT_DIRECTION;
        Self {
            clear_color: Color4::new(r, g, b, a),
            fill_light_intensity: FILL_LIGHT_INTENSITY,
            fill_light_direction: Vec3::new(x, y, z),
            initial_pose: CameraPose::INITIAL,
        }
    }
}

/// Operations the scene host needs from a 3D engine.
#[allow(async_fn_in_trait)]
pub trait SceneEngine {
    /// An engine-owned scene graph.
    type Scene;

    /// Build an empty scene.
    fn create_scene(&self) -> Self::Scene;

    /// Fetch, parse, and construct a scene from a binary glTF resource.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the resource cannot be retrieved or parsed.
    async fn import_scene(&self, url: &str) -> Result<Self::Scene, LoadError>;

    /// Apply background color and fill light.
    fn stage(&self, scene: &Self::Scene, settings: &SceneSettings);

    /// Pose of the scene's current camera, if it has one.
    fn camera_pose(&self, scene: &Self::Scene) -> Option<CameraPose>;

    /// Install the orbit camera at `pose`, make it the scene's active camera,
    /// attach user input to the surface, and call `on_view_change` on every
    /// view change.
    fn install_camera(&self, scene: &Self::Scene, pose: CameraPose, on_view_change: PoseListener);

    /// Make `scene` the one drawn by the render loop.
    fn activate(&self, scene: &Self::Scene);

    /// Release everything the scene owns.
    fn dispose(&self, scene: Self::Scene);

    /// Start the per-frame render cycle. It runs for the life of the page.
    fn start_render_loop(&self);

    /// Keep the render target matched to the surface size.
    fn watch_resize(&self);
}
