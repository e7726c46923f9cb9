//! Scene hot-swap with viewpoint preservation.
//!
//! DESIGN
//! ======
//! `SceneHost` owns exactly one active scene and one [`PoseSnapshot`]. A load
//! runs in this order, with no await between steps 2 and 6:
//!
//! 1. Import the new scene (the only suspension point).
//! 2. Drop the result if a newer load is still pending or already active.
//! 3. Stage it and transfer the camera pose.
//! 4. Activate it.
//! 5. Dispose the previous scene.
//! 6. Publish [`SceneReady`].
//!
//! A failed import returns before step 2 and leaves the active scene alone.
//! It also stops counting as "newer": when the newest request fails, the
//! most recent older load that succeeds is still swapped in.
//!
//! All state sits in `Cell`/`RefCell` so a shared `Rc<SceneHost>` can serve
//! overlapping loads on a single-threaded executor.

#[cfg(test)]
#[path = "host_test.rs"]
mod host_test;

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;

use crate::camera::{CameraPose, PoseSnapshot};
use crate::engine::{LoadError, SceneEngine, SceneSettings};
use crate::events::Subscribers;

/// Notification published after a scene swap completes.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneReady {
    /// Generation of the scene that is now active.
    pub generation: u64,
    pub url: String,
    /// Pose applied to the new scene's camera.
    pub pose: CameraPose,
}

/// What a finished [`SceneHost::load_scene`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// The loaded scene is now active.
    Activated { generation: u64 },
    /// A newer load was requested first; the loaded scene was discarded.
    Superseded { generation: u64 },
}

pub struct SceneHost<E: SceneEngine> {
    engine: E,
    settings: SceneSettings,
    snapshot: PoseSnapshot,
    active: RefCell<Option<E::Scene>>,
    /// Generation of the active scene. The startup scene is generation 0.
    active_generation: Cell<u64>,
    /// Latest generation handed out to a load request.
    requested: Cell<u64>,
    /// Generations whose import has not resolved yet.
    pending: RefCell<BTreeSet<u64>>,
    swaps: Cell<u64>,
    ready: Subscribers<SceneReady>,
}

impl<E: SceneEngine> SceneHost<E> {
    /// Bring up the render surface with a default scene and camera, then start
    /// the render loop and resize tracking.
    pub fn initialize(engine: E, settings: SceneSettings) -> Self {
        let snapshot = PoseSnapshot::new();
        let scene = engine.create_scene();
        engine.stage(&scene, &settings);
        engine.install_camera(&scene, settings.initial_pose, snapshot.recorder(0));
        engine.activate(&scene);
        engine.start_render_loop();
        engine.watch_resize();
        log::info!("scene host ready");

        Self {
            engine,
            settings,
            snapshot,
            active: RefCell::new(Some(scene)),
            active_generation: Cell::new(0),
            requested: Cell::new(0),
            pending: RefCell::new(BTreeSet::new()),
            swaps: Cell::new(0),
            ready: Subscribers::new(),
        }
    }

    /// Load the scene at `url` and swap it in, keeping the current viewpoint.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the import fails. The active scene is left
    /// untouched in that case.
    pub async fn load_scene(&self, url: &str) -> Result<SwapOutcome, LoadError> {
        let generation = self.requested.get() + 1;
        self.requested.set(generation);
        log::debug!("scene load {generation} requested: {url}");

        self.pending.borrow_mut().insert(generation);
        let imported = self.engine.import_scene(url).await;
        self.pending.borrow_mut().remove(&generation);
        let scene = imported?;

        if let Some(newer) = self.newer_than(generation) {
            log::info!("scene load {generation} superseded by {newer}; discarding");
            self.engine.dispose(scene);
            return Ok(SwapOutcome::Superseded { generation });
        }

        self.engine.stage(&scene, &self.settings);
        let pose = self.resolve_pose(&scene);
        self.snapshot.set_owner(generation);
        self.engine
            .install_camera(&scene, pose, self.snapshot.recorder(generation));
        self.engine.activate(&scene);

        let previous = self.active.replace(Some(scene));
        self.active_generation.set(generation);
        if let Some(previous) = previous {
            self.engine.dispose(previous);
        }
        self.swaps.set(self.swaps.get() + 1);
        log::info!("scene {generation} active: {url}");

        self.ready
            .publish(&SceneReady { generation, url: url.to_owned(), pose });
        Ok(SwapOutcome::Activated { generation })
    }

    /// A newer generation that is either active or still importing.
    fn newer_than(&self, generation: u64) -> Option<u64> {
        let active = self.active_generation.get();
        if active > generation {
            return Some(active);
        }
        self.pending.borrow().range(generation + 1..).next_back().copied()
    }

    /// Pick the pose for the camera of a freshly imported scene.
    ///
    /// An existing snapshot wins. Otherwise the snapshot is seeded from the
    /// camera shipped in the file, then the outgoing scene's camera, then the
    /// zeroed default.
    ///
    /// In the browser the startup camera records on its first rendered frame,
    /// so a snapshot nearly always exists before the first load. The embedded
    /// camera only seeds it when a load lands before any frame was drawn.
    fn resolve_pose(&self, incoming: &E::Scene) -> CameraPose {
        if let Some(pose) = self.snapshot.get() {
            return pose;
        }
        let seeded = self
            .engine
            .camera_pose(incoming)
            .or_else(|| {
                self.active
                    .borrow()
                    .as_ref()
                    .and_then(|current| self.engine.camera_pose(current))
            })
            .unwrap_or_default();
        self.snapshot.record(seeded);
        seeded
    }

    /// Register a listener for completed swaps. Listeners run in registration
    /// order after the previous scene has been disposed.
    pub fn on_scene_ready(&self, listener: impl Fn(&SceneReady) + 'static) {
        self.ready.subscribe(listener);
    }

    /// Run `f` against the active scene.
    pub fn with_active_scene<R>(&self, f: impl FnOnce(&E::Scene) -> R) -> Option<R> {
        self.active.borrow().as_ref().map(f)
    }

    /// Last recorded viewpoint of the active camera.
    #[must_use]
    pub fn snapshot(&self) -> Option<CameraPose> {
        self.snapshot.get()
    }

    /// Latest generation handed to a load request.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.requested.get()
    }

    /// Generation of the scene currently on screen.
    #[must_use]
    pub fn active_generation(&self) -> u64 {
        self.active_generation.get()
    }

    /// Number of completed swaps.
    #[must_use]
    pub fn swap_count(&self) -> u64 {
        self.swaps.get()
    }

    /// True while at least one import is still pending.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        !self.pending.borrow().is_empty()
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[must_use]
    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }
}
