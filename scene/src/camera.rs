#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use std::cell::Cell;
use std::f64::consts::TAU;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::consts::{INITIAL_ALPHA, INITIAL_BETA, INITIAL_RADIUS};

/// A point or direction in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    #[must_use]
    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    #[must_use]
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    #[must_use]
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Orbit camera viewpoint.
///
/// `alpha` is the longitudinal angle and `beta` the latitudinal angle, both in
/// radians, measured the way Babylon's `ArcRotateCamera` measures them: the
/// camera sits at `target + radius * (cos α sin β, cos β, sin α sin β)`.
///
/// `Default` is the zeroed pose used to seed a snapshot when nothing better is
/// known.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraPose {
    pub alpha: f64,
    pub beta: f64,
    pub target: Vec3,
    pub radius: f64,
}

impl CameraPose {
    /// Pose of the camera installed at startup.
    pub const INITIAL: Self = Self { alpha: INITIAL_ALPHA, beta: INITIAL_BETA, target: Vec3::ZERO, radius: INITIAL_RADIUS };

    /// World-space camera position for this pose.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        let (sin_a, cos_a) = self.alpha.sin_cos();
        let (sin_b, cos_b) = self.beta.sin_cos();
        self.target
            .add(Vec3::new(cos_a * sin_b, cos_b, sin_a * sin_b).scale(self.radius))
    }

    /// Orbit pose that places a camera at `position` looking at `target`.
    ///
    /// Used to inherit the viewpoint of a free camera shipped inside a scene
    /// file. A camera sitting on its target yields zero angles and radius.
    #[must_use]
    pub fn looking_from(position: Vec3, target: Vec3) -> Self {
        let offset = position.sub(target);
        let radius = offset.length();
        if radius <= f64::EPSILON {
            return Self { alpha: 0.0, beta: 0.0, target, radius: 0.0 };
        }
        let beta = (offset.y / radius).clamp(-1.0, 1.0).acos();
        let alpha = offset.z.atan2(offset.x).rem_euclid(TAU);
        Self { alpha, beta, target, radius }
    }
}

/// Shared record of the most recent viewpoint of the active camera.
///
/// Clones share the same cell. View-change callbacks are created with
/// [`PoseSnapshot::recorder`] and tagged with the generation of the scene that
/// owns the camera; only the current owner's events are recorded, so a camera
/// that outlives its scene cannot overwrite the pose.
#[derive(Debug, Clone, Default)]
pub struct PoseSnapshot {
    pose: Rc<Cell<Option<CameraPose>>>,
    owner: Rc<Cell<u64>>,
}

impl PoseSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded pose, if any camera has reported one yet.
    #[must_use]
    pub fn get(&self) -> Option<CameraPose> {
        self.pose.get()
    }

    /// Overwrite the recorded pose.
    pub fn record(&self, pose: CameraPose) {
        self.pose.set(Some(pose));
    }

    /// Generation whose camera currently feeds the snapshot.
    #[must_use]
    pub fn owner(&self) -> u64 {
        self.owner.get()
    }

    /// Hand the snapshot to the camera of `generation`.
    pub fn set_owner(&self, generation: u64) {
        self.owner.set(generation);
    }

    /// View-change callback for the camera of `generation`.
    #[must_use]
    pub fn recorder(&self, generation: u64) -> Rc<dyn Fn(CameraPose)> {
        let snapshot = self.clone();
        Rc::new(move |pose| {
            if snapshot.owner() == generation {
                snapshot.record(pose);
            }
        })
    }
}
