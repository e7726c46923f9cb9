//! Shared constants for the scene crate.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

// ── Camera ──────────────────────────────────────────────────────

/// Initial horizontal orbit angle (radians).
pub const INITIAL_ALPHA: f64 = FRAC_PI_2;

/// Initial vertical orbit angle (radians).
pub const INITIAL_BETA: f64 = FRAC_PI_4;

/// Initial distance from the camera to its target.
pub const INITIAL_RADIUS: f64 = 10.0;

/// Name given to the orbit camera installed in every scene.
pub const CAMERA_NAME: &str = "camera";

// ── Staging ─────────────────────────────────────────────────────

/// Background clear color, RGBA. Opaque black.
pub const CLEAR_COLOR: [f64; 4] = [0.0, 0.0, 0.0, 1.0];

/// Intensity of the hemispheric fill light added to each scene.
pub const FILL_LIGHT_INTENSITY: f64 = 0.01;

/// Direction of the hemispheric fill light (straight up).
pub const FILL_LIGHT_DIRECTION: [f64; 3] = [0.0, 1.0, 0.0];

/// Name given to the fill light.
pub const FILL_LIGHT_NAME: &str = "hemiLight";
