//! Scene hosting for the GLB viewer.
//!
//! This crate owns the replaceable scene and the camera viewpoint that has to
//! survive each replacement. The 3D engine itself is external: [`host::SceneHost`]
//! drives it through the [`engine::SceneEngine`] trait, and [`babylon`] binds
//! that trait to Babylon.js for the browser build. Everything outside
//! [`babylon`] is plain Rust and is tested natively with a recording engine.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`host`] | Hot-swap sequencing, load generations, ready notifications |
//! | [`engine`] | The engine seam, scene settings, and [`engine::LoadError`] |
//! | [`camera`] | Orbit camera pose and the shared pose snapshot |
//! | [`events`] | Ordered publish/subscribe lists |
//! | [`babylon`] | `wasm-bindgen` bindings to Babylon.js and its `SceneEngine` impl |
//! | [`consts`] | Initial pose, clear color, fill light |

pub mod babylon;
pub mod camera;
pub mod consts;
pub mod engine;
pub mod events;
pub mod host;
