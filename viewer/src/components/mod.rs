//! Viewer chrome and the render surface.

pub mod canvas_host;
pub mod status_bar;
pub mod toolbar;
