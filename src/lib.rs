//! Rotating torus viewer.
//!
//! [`geometry`] owns the mesh: torus tessellation and area-weighted vertex
//! normals. Everything else is the viewer shell around it.

pub mod config;
pub mod geometry;
pub mod interaction;
pub mod logging;
pub mod renderer;
pub mod ui;
