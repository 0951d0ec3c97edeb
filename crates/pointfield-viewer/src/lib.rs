//! Desktop host for the `pointfield` animator.
//!
//! Drives the animator from a winit event loop, draws both layers as additive
//! round sprites with wgpu, and finishes the frame with bloom and a vignette.

pub mod app;
pub mod camera;
pub mod config;
pub mod input;
pub mod renderer;
pub mod ui;
