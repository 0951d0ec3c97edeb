//! pointfield: procedural point-field animator for a decorative hero background.
//!
//! Two point populations are owned by a single [`PointFieldAnimator`]:
//!
//! - A **ground field**: a fixed lattice of points on a flat plane whose heights
//!   are recomputed every frame from an analytic wave plus a localized bump under
//!   the pointer. Colors are computed once at construction and never change.
//! - **Ambient particles**: a small population of dust motes drifting upwards,
//!   recycled in place when they leave the visible volume.
//!
//! The host drives the animator once per frame with the elapsed clock time and
//! the pointer position in normalized device coordinates. After each tick the
//! animator notifies a [`RenderSurface`] which layers changed and lends it
//! read-only views of the flat `f32` buffers:
//!
//!   ground positions : [x, y, z] * N   (rewritten every tick)
//!   ground colors    : [r, g, b] * N   (linear RGB, written once)
//!   particle positions: [x, y, z] * M  (rewritten every tick)
//!
//! All randomness comes from an injected [`rand::Rng`], so a seeded generator
//! reproduces the exact same field.

pub mod animator;
pub mod config;
pub mod error;
pub mod ground;
pub mod math;
pub mod particles;
pub mod surface;

pub use animator::{FrameInput, PointFieldAnimator, PointerPhase, TickReport};
pub use config::{
    FieldConfig, ParticleBounds, Preset, Rgb, SpriteStyle, WaveParams, MAX_GROUND_POINTS,
    MAX_PARTICLES,
};
pub use error::ConfigError;
pub use ground::{GroundField, GroundPoint};
pub use particles::{AmbientParticle, ParticleField};
pub use surface::{Layer, LayerView, RenderSurface};
