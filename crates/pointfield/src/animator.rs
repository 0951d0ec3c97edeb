//! Per-frame orchestration of the ground field and the ambient particles.

use crate::config::FieldConfig;
use crate::error::ConfigError;
use crate::ground::GroundField;
use crate::particles::ParticleField;
use crate::surface::{Layer, LayerView, RenderSurface};
use glam::Vec2;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Whether the pointer has ever been observed away from the origin.
///
/// Before the first real movement the host reports the pointer at `(0, 0)`,
/// which would otherwise raise a permanent bump in the middle of the field.
/// The transition to `Interactive` is one-way: returning the pointer to the
/// exact center later does not disable the bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerPhase {
    #[default]
    Uninitialized,
    Interactive,
}

impl PointerPhase {
    /// Next phase after observing a pointer reading in NDC.
    pub fn observe(self, pointer_ndc: [f32; 2]) -> Self {
        match self {
            PointerPhase::Interactive => PointerPhase::Interactive,
            PointerPhase::Uninitialized if pointer_ndc != [0.0, 0.0] => PointerPhase::Interactive,
            PointerPhase::Uninitialized => PointerPhase::Uninitialized,
        }
    }

    pub fn is_interactive(self) -> bool {
        self == PointerPhase::Interactive
    }
}

/// What the host supplies every frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    /// Seconds since the animated view was created.
    pub elapsed_seconds: f64,
    /// Latest pointer position, `[-1, 1]` on both axes, y up.
    pub pointer_ndc: [f32; 2],
}

/// Outcome of a single [`PointFieldAnimator::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    pub ground_updated: bool,
    pub particles_updated: bool,
    /// Particles recycled to the bottom during this tick.
    pub recycled: usize,
    pub phase: PointerPhase,
}

/// Owns both point populations and advances them once per frame.
#[derive(Debug)]
pub struct PointFieldAnimator<R = StdRng> {
    config: FieldConfig,
    ground: GroundField,
    particles: ParticleField<R>,
    phase: PointerPhase,
    half_extent: Vec2,
}

impl PointFieldAnimator<StdRng> {
    /// Convenience constructor with a seeded [`StdRng`].
    pub fn seeded(config: FieldConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::new(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> PointFieldAnimator<R> {
    /// Builds both populations. Ground colors are drawn from `rng` first; the
    /// generator is then handed to the particle field for spawning and
    /// recycling.
    pub fn new(config: FieldConfig, mut rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let ground = GroundField::new(&config, &mut rng)?;
        let particles = ParticleField::from_config(&config, rng)?;
        let half_extent = Vec2::new(config.width * 0.5, config.depth * 0.5);

        log::debug!(
            "Point field ready: {} ground points, {} particles",
            ground.len(),
            particles.len()
        );

        Ok(Self {
            config,
            ground,
            particles,
            phase: PointerPhase::Uninitialized,
            half_extent,
        })
    }

    /// Advances the animation to `input.elapsed_seconds`.
    ///
    /// Layers the surface reports as unmounted are skipped for this tick.
    pub fn tick<S: RenderSurface + ?Sized>(&mut self, input: FrameInput, surface: &mut S) -> TickReport {
        let pointer_ndc = input.pointer_ndc.map(sanitize_ndc);
        self.phase = self.phase.observe(pointer_ndc);
        let pointer = self.pointer_to_world(pointer_ndc);

        let mut report = TickReport {
            phase: self.phase,
            ..TickReport::default()
        };

        if surface.is_mounted(Layer::Ground) {
            self.ground.update(input.elapsed_seconds, pointer, self.phase);
            surface.mark_dirty(Layer::Ground, self.ground_view());
            report.ground_updated = true;
        } else {
            log::trace!("Ground layer not mounted; skipping");
        }

        if surface.is_mounted(Layer::Particles) {
            report.recycled = self.particles.update();
            surface.mark_dirty(Layer::Particles, self.particle_view());
            report.particles_updated = true;
        } else {
            log::trace!("Particle layer not mounted; skipping");
        }

        report
    }
}

impl<R> PointFieldAnimator<R> {
    /// Maps a pointer in NDC onto the ground plane: x spans the field width,
    /// screen-up points away from the camera (negative z).
    pub fn pointer_to_world(&self, pointer_ndc: [f32; 2]) -> Vec2 {
        Vec2::new(
            pointer_ndc[0] * self.half_extent.x,
            -pointer_ndc[1] * self.half_extent.y,
        )
    }

    pub fn phase(&self) -> PointerPhase {
        self.phase
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn ground(&self) -> &GroundField {
        &self.ground
    }

    pub fn particles(&self) -> &ParticleField<R> {
        &self.particles
    }

    pub fn ground_view(&self) -> LayerView<'_> {
        LayerView {
            positions: self.ground.positions(),
            colors: Some(self.ground.colors()),
            style: self.config.ground_style,
        }
    }

    pub fn particle_view(&self) -> LayerView<'_> {
        LayerView {
            positions: self.particles.positions(),
            colors: None,
            style: self.config.particle_style,
        }
    }

    pub fn view(&self, layer: Layer) -> LayerView<'_> {
        match layer {
            Layer::Ground => self.ground_view(),
            Layer::Particles => self.particle_view(),
        }
    }
}

fn sanitize_ndc(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
