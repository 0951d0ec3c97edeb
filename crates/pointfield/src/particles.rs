//! Drifting ambient particles ("dust").

use crate::config::{check_particle_count, FieldConfig, ParticleBounds};
use crate::error::ConfigError;
use glam::Vec3;
use rand::{rngs::StdRng, Rng};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientParticle {
    pub position: Vec3,
    /// Rise per tick; constant for the particle's lifetime.
    pub vertical_speed: f32,
}

/// Fixed population of rising particles.
///
/// A particle that rises above `bounds.y_max` is recycled in its own slot: it
/// restarts at `bounds.y_min` with a new random x, keeping its z and speed.
#[derive(Debug, Clone)]
pub struct ParticleField<R = StdRng> {
    positions: Vec<Vec3>,
    speeds: Vec<f32>,
    bounds: ParticleBounds,
    rng: R,
}

impl<R: Rng> ParticleField<R> {
    pub fn new(
        count: usize,
        bounds: ParticleBounds,
        speed_min: f32,
        speed_max: f32,
        mut rng: R,
    ) -> Result<Self, ConfigError> {
        bounds.validate()?;
        check_speed_range(speed_min, speed_max)?;
        check_particle_count(count)?;

        let mut positions = Vec::with_capacity(count);
        let mut speeds = Vec::with_capacity(count);
        for _ in 0..count {
            positions.push(Vec3::new(
                rng.gen_range(bounds.x_min..bounds.x_max),
                rng.gen_range(bounds.y_min..bounds.y_max),
                rng.gen_range(bounds.z_min..bounds.z_max),
            ));
            speeds.push(rng.gen_range(speed_min..=speed_max));
        }

        Ok(Self {
            positions,
            speeds,
            bounds,
            rng,
        })
    }

    pub fn from_config(cfg: &FieldConfig, rng: R) -> Result<Self, ConfigError> {
        Self::new(
            cfg.particle_count,
            cfg.particle_bounds,
            cfg.particle_speed_min,
            cfg.particle_speed_max,
            rng,
        )
    }

    /// Rebuilds a field from explicit particles, e.g. a saved snapshot.
    pub fn from_particles(
        particles: &[AmbientParticle],
        bounds: ParticleBounds,
        rng: R,
    ) -> Result<Self, ConfigError> {
        bounds.validate()?;
        if let Some(p) = particles
            .iter()
            .find(|p| !(p.vertical_speed.is_finite() && p.vertical_speed > 0.0))
        {
            return Err(ConfigError::NonPositiveSpeed(p.vertical_speed as f64));
        }

        Ok(Self {
            positions: particles.iter().map(|p| p.position).collect(),
            speeds: particles.iter().map(|p| p.vertical_speed).collect(),
            bounds,
            rng,
        })
    }

    /// Advances every particle by one tick. Returns how many were recycled.
    pub fn update(&mut self) -> usize {
        let b = self.bounds;
        let mut recycled = 0;
        for (p, &v) in self.positions.iter_mut().zip(&self.speeds) {
            p.y += v;
            if p.y > b.y_max {
                p.y = b.y_min;
                p.x = self.rng.gen_range(b.x_min..b.x_max);
                recycled += 1;
            }
        }
        recycled
    }
}

impl<R> ParticleField<R> {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn bounds(&self) -> &ParticleBounds {
        &self.bounds
    }

    /// Interleaved `x, y, z` per particle.
    pub fn positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn particle(&self, index: usize) -> Option<AmbientParticle> {
        Some(AmbientParticle {
            position: *self.positions.get(index)?,
            vertical_speed: self.speeds[index],
        })
    }

    pub fn particles(&self) -> impl Iterator<Item = AmbientParticle> + '_ {
        self.positions
            .iter()
            .zip(&self.speeds)
            .map(|(&position, &vertical_speed)| AmbientParticle {
                position,
                vertical_speed,
            })
    }
}

fn check_speed_range(min: f32, max: f32) -> Result<(), ConfigError> {
    if !(min.is_finite() && min > 0.0) {
        return Err(ConfigError::NonPositiveSpeed(min as f64));
    }
    if !max.is_finite() || min > max {
        return Err(ConfigError::EmptyRange {
            field: "particle_speed",
            min: min as f64,
            max: max as f64,
        });
    }
    Ok(())
}
