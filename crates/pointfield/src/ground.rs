//! The animated ground lattice.

use crate::animator::PointerPhase;
use crate::config::{FieldConfig, WaveParams};
use crate::error::ConfigError;
use crate::math::{pointer_bump, radial_intensity, wave};
use glam::{Vec2, Vec3};
use rand::Rng;

/// Snapshot of a single lattice point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundPoint {
    /// Fixed lattice coordinate `(x, z)`.
    pub base_position: [f32; 2],
    pub rest_height: f32,
    pub current_height: f32,
    /// Linear RGB, already scaled by the radial intensity.
    pub color: [f32; 3],
}

/// Fixed-size lattice of points whose heights are animated in place.
///
/// Index `i` always refers to the same `(x, z)`: points are laid out row-major
/// with rows along x and columns along z.
#[derive(Debug, Clone)]
pub struct GroundField {
    positions: Vec<Vec3>,
    colors: Vec<Vec3>,
    rest_height: f32,
    wave: WaveParams,
    influence_radius: f64,
    influence_strength: f64,
    natural_count: usize,
}

impl GroundField {
    /// Builds the lattice and its static colors.
    ///
    /// If the configured density would produce more than `max_ground_points`
    /// points the lattice is truncated in iteration order.
    pub fn new<R: Rng + ?Sized>(cfg: &FieldConfig, rng: &mut R) -> Result<Self, ConfigError> {
        cfg.validate()?;

        let (nx, nz) = cfg.lattice_dims();
        let natural_count = nx.saturating_mul(nz);
        let capacity = natural_count.min(cfg.max_ground_points);

        let mut positions = Vec::with_capacity(capacity);
        let mut colors = Vec::with_capacity(capacity);

        let color_a = cfg.color_a.to_linear();
        let color_b = cfg.color_b.to_linear();
        let half_w = cfg.width * 0.5;
        let half_d = cfg.depth * 0.5;

        'rows: for ix in 0..nx {
            for iz in 0..nz {
                if positions.len() >= capacity {
                    break 'rows;
                }
                let x = ix as f32 * cfg.density - half_w;
                let z = iz as f32 * cfg.density - half_d + cfg.z_offset;
                positions.push(Vec3::new(x, cfg.rest_height, z));

                let intensity = radial_intensity(
                    x as f64,
                    z as f64,
                    cfg.intensity_falloff_radius as f64,
                    cfg.intensity_floor as f64,
                ) as f32;
                let blend = rng.gen::<f32>() * cfg.color_blend_max;
                colors.push(color_a.lerp(color_b, blend) * intensity);
            }
        }

        if capacity < natural_count {
            log::warn!(
                "Ground lattice truncated: {}x{} = {} points requested, capped at {}",
                nx,
                nz,
                natural_count,
                capacity
            );
        }
        log::debug!(
            "Ground field: {} points, spacing {:.2}, extent {:.1}x{:.1}",
            positions.len(),
            cfg.density,
            cfg.width,
            cfg.depth
        );

        Ok(Self {
            positions,
            colors,
            rest_height: cfg.rest_height,
            wave: cfg.wave,
            influence_radius: cfg.pointer_influence_radius as f64,
            influence_strength: cfg.pointer_influence_strength as f64,
            natural_count,
        })
    }

    /// Recomputes every height for time `t`.
    ///
    /// `pointer` is in world units on the `(x, z)` plane and is ignored
    /// entirely while `phase` is [`PointerPhase::Uninitialized`].
    pub fn update(&mut self, t: f64, pointer: Vec2, phase: PointerPhase) {
        let rest = self.rest_height as f64;
        let influence = match phase {
            PointerPhase::Uninitialized => None,
            PointerPhase::Interactive => Some((pointer.x as f64, pointer.y as f64)),
        };

        for p in &mut self.positions {
            let (x, z) = (p.x as f64, p.z as f64);
            let mut y = rest + wave(&self.wave, x, z, t);
            if let Some((mx, mz)) = influence {
                y += pointer_bump(x, z, mx, mz, self.influence_radius, self.influence_strength);
            }
            p.y = y as f32;
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Points the lattice would have had without the cap.
    pub fn natural_count(&self) -> usize {
        self.natural_count
    }

    pub fn truncated(&self) -> bool {
        self.positions.len() < self.natural_count
    }

    pub fn rest_height(&self) -> f32 {
        self.rest_height
    }

    /// Interleaved `x, y, z` per point.
    pub fn positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Interleaved linear `r, g, b` per point.
    pub fn colors(&self) -> &[f32] {
        bytemuck::cast_slice(&self.colors)
    }

    pub fn point(&self, index: usize) -> Option<GroundPoint> {
        let p = self.positions.get(index)?;
        let c = self.colors[index];
        Some(GroundPoint {
            base_position: [p.x, p.z],
            rest_height: self.rest_height,
            current_height: p.y,
            color: c.to_array(),
        })
    }

    pub fn points(&self) -> impl Iterator<Item = GroundPoint> + '_ {
        (0..self.len()).filter_map(move |i| self.point(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn lattice(width: f32, depth: f32, density: f32, max_ground_points: usize) -> FieldConfig {
        FieldConfig {
            width,
            depth,
            density,
            max_ground_points,
            z_offset: 0.0,
            ..FieldConfig::default()
        }
    }

    fn pure_wave_height(field: &GroundField, cfg: &FieldConfig, p: &GroundPoint, t: f64) -> f32 {
        let [x, z] = p.base_position;
        (field.rest_height() as f64 + wave(&cfg.wave, x as f64, z as f64, t)) as f32
    }

    #[test]
    fn builds_flat_centered_lattice() {
        let cfg = lattice(10.0, 10.0, 1.0, 1000);
        let field = GroundField::new(&cfg, &mut StdRng::seed_from_u64(1)).unwrap();

        assert_eq!(field.len(), 100);
        assert!(!field.truncated());
        assert_eq!(field.positions().len(), 300);
        assert_eq!(field.colors().len(), 300);

        let first = field.point(0).unwrap();
        assert_eq!(first.base_position, [-5.0, -5.0]);
        let last = field.point(99).unwrap();
        assert_eq!(last.base_position, [4.0, 4.0]);
        assert!(field.points().all(|p| p.current_height == cfg.rest_height));
    }

    #[test]
    fn truncates_in_row_major_order() {
        // 25 x 20 = 500 lattice sites, capped at 100.
        let cfg = lattice(25.0, 20.0, 1.0, 100);
        let field = GroundField::new(&cfg, &mut StdRng::seed_from_u64(2)).unwrap();

        assert_eq!(field.len(), 100);
        assert_eq!(field.natural_count(), 500);
        assert!(field.truncated());

        for (i, p) in field.points().enumerate() {
            let (ix, iz) = (i / 20, i % 20);
            assert_eq!(p.base_position, [ix as f32 - 12.5, iz as f32 - 10.0]);
        }
    }

    #[test]
    fn z_offset_shifts_lattice() {
        let cfg = FieldConfig {
            z_offset: -15.0,
            ..lattice(4.0, 4.0, 1.0, 100)
        };
        let field = GroundField::new(&cfg, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(field.point(0).unwrap().base_position, [-2.0, -17.0]);
    }

    #[test]
    fn pointer_ignored_until_interactive() {
        let cfg = lattice(10.0, 10.0, 1.0, 1000);
        let mut field = GroundField::new(&cfg, &mut StdRng::seed_from_u64(4)).unwrap();

        let t = 2.75;
        field.update(t, Vec2::new(5.0, 5.0), PointerPhase::Uninitialized);
        for p in field.points() {
            assert_eq!(p.current_height, pure_wave_height(&field, &cfg, &p, t));
        }

        field.update(t, Vec2::new(0.0, 0.0), PointerPhase::Interactive);
        let raised = field
            .points()
            .filter(|p| p.current_height > pure_wave_height(&field, &cfg, p, t))
            .count();
        assert!(raised > 0);
    }

    #[test]
    fn bump_only_inside_radius() {
        let cfg = FieldConfig {
            pointer_influence_radius: 3.0,
            pointer_influence_strength: 2.5,
            ..lattice(20.0, 20.0, 1.0, 1000)
        };
        let mut field = GroundField::new(&cfg, &mut StdRng::seed_from_u64(5)).unwrap();
        let pointer = Vec2::new(1.0, -2.0);
        field.update(0.5, pointer, PointerPhase::Interactive);

        for p in field.points() {
            let d = Vec2::from(p.base_position).distance(pointer);
            let base = pure_wave_height(&field, &cfg, &p, 0.5);
            if d >= 3.0 {
                assert_eq!(p.current_height, base);
            } else {
                assert!(p.current_height >= base);
            }
        }
        // Directly under the pointer the full strength applies.
        let under = field
            .points()
            .find(|p| p.base_position == [1.0, -2.0])
            .unwrap();
        let base = pure_wave_height(&field, &cfg, &under, 0.5);
        assert!((under.current_height - base - 2.5).abs() < 1e-5);
    }

    #[test]
    fn colors_never_change() {
        let cfg = lattice(30.0, 20.0, 0.5, 5000);
        let mut field = GroundField::new(&cfg, &mut StdRng::seed_from_u64(6)).unwrap();
        let before = field.colors().to_vec();

        for i in 0..50 {
            let phase = if i % 2 == 0 {
                PointerPhase::Uninitialized
            } else {
                PointerPhase::Interactive
            };
            field.update(i as f64 * 0.016, Vec2::new(i as f32 * 0.3, -3.0), phase);
        }
        assert_eq!(field.colors(), before.as_slice());
    }

    #[test]
    fn points_keep_their_lattice_site() {
        let cfg = lattice(30.0, 20.0, 0.5, 1500);
        let mut field = GroundField::new(&cfg, &mut StdRng::seed_from_u64(8)).unwrap();
        let sites: Vec<[f32; 2]> = field.points().map(|p| p.base_position).collect();

        for i in 0..300 {
            let phase = if i < 40 {
                PointerPhase::Uninitialized
            } else {
                PointerPhase::Interactive
            };
            let pointer = Vec2::new((i as f32 * 0.37).sin() * 15.0, (i as f32 * 0.21).cos() * 10.0);
            field.update(i as f64 * 0.016, pointer, phase);

            for (idx, site) in sites.iter().enumerate() {
                let p = field.point(idx).unwrap();
                assert_eq!(p.base_position, *site);
                let xyz = &field.positions()[idx * 3..idx * 3 + 3];
                assert_eq!([xyz[0], xyz[2]], *site);
                assert_eq!(xyz[1], p.current_height);
            }
        }
        assert_eq!(field.len(), sites.len());
    }

    #[test]
    fn colors_follow_intensity_and_palette() {
        let cfg = lattice(110.0, 60.0, 2.0, 14_000);
        let field = GroundField::new(&cfg, &mut StdRng::seed_from_u64(7)).unwrap();
        let a = cfg.color_a.to_linear();
        let b = cfg.color_b.to_linear();

        for p in field.points() {
            let [x, z] = p.base_position;
            let k = radial_intensity(x as f64, z as f64, 35.0, 0.1) as f32;
            let c = Vec3::from(p.color);
            // Red is saturated in both endpoints, so it carries the intensity.
            assert!((c.x - k).abs() < 1e-5);
            // Green is blended at most halfway towards the second color.
            assert!(c.y >= a.y * k - 1e-6);
            assert!(c.y <= a.lerp(b, 0.5).y * k + 1e-6);
        }
    }

    #[test]
    fn same_seed_same_field() {
        let cfg = lattice(20.0, 20.0, 0.5, 10_000);
        let f1 = GroundField::new(&cfg, &mut StdRng::seed_from_u64(42)).unwrap();
        let f2 = GroundField::new(&cfg, &mut StdRng::seed_from_u64(42)).unwrap();
        let f3 = GroundField::new(&cfg, &mut StdRng::seed_from_u64(43)).unwrap();
        assert_eq!(f1.colors(), f2.colors());
        assert_ne!(f1.colors(), f3.colors());
    }

    #[test]
    fn invalid_config_fails_fast() {
        let cfg = lattice(10.0, 10.0, -1.0, 100);
        assert!(GroundField::new(&cfg, &mut StdRng::seed_from_u64(0)).is_err());
    }
}
