//! Stateless height and intensity functions shared by the generators.
//!
//! Everything here is computed in `f64`: the clock grows without bound during a
//! session and the phase terms would lose precision in `f32` long before the
//! positions themselves do.

use crate::config::WaveParams;

/// Base "breathing" height of the ground at `(x, z)` and time `t` (seconds).
///
/// `A1*sin(k1*x + w1*t) + A2*cos(k2*z + w2*t)`
#[inline]
pub fn wave(p: &WaveParams, x: f64, z: f64, t: f64) -> f64 {
    p.amplitude_x * (p.frequency_x * x + p.speed_x * t).sin()
        + p.amplitude_z * (p.frequency_z * z + p.speed_z * t).cos()
}

/// Brightness factor for a point at `(x, z)`, falling off linearly with the
/// distance from the field origin and clamped below at `floor`.
///
/// Far points are dim but never black.
#[inline]
pub fn radial_intensity(x: f64, z: f64, falloff_radius: f64, floor: f64) -> f64 {
    let dist = x.hypot(z);
    (1.0 - dist / falloff_radius).max(floor)
}

/// Upward deformation at `(x, z)` caused by a pointer at `(mx, mz)`.
///
/// Compact support: exactly zero at or beyond `radius`, quadratic falloff
/// inside it, peaking at `strength` right under the pointer.
#[inline]
pub fn pointer_bump(x: f64, z: f64, mx: f64, mz: f64, radius: f64, strength: f64) -> f64 {
    let dist = (x - mx).hypot(z - mz);
    if dist >= radius {
        return 0.0;
    }
    let f = 1.0 - dist / radius;
    strength * f * f
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn wave_is_deterministic() {
        let p = WaveParams::default();
        let samples = [(0.0, 0.0, 0.0), (3.5, -12.0, 1.25), (-54.3, 29.1, 1234.5)];
        for &(x, z, t) in &samples {
            let first = wave(&p, x, z, t);
            for _ in 0..8 {
                assert_eq!(wave(&p, x, z, t).to_bits(), first.to_bits());
            }
        }
    }

    #[test]
    fn wave_matches_closed_form() {
        let p = WaveParams::default();
        // At the origin and t=0 only the cosine term contributes.
        assert!((wave(&p, 0.0, 0.0, 0.0) - p.amplitude_z).abs() < 1e-12);

        let (x, z, t): (f64, f64, f64) = (2.0, -3.0, 0.5);
        let expected = 0.8 * (0.15 * x + 0.8 * t).sin() + 0.8 * (0.2 * z + 0.5 * t).cos();
        assert!((wave(&p, x, z, t) - expected).abs() < 1e-12);
    }

    #[test]
    fn wave_half_period_flips_sine_term() {
        let p = WaveParams::default();
        let x = 7.0;
        let half = PI / p.speed_x;
        let a = p.amplitude_x * (p.frequency_x * x).sin();
        let b = p.amplitude_x * (p.frequency_x * x + p.speed_x * half).sin();
        assert!((a + b).abs() < 1e-12);
    }

    #[test]
    fn intensity_is_clamped() {
        assert_eq!(radial_intensity(0.0, 0.0, 35.0, 0.1), 1.0);
        assert!((radial_intensity(17.5, 0.0, 35.0, 0.1) - 0.5).abs() < 1e-12);
        assert_eq!(radial_intensity(100.0, 100.0, 35.0, 0.1), 0.1);
        for i in 0..200 {
            let v = radial_intensity(i as f64, -(i as f64) * 0.5, 35.0, 0.1);
            assert!((0.1..=1.0).contains(&v));
        }
    }

    #[test]
    fn bump_has_compact_support() {
        let (mx, mz, radius, strength) = (5.0, -5.0, 12.0, 2.5);
        assert_eq!(pointer_bump(mx + radius, mz, mx, mz, radius, strength), 0.0);
        assert_eq!(pointer_bump(mx, mz - 12.000_001, mx, mz, radius, strength), 0.0);
        assert_eq!(pointer_bump(100.0, 100.0, mx, mz, radius, strength), 0.0);
        for i in 0..64 {
            let a = i as f64 * 0.1;
            let x = mx + (radius + 0.01) * a.cos();
            let z = mz + (radius + 0.01) * a.sin();
            assert_eq!(pointer_bump(x, z, mx, mz, radius, strength), 0.0);
        }
    }

    #[test]
    fn bump_is_quadratic_inside() {
        let (radius, strength) = (10.0, 2.0);
        assert_eq!(pointer_bump(0.0, 0.0, 0.0, 0.0, radius, strength), strength);
        let half = pointer_bump(5.0, 0.0, 0.0, 0.0, radius, strength);
        assert!((half - strength * 0.25).abs() < 1e-12);
        // Monotone decreasing along a ray.
        let mut prev = f64::INFINITY;
        for i in 0..100 {
            let v = pointer_bump(0.0, i as f64 * 0.1, 0.0, 0.0, radius, strength);
            assert!(v <= prev);
            prev = v;
        }
    }
}
