//! Field configuration, color parsing and the built-in presets.

use crate::error::ConfigError;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An sRGB color with channels in `[0, 1]`, written as `"#RRGGBB"` in config files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub [f32; 3]);

impl Rgb {
    pub fn from_hex(s: &str) -> Result<Self, ConfigError> {
        let bad = || ConfigError::InvalidColor(s.to_owned());
        let hex = s.strip_prefix('#').ok_or_else(bad)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(bad());
        }
        let mut out = [0.0f32; 3];
        for (i, c) in out.iter_mut().enumerate() {
            let byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| bad())?;
            *c = byte as f32 / 255.0;
        }
        Ok(Self(out))
    }

    /// Converts to linear RGB, the space colors are blended and rendered in.
    pub fn to_linear(self) -> Vec3 {
        fn decode(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        Vec3::new(decode(self.0[0]), decode(self.0[1]), decode(self.0[2]))
    }
}

impl FromStr for Rgb {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        write!(f, "#{r:02X}{g:02X}{b:02X}")
    }
}

/// Constants of the two-term ground wave, see [`crate::math::wave`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveParams {
    pub amplitude_x: f64,
    /// Spatial frequency along x (radians per world unit).
    pub frequency_x: f64,
    /// Angular speed of the x term (radians per second).
    pub speed_x: f64,
    pub amplitude_z: f64,
    pub frequency_z: f64,
    pub speed_z: f64,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            amplitude_x: 0.8,
            frequency_x: 0.15,
            speed_x: 0.8,
            amplitude_z: 0.8,
            frequency_z: 0.2,
            speed_z: 0.5,
        }
    }
}

/// Upper bound on `particle_count`.
pub const MAX_PARTICLES: usize = 1 << 20;

/// Upper bound on the ground points a configuration may allocate.
pub const MAX_GROUND_POINTS: usize = 1 << 22;

pub(crate) fn check_particle_count(count: usize) -> Result<(), ConfigError> {
    if count > MAX_PARTICLES {
        return Err(ConfigError::TooMany {
            field: "particle_count",
            value: count,
            max: MAX_PARTICLES,
        });
    }
    Ok(())
}

/// Volume the ambient particles live in.
///
/// `y_max` is the recycle threshold and `y_min` the height a recycled particle
/// restarts from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleBounds {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
    pub z_min: f32,
    pub z_max: f32,
}

impl ParticleBounds {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for (field, min, max) in [
            ("particle_bounds.x", self.x_min, self.x_max),
            ("particle_bounds.y", self.y_min, self.y_max),
            ("particle_bounds.z", self.z_min, self.z_max),
        ] {
            finite(field, min)?;
            finite(field, max)?;
            if min >= max {
                return Err(ConfigError::EmptyRange {
                    field,
                    min: min as f64,
                    max: max as f64,
                });
            }
            if !(max - min).is_finite() {
                return Err(ConfigError::RangeTooWide {
                    field,
                    min: min as f64,
                    max: max as f64,
                });
            }
        }
        Ok(())
    }
}

/// Fixed per-layer sprite appearance, read by the render adapter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpriteStyle {
    /// Sprite diameter in world units (attenuated with distance).
    pub size: f32,
    pub opacity: f32,
    /// Uniform layer color; `None` means per-point colors are supplied.
    pub color: Option<Rgb>,
}

/// Named configurations observed across the variants of the hero effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Preset {
    /// Dense, wide horizon with the intense orange palette.
    #[default]
    Pro,
    /// Earlier, coarser variant with a tighter pointer radius.
    Classic,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::Pro, Preset::Classic];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Pro => "pro",
            Preset::Classic => "classic",
        }
    }
}

/// Everything needed to build a [`crate::PointFieldAnimator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    // --- Ground lattice ---
    /// Extent of the lattice along x, centered on 0.
    pub width: f32,
    /// Extent of the lattice along z, centered on `z_offset`.
    pub depth: f32,
    /// Spacing between neighbouring lattice points.
    pub density: f32,
    /// Hard cap on the lattice; construction truncates beyond it.
    pub max_ground_points: usize,
    pub rest_height: f32,
    /// Shift of the lattice along z (negative = away from the camera).
    pub z_offset: f32,

    // --- Ground shading ---
    pub color_a: Rgb,
    pub color_b: Rgb,
    /// Upper bound of the random `color_a -> color_b` blend weight.
    pub color_blend_max: f32,
    pub intensity_falloff_radius: f32,
    pub intensity_floor: f32,

    // --- Ground motion ---
    pub wave: WaveParams,
    pub pointer_influence_radius: f32,
    pub pointer_influence_strength: f32,

    // --- Ambient particles ---
    pub particle_count: usize,
    pub particle_bounds: ParticleBounds,
    pub particle_speed_min: f32,
    pub particle_speed_max: f32,

    // --- Sprites ---
    pub ground_style: SpriteStyle,
    pub particle_style: SpriteStyle,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self::preset(Preset::Pro)
    }
}

impl FieldConfig {
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Pro => Self {
                width: 110.0,
                depth: 60.0,
                density: 0.7,
                max_ground_points: 14_000,
                rest_height: -2.0,
                z_offset: -15.0,
                color_a: Rgb([1.0, 0x4D as f32 / 255.0, 0.0]),
                color_b: Rgb([1.0, 0x8C as f32 / 255.0, 0.0]),
                color_blend_max: 0.5,
                intensity_falloff_radius: 35.0,
                intensity_floor: 0.1,
                wave: WaveParams::default(),
                pointer_influence_radius: 12.0,
                pointer_influence_strength: 2.5,
                particle_count: 300,
                particle_bounds: ParticleBounds {
                    x_min: -55.0,
                    x_max: 55.0,
                    y_min: -5.0,
                    y_max: 10.0,
                    z_min: -40.0,
                    z_max: 20.0,
                },
                particle_speed_min: 0.02,
                particle_speed_max: 0.07,
                ground_style: SpriteStyle {
                    size: 0.18,
                    opacity: 0.9,
                    color: None,
                },
                particle_style: SpriteStyle {
                    size: 0.15,
                    opacity: 0.6,
                    color: Some(Rgb([1.0, 0x8C as f32 / 255.0, 0.0])),
                },
            },
            Preset::Classic => Self {
                width: 90.0,
                depth: 50.0,
                density: 0.9,
                max_ground_points: 6_000,
                rest_height: -2.0,
                z_offset: -12.0,
                color_a: Rgb([0xE6 as f32 / 255.0, 0x39 as f32 / 255.0, 0.0]),
                color_b: Rgb([1.0, 0xB3 as f32 / 255.0, 0x47 as f32 / 255.0]),
                color_blend_max: 0.5,
                intensity_falloff_radius: 30.0,
                intensity_floor: 0.1,
                wave: WaveParams {
                    amplitude_x: 0.6,
                    amplitude_z: 0.6,
                    ..WaveParams::default()
                },
                pointer_influence_radius: 10.0,
                pointer_influence_strength: 2.0,
                particle_count: 200,
                particle_bounds: ParticleBounds {
                    x_min: -45.0,
                    x_max: 45.0,
                    y_min: -5.0,
                    y_max: 10.0,
                    z_min: -35.0,
                    z_max: 15.0,
                },
                particle_speed_min: 0.02,
                particle_speed_max: 0.05,
                ground_style: SpriteStyle {
                    size: 0.2,
                    opacity: 0.85,
                    color: None,
                },
                particle_style: SpriteStyle {
                    size: 0.15,
                    opacity: 0.5,
                    color: Some(Rgb([1.0, 0xB3 as f32 / 255.0, 0x47 as f32 / 255.0])),
                },
            },
        }
    }

    /// Lattice steps along x and z before the `max_ground_points` cap applies.
    pub fn lattice_dims(&self) -> (usize, usize) {
        let steps = |extent: f32| (extent / self.density).ceil().max(0.0) as usize;
        (steps(self.width), steps(self.depth))
    }

    /// Number of ground points actually allocated.
    pub fn ground_point_count(&self) -> usize {
        let (nx, nz) = self.lattice_dims();
        nx.saturating_mul(nz).min(self.max_ground_points)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("width", self.width)?;
        positive("depth", self.depth)?;
        positive("density", self.density)?;
        positive("pointer_influence_radius", self.pointer_influence_radius)?;
        positive("intensity_falloff_radius", self.intensity_falloff_radius)?;
        positive("ground_style.size", self.ground_style.size)?;
        positive("particle_style.size", self.particle_style.size)?;
        finite("rest_height", self.rest_height)?;
        finite("z_offset", self.z_offset)?;
        finite("pointer_influence_strength", self.pointer_influence_strength)?;

        unit("color_blend_max", self.color_blend_max)?;
        unit("intensity_floor", self.intensity_floor)?;
        unit("ground_style.opacity", self.ground_style.opacity)?;
        unit("particle_style.opacity", self.particle_style.opacity)?;

        let w = &self.wave;
        for (field, v) in [
            ("wave.amplitude_x", w.amplitude_x),
            ("wave.frequency_x", w.frequency_x),
            ("wave.speed_x", w.speed_x),
            ("wave.amplitude_z", w.amplitude_z),
            ("wave.frequency_z", w.frequency_z),
            ("wave.speed_z", w.speed_z),
        ] {
            if !v.is_finite() {
                return Err(ConfigError::NotFinite { field, value: v });
            }
        }

        if self.max_ground_points == 0 {
            return Err(ConfigError::ZeroCount {
                field: "max_ground_points",
            });
        }
        let ground_points = self.ground_point_count();
        if ground_points > MAX_GROUND_POINTS {
            return Err(ConfigError::TooMany {
                field: "ground points",
                value: ground_points,
                max: MAX_GROUND_POINTS,
            });
        }
        check_particle_count(self.particle_count)?;

        self.particle_bounds.validate()?;
        finite("particle_speed_min", self.particle_speed_min)?;
        finite("particle_speed_max", self.particle_speed_max)?;
        if self.particle_speed_min <= 0.0 {
            return Err(ConfigError::NonPositiveSpeed(self.particle_speed_min as f64));
        }
        if self.particle_speed_min > self.particle_speed_max {
            return Err(ConfigError::EmptyRange {
                field: "particle_speed",
                min: self.particle_speed_min as f64,
                max: self.particle_speed_max as f64,
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive {
            field,
            value: v as f64,
        })
    }
}

fn finite(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite {
            field,
            value: v as f64,
        })
    }
}

fn unit(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange {
            field,
            value: v as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for p in Preset::ALL {
            FieldConfig::preset(p).validate().unwrap();
        }
    }

    #[test]
    fn pro_lattice_fits_under_cap() {
        let cfg = FieldConfig::preset(Preset::Pro);
        // ceil(110 / 0.7) * ceil(60 / 0.7)
        assert_eq!(cfg.lattice_dims(), (158, 86));
        assert_eq!(cfg.ground_point_count(), 158 * 86);
    }

    #[test]
    fn hex_colors() {
        let c = Rgb::from_hex("#FF4D00").unwrap();
        assert_eq!(c.0, [1.0, 77.0 / 255.0, 0.0]);
        assert_eq!(c.to_string(), "#FF4D00");
        assert_eq!("#ff8c00".parse::<Rgb>().unwrap().to_string(), "#FF8C00");

        for bad in ["FF4D00", "#FF4D0", "#GG0000", "#FF4D00AA", "#ÿÿÿ"] {
            assert!(
                matches!(Rgb::from_hex(bad), Err(ConfigError::InvalidColor(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn linear_conversion_endpoints() {
        let lin = Rgb([0.0, 1.0, 0.0]).to_linear();
        assert!(lin.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-6));
        let mid = Rgb([0.5, 0.5, 0.5]).to_linear();
        assert!((mid.x - 0.214_041).abs() < 1e-5);
    }

    #[test]
    fn rejects_bad_values() {
        let base = FieldConfig::default();

        let cfg = FieldConfig { density: 0.0, ..base.clone() };
        assert!(matches!(cfg.validate(), Err(ConfigError::NotPositive { field: "density", .. })));

        let cfg = FieldConfig { pointer_influence_radius: -1.0, ..base.clone() };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NotPositive { field: "pointer_influence_radius", .. })
        ));

        let cfg = FieldConfig { width: f32::NAN, ..base.clone() };
        assert!(cfg.validate().is_err());

        let cfg = FieldConfig { max_ground_points: 0, ..base.clone() };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ZeroCount { field: "max_ground_points" })
        );

        let cfg = FieldConfig { particle_speed_min: 0.0, ..base.clone() };
        assert_eq!(cfg.validate(), Err(ConfigError::NonPositiveSpeed(0.0)));

        let cfg = FieldConfig {
            particle_speed_min: 0.5,
            particle_speed_max: 0.1,
            ..base.clone()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::EmptyRange { .. })));

        let mut cfg = base.clone();
        cfg.particle_bounds.y_max = cfg.particle_bounds.y_min;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::EmptyRange { field: "particle_bounds.y", .. })
        ));

        let cfg = FieldConfig { color_blend_max: 1.5, ..base };
        assert!(matches!(cfg.validate(), Err(ConfigError::OutOfUnitRange { .. })));
    }

    #[cfg(feature = "cli")]
    #[test]
    fn cli_names_match_preset_names() {
        use clap::ValueEnum;
        for p in Preset::ALL {
            assert_eq!(<Preset as ValueEnum>::from_str(p.name(), false), Ok(p));
            assert_eq!(p.to_possible_value().unwrap().get_name(), p.name());
        }
    }

    #[test]
    fn unsampleable_bounds_are_rejected() {
        let mut cfg = FieldConfig::default();
        cfg.particle_bounds.x_min = -3e38;
        cfg.particle_bounds.x_max = 3e38;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::RangeTooWide { field: "particle_bounds.x", .. })
        ));
    }

    #[test]
    fn oversized_counts_are_rejected() {
        let cfg = FieldConfig {
            particle_count: usize::MAX,
            ..FieldConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::TooMany {
                field: "particle_count",
                value: usize::MAX,
                max: MAX_PARTICLES,
            })
        );

        let cfg = FieldConfig {
            density: 1e-3,
            max_ground_points: usize::MAX,
            ..FieldConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::TooMany { field: "ground points", .. })
        ));

        // The cap alone keeps a dense lattice within limits.
        let cfg = FieldConfig {
            density: 1e-3,
            ..FieldConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn huge_particle_count_from_json_is_rejected() {
        let json = format!(r#"{{ "particle_count": {} }}"#, usize::MAX);
        let cfg: FieldConfig = serde_json::from_str(&json).unwrap();
        assert!(matches!(cfg.validate(), Err(ConfigError::TooMany { .. })));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let json = r##"{
            "density": 1.0,
            "pointer_influence_radius": 8.0,
            "color_a": "#00FFAA",
            "wave": { "amplitude_x": 0.3 }
        }"##;
        let cfg: FieldConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.density, 1.0);
        assert_eq!(cfg.pointer_influence_radius, 8.0);
        assert_eq!(cfg.color_a.to_string(), "#00FFAA");
        assert_eq!(cfg.wave.amplitude_x, 0.3);
        assert_eq!(cfg.wave.speed_x, WaveParams::default().speed_x);
        assert_eq!(cfg.width, FieldConfig::default().width);
        cfg.validate().unwrap();
    }

    #[test]
    fn bad_color_in_json_is_rejected() {
        let err = serde_json::from_str::<FieldConfig>(r#"{ "color_b": "orange" }"#).unwrap_err();
        assert!(err.to_string().contains("orange"));
    }
}
