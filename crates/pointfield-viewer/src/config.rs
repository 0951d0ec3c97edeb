use anyhow::{Context, Result};
use clap::Parser;
use pointfield::{FieldConfig, Preset};
use std::path::PathBuf;

/// `pointfield_viewer` - Desktop host for the procedural point-field hero.
///
/// Renders the animated ground lattice and the drifting particles in a window.
/// Move the mouse over the window to raise the field under the cursor; press
/// F1 for the debug overlay.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Built-in field configuration to start from.
    #[arg(long, value_enum, default_value_t = Preset::Pro, env = "POINTFIELD_PRESET")]
    pub preset: Preset,

    /// JSON file with a field configuration.
    ///
    /// Keys that are not present fall back to the `pro` preset. When given,
    /// this replaces `--preset`.
    #[arg(long, env = "POINTFIELD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seed for colors and particle placement. Random when omitted.
    #[arg(long, env = "POINTFIELD_SEED")]
    pub seed: Option<u64>,

    /// Overrides the lattice point cap of the chosen configuration.
    #[arg(long)]
    pub max_ground_points: Option<usize>,

    /// Initial window width in logical pixels.
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Initial window height in logical pixels.
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Present without waiting for vertical sync.
    #[arg(long)]
    pub no_vsync: bool,

    /// Print the resolved field configuration as JSON and exit.
    #[arg(long)]
    pub dump_config: bool,
}

impl Config {
    /// Resolves the field configuration from the file or preset, then applies
    /// command-line overrides.
    pub fn field_config(&self) -> Result<FieldConfig> {
        let mut cfg = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str::<FieldConfig>(&text)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => FieldConfig::preset(self.preset),
        };
        self.apply_overrides(&mut cfg);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Applies the command-line overrides to a configuration, e.g. after the
    /// preset was switched at runtime.
    pub fn apply_overrides(&self, cfg: &mut FieldConfig) {
        if let Some(max) = self.max_ground_points {
            cfg.max_ground_points = max;
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_pro_preset() {
        let cfg = Config::try_parse_from(["pointfield_viewer"]).unwrap();
        assert_eq!(cfg.preset, Preset::Pro);
        assert_eq!(cfg.field_config().unwrap(), FieldConfig::preset(Preset::Pro));
        assert!(!cfg.no_vsync);
    }

    #[test]
    fn preset_and_override() {
        let cfg = Config::try_parse_from([
            "pointfield_viewer",
            "--preset",
            "classic",
            "--max-ground-points",
            "500",
            "--seed",
            "9",
        ])
        .unwrap();
        let field = cfg.field_config().unwrap();
        assert_eq!(field.max_ground_points, 500);
        assert_eq!(field.pointer_influence_radius, 10.0);
        assert_eq!(cfg.seed(), 9);
    }

    #[test]
    fn zero_cap_is_rejected() {
        let cfg =
            Config::try_parse_from(["pointfield_viewer", "--max-ground-points", "0"]).unwrap();
        assert!(cfg.field_config().is_err());
    }

    #[test]
    fn loads_json_file() {
        let path = std::env::temp_dir().join(format!("pointfield-{}.json", std::process::id()));
        std::fs::write(&path, r##"{ "density": 2.0, "color_b": "#FFFFFF" }"##).unwrap();

        let cfg = Config::try_parse_from([
            "pointfield_viewer",
            "--config",
            path.to_str().unwrap(),
        ])
        .unwrap();
        let field = cfg.field_config().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(field.density, 2.0);
        assert_eq!(field.color_b.to_string(), "#FFFFFF");
        assert_eq!(field.width, FieldConfig::default().width);
    }

    #[test]
    fn missing_file_is_reported() {
        let cfg = Config::try_parse_from([
            "pointfield_viewer",
            "--config",
            "/nonexistent/pointfield.json",
        ])
        .unwrap();
        let err = cfg.field_config().unwrap_err();
        assert!(format!("{err:#}").contains("pointfield.json"));
    }
}
