//! TOML configuration. Every field falls back to the built-in default, so a
//! partial file only overrides what it names.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::geometry::LatticeSpec;
use crate::scene::{Demo, OverlayStyle};

pub const DEFAULT_CONFIG_FILE: &str = "surfview.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub demo: Demo,
    pub window: WindowConfig,
    pub lattice: LatticeConfig,
    pub layer_view: LayerViewConfig,
    pub sphere: SphereConfig,
    pub model: ModelConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            demo: Demo::Lattice,
            window: WindowConfig::default(),
            lattice: LatticeConfig::default(),
            layer_view: LayerViewConfig::default(),
            sphere: SphereConfig::default(),
            model: ModelConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Surface Viewer".to_string(),
            width: 1600,
            height: 900,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LatticeConfig {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub size: f32,
    pub initial_layer: usize,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        let spec = LatticeSpec::default();
        Self {
            nx: spec.nx,
            ny: spec.ny,
            nz: spec.nz,
            size: spec.size,
            initial_layer: 0,
        }
    }
}

impl LatticeConfig {
    pub fn spec(&self) -> LatticeSpec {
        LatticeSpec {
            nx: self.nx,
            ny: self.ny,
            nz: self.nz,
            size: self.size,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayerViewConfig {
    pub width: f32,
    pub height: f32,
    pub min_size: f32,
    pub zoom_min: f32,
    pub zoom_max: f32,
}

impl LayerViewConfig {
    /// Zoom limits must satisfy `0 < zoom_min <= zoom_max`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (min, max) = (self.zoom_min, self.zoom_max);
        if !min.is_finite() || !max.is_finite() || min <= 0.0 || min > max {
            return Err(ConfigError::Invalid(format!(
                "layer_view zoom range must satisfy 0 < zoom_min <= zoom_max, got {min}..{max}"
            )));
        }
        if !self.min_size.is_finite() || self.min_size <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "layer_view.min_size must be finite and positive, got {}",
                self.min_size
            )));
        }
        Ok(())
    }
}

impl Default for LayerViewConfig {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 500.0,
            min_size: 150.0,
            zoom_min: 0.3,
            zoom_max: 3.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SphereConfig {
    pub radius: f32,
    pub point: [f32; 3],
    pub tangent_length: f32,
    pub arrow_scale: f32,
    pub plane_size: f32,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            point: [0.0, 2.0, 0.0],
            tangent_length: 0.3,
            arrow_scale: 1.0,
            plane_size: 1.0,
        }
    }
}

impl SphereConfig {
    pub fn style(&self) -> OverlayStyle {
        OverlayStyle {
            tangent_length: self.tangent_length,
            arrow_scale: self.arrow_scale,
            plane_size: self.plane_size,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    pub point: [f32; 3],
    pub tangent_length: f32,
    pub arrow_scale: f32,
    pub plane_size: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("assets/sphere.obj"),
            point: [0.0, 1.0, 0.0],
            tangent_length: 0.3,
            arrow_scale: 1.0,
            plane_size: 1.0,
        }
    }
}

impl ModelConfig {
    pub fn style(&self) -> OverlayStyle {
        OverlayStyle {
            tangent_length: self.tangent_length,
            arrow_scale: self.arrow_scale,
            plane_size: self.plane_size,
            ..Default::default()
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.layer_view.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Reads `path` if given, otherwise `surfview.toml` when present.
    /// A missing default file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load_from_file(default)
                } else {
                    log::info!("no {DEFAULT_CONFIG_FILE} found, using built-in defaults");
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_built_in_constants() {
        let config = Config::default();
        assert_eq!(config.lattice.spec(), LatticeSpec::default());
        assert_eq!(config.lattice.initial_layer, 0);
        assert_eq!(config.layer_view.min_size, 150.0);
        assert_eq!(config.layer_view.zoom_min, 0.3);
        assert_eq!(config.layer_view.zoom_max, 3.0);
        assert_eq!(config.sphere.point, [0.0, 2.0, 0.0]);
        assert_eq!(config.sphere.tangent_length, 0.3);
    }

    #[test]
    fn test_partial_file_overrides_named_fields() {
        let config = Config::from_toml(
            r#"
demo = "sphere"

[lattice]
nz = 9
initial_layer = 4

[sphere]
point = [1.0, 1.0, 0.0]
"#,
        )
        .unwrap();

        assert_eq!(config.demo, Demo::Sphere);
        assert_eq!(config.lattice.nz, 9);
        assert_eq!(config.lattice.nx, 15);
        assert_eq!(config.lattice.initial_layer, 4);
        assert_eq!(config.sphere.point, [1.0, 1.0, 0.0]);
        assert_eq!(config.sphere.radius, 1.0);
        assert_eq!(config.window.width, 1600);
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        assert!(matches!(
            Config::from_toml("demo = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_inverted_zoom_range_rejected() {
        let err = Config::from_toml("[layer_view]\nzoom_min = 3.0\nzoom_max = 0.3");
        assert!(matches!(err, Err(ConfigError::Invalid(_))));

        let err = Config::from_toml("[layer_view]\nzoom_min = 0.0");
        assert!(matches!(err, Err(ConfigError::Invalid(_))));

        let err = Config::from_toml("[layer_view]\nzoom_max = nan");
        assert!(matches!(err, Err(ConfigError::Invalid(_))));

        let config = Config::from_toml("[layer_view]\nzoom_min = 1.0\nzoom_max = 1.0").unwrap();
        assert_eq!(config.layer_view.zoom_min, config.layer_view.zoom_max);
    }

    #[test]
    fn test_non_positive_min_size_rejected() {
        let err = Config::from_toml("[layer_view]\nmin_size = -10.0");
        assert!(matches!(err, Err(ConfigError::Invalid(_))));

        let err = Config::from_toml("[layer_view]\nmin_size = inf");
        assert!(matches!(err, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_explicit_missing_file_is_io_error() {
        let err = Config::load(Some(Path::new("/no/such/surfview.toml")));
        assert!(matches!(err, Err(ConfigError::Io(_))));
    }
}
