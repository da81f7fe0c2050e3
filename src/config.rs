//! Viewer settings loaded from a TOML file.
//!
//! Every field has a default, so a missing file or a partial one is fine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::geometry::TorusParams;

pub const CONFIG_ENV_VAR: &str = "TORUS3D_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "torus3d.toml";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
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
            title: "Torus 3D".to_string(),
            width: 1280,
            height: 800,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: [f32; 3],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [0.0, 0.0, -4.0],
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Alpha of the torus surface.
    pub opacity: f32,
    /// Radians of rotation per pixel of drag.
    pub drag_sensitivity: f32,
    /// World-space direction towards the light.
    pub light_direction: [f32; 3],
    pub color: [f32; 3],
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            opacity: 0.75,
            drag_sensitivity: std::f32::consts::PI / 100.0,
            light_direction: [-0.4, 0.6, -1.0],
            color: [0.45, 0.7, 1.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// `env_logger` filter; `RUST_LOG` is used when absent.
    pub log_filter: Option<String>,
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub torus: TorusParams,
    pub view: ViewConfig,
}

impl ViewerConfig {
    pub fn from_toml(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(path, &contents)
    }

    /// Loads `path`, or returns the defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Config path from the environment, falling back to the working directory.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn parse(text: &str) -> Result<ViewerConfig, ConfigError> {
        ViewerConfig::from_toml(Path::new("test.toml"), text)
    }

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(parse("").unwrap(), ViewerConfig::default());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = parse(
            r#"
            log_filter = "torus3d=debug"

            [torus]
            minor_radius = 0.35
            major_segments = 12

            [window]
            width = 640
            "#,
        )
        .unwrap();

        assert_eq!(config.log_filter.as_deref(), Some("torus3d=debug"));
        assert_abs_diff_eq!(config.torus.minor_radius, 0.35);
        assert_eq!(config.torus.major_segments, 12);
        assert_abs_diff_eq!(config.torus.major_radius, 1.0);
        assert_eq!(config.torus.minor_segments, 50);
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 800);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn defaults_match_the_reference_scene() {
        let config = ViewerConfig::default();

        assert_eq!(config.camera.eye, [0.0, 0.0, -4.0]);
        assert_abs_diff_eq!(config.camera.fov_degrees, 45.0);
        assert_abs_diff_eq!(config.view.drag_sensitivity, std::f32::consts::PI / 100.0);
        assert_eq!(config.torus, TorusParams::default());
    }

    #[test]
    fn malformed_toml_reports_path() {
        let err = parse("[torus\nmajor_radius = ").unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("test.toml"));
    }

    #[test]
    fn wrong_type_is_a_parse_error() {
        assert!(parse("[torus]\nmajor_segments = \"many\"").is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("torus3d-config-that-does-not-exist.toml");
        let config = ViewerConfig::load_or_default(&path).unwrap();

        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn load_reads_a_written_file() {
        let path = std::env::temp_dir().join(format!("torus3d-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[view]\nopacity = 0.5\n").unwrap();

        let config = ViewerConfig::load_or_default(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_abs_diff_eq!(config.view.opacity, 0.5);
    }

    #[test]
    fn serializes_back_to_toml() {
        let text = toml::to_string(&ViewerConfig::default()).unwrap();
        assert_eq!(parse(&text).unwrap(), ViewerConfig::default());
    }
}
