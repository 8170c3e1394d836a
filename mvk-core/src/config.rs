//! Scene configuration. Every section defaults to the demo's stock values, so
//! a JSON file only has to name what it changes.

use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub distance: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            distance: 60.0,
            near: 0.1,
            far: 2000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TorusConfig {
    pub radius: f32,
    pub tube: f32,
    pub radial_segments: u32,
    pub tubular_segments: u32,
    /// Rotation about Y applied once at creation
    pub initial_yaw: f32,
}

impl Default for TorusConfig {
    fn default() -> Self {
        Self {
            radius: 10.0,
            tube: 5.0,
            radial_segments: 24,
            tubular_segments: 130,
            initial_yaw: 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub text: String,
    pub font_path: String,
    pub size: f32,
    pub depth: f32,
    pub curve_segments: u32,
    pub z: f32,
    pub color: u32,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            text: "MAVERICKS".to_string(),
            font_path: "assets/fonts/mavericks_block.typeface.json".to_string(),
            size: 10.0,
            depth: 1.0,
            curve_segments: 12,
            z: -10.0,
            color: 0xffffff,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LightsConfig {
    pub directional_color: u32,
    pub directional_intensity: f32,
    pub directional_position: [f32; 3],
    pub ambient_color: u32,
    pub ambient_intensity: f32,
}

impl Default for LightsConfig {
    fn default() -> Self {
        Self {
            directional_color: 0xffffff,
            directional_intensity: 4.0,
            directional_position: [0.0, 2.0, 3.0],
            ambient_color: 0xffffff,
            ambient_intensity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Torus X rotation added on every frame tick, in radians
    pub spin_per_frame: f32,
    /// Pointer pixels per radian of group rotation
    pub pointer_divisor: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            spin_per_frame: 0.02,
            pointer_divisor: 100.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub torus: TorusConfig,
    pub label: LabelConfig,
    pub lights: LightsConfig,
    pub motion: MotionConfig,
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}
