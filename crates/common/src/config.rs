//! Renderer configuration with defaults matching the reference scene and JSON persistence.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest texture edge a device created with default limits accepts.
pub const MAX_TEXTURE_DIMENSION: u32 = 8192;

/// Errors from loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    pub window: WindowConfig,
    pub assets: AssetConfig,
    pub globe: GlobeParams,
    pub stars: StarConfig,
    pub camera: CameraConfig,
    pub render: RenderConfig,
}

/// Initial window settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Initial width in logical pixels.
    pub width: u32,
    /// Initial height in logical pixels.
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Globe".into(),
        }
    }
}

/// Texture sources and load policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub day_map: PathBuf,
    pub night_map: PathBuf,
    /// Give up on texture loading after this many seconds. Zero disables the timeout.
    pub load_timeout_secs: u64,
    /// Images larger than this on either axis are downscaled before upload.
    /// At most [`MAX_TEXTURE_DIMENSION`].
    pub max_texture_dimension: u32,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            day_map: PathBuf::from("assets/img/earth_daymap.jpg"),
            night_map: PathBuf::from("assets/img/earth_nightmap.jpg"),
            load_timeout_secs: 30,
            max_texture_dimension: MAX_TEXTURE_DIMENSION,
        }
    }
}

/// Globe, atmosphere and light parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeParams {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    /// Uniform scale of the atmosphere shell relative to the globe.
    pub atmosphere_scale: f32,
    /// Rotation rate of the globe group in radians per second.
    pub rotation_speed: f32,
    /// Multiplier applied to the sun/normal cosine before clamping; the
    /// day/night transition band is `1 / sharpness` cosine units wide.
    pub terminator_sharpness: f32,
    pub light_position: [f32; 3],
    pub light_color: [f32; 3],
    pub light_intensity: f32,
}

impl Default for GlobeParams {
    fn default() -> Self {
        Self {
            radius: 5.0,
            width_segments: 50,
            height_segments: 50,
            atmosphere_scale: 1.1,
            rotation_speed: 0.15,
            terminator_sharpness: 10.0,
            light_position: [5.0, 3.0, -4.5],
            light_color: [1.0, 1.0, 1.0],
            light_intensity: 1.0,
        }
    }
}

/// Background star field parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarConfig {
    /// Number of (front, back) point pairs.
    pub pairs: u32,
    /// Edge length of the cube the stars are scattered in.
    pub extent: f32,
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            pairs: 5000,
            extent: 2000.0,
        }
    }
}

/// Perspective camera parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Distance along +Z from the origin.
    pub distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            distance: 12.5,
        }
    }
}

/// Presentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub vsync: bool,
    pub clear_color: [f64; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            vsync: true,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl GlobeConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Reject values the renderer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("globe.radius", self.globe.radius)?;
        if self.globe.width_segments < 3 || self.globe.height_segments < 2 {
            return Err(ConfigError::Invalid(
                "globe needs at least 3 width and 2 height segments".into(),
            ));
        }
        positive("globe.atmosphere_scale", self.globe.atmosphere_scale)?;
        if !self.globe.rotation_speed.is_finite() {
            return Err(ConfigError::Invalid(
                "globe.rotation_speed must be finite".into(),
            ));
        }
        positive("globe.terminator_sharpness", self.globe.terminator_sharpness)?;
        if !(self.camera.fov_degrees > 0.0 && self.camera.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(
                "camera.fov_degrees must be between 0 and 180".into(),
            ));
        }
        if !(self.camera.near > 0.0 && self.camera.far > self.camera.near)
            || !self.camera.far.is_finite()
        {
            return Err(ConfigError::Invalid(
                "camera requires 0 < near < far".into(),
            ));
        }
        positive("stars.extent", self.stars.extent)?;
        if self.assets.max_texture_dimension == 0
            || self.assets.max_texture_dimension > MAX_TEXTURE_DIMENSION
        {
            return Err(ConfigError::Invalid(format!(
                "assets.max_texture_dimension must be between 1 and {MAX_TEXTURE_DIMENSION}"
            )));
        }
        Ok(())
    }
}

fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be positive and finite"
        )))
    }
}
