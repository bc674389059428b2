//! Shared types for the globe renderer: transforms, viewport sizing, configuration.

pub mod config;
pub mod types;

pub use config::{
    AssetConfig, CameraConfig, ConfigError, GlobeConfig, GlobeParams, MAX_TEXTURE_DIMENSION,
    RenderConfig, StarConfig, WindowConfig,
};
pub use types::{MAX_PIXEL_RATIO, SurfaceSize, Transform, ViewportSize, cap_pixel_ratio};
