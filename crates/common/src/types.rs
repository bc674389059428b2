use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Upper bound applied to the device pixel ratio before sizing the drawing surface.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Clamp a reported device pixel ratio into `(0, MAX_PIXEL_RATIO]`.
///
/// Non-finite or non-positive ratios fall back to 1.0.
pub fn cap_pixel_ratio(ratio: f64) -> f64 {
    if !ratio.is_finite() || ratio <= 0.0 {
        return 1.0;
    }
    ratio.min(MAX_PIXEL_RATIO)
}

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Identity transform with a uniform scale factor.
    pub fn from_uniform_scale(scale: f32) -> Self {
        Self {
            scale: Vec3::splat(scale),
            ..Self::default()
        }
    }

    /// Local-to-parent matrix (scale, then rotate, then translate).
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// Viewport size in logical (CSS-like) pixels, as reported by the host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height. A zero height is treated as one to keep the
    /// projection finite while a window is minimized.
    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

/// Drawing surface size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Physical size for a logical viewport at the given (already capped) pixel ratio.
    /// Each dimension is at least one pixel.
    pub fn from_logical(size: ViewportSize, pixel_ratio: f64) -> Self {
        let scale = |v: u32| ((v as f64 * pixel_ratio).round() as u32).max(1);
        Self {
            width: scale(size.width),
            height: scale(size.height),
        }
    }
}
