//! wgpu render backend for the globe.
//!
//! Draws the star points, the day/night globe and the additive atmosphere
//! shell in one pass over a depth buffer.
//!
//! # Invariants
//! - Renderer never mutates the scene.
//! - GPU resources for a scene are uploaded once and reused every frame.
//! - The atmosphere culls front faces; the globe culls back faces.

mod gpu;
mod shaders;
mod surface;
mod texture;

pub use gpu::GlobeRenderer;
pub use shaders::{STAR_SHADER, atmosphere_shader, globe_shader};
pub use surface::{SurfaceOptions, WgpuSurface};
