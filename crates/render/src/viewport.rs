use crate::camera::PerspectiveCamera;
use crate::error::RenderError;
use crate::renderer::Renderer;
use globe_common::{CameraConfig, SurfaceSize, ViewportSize, cap_pixel_ratio};
use globe_scene::Scene;

/// Owns the camera and the drawing surface, and keeps both in step with the
/// host window's size and pixel ratio.
#[derive(Debug)]
pub struct ViewportManager<S> {
    camera: PerspectiveCamera,
    surface: S,
    size: ViewportSize,
    pixel_ratio: f64,
}

impl<S: Renderer> ViewportManager<S> {
    /// Physical surface size for a logical viewport at a raw device pixel ratio.
    pub fn surface_size_for(size: ViewportSize, device_pixel_ratio: f64) -> SurfaceSize {
        SurfaceSize::from_logical(size, cap_pixel_ratio(device_pixel_ratio))
    }

    /// `surface` must already be sized to [`surface_size_for`](Self::surface_size_for).
    pub fn new(
        camera: &CameraConfig,
        size: ViewportSize,
        device_pixel_ratio: f64,
        surface: S,
    ) -> Self {
        Self {
            camera: PerspectiveCamera::from_config(camera, size.aspect()),
            surface,
            size,
            pixel_ratio: cap_pixel_ratio(device_pixel_ratio),
        }
    }

    /// Apply a new logical window size: camera aspect, projection, surface size.
    pub fn resize(&mut self, size: ViewportSize) {
        self.size = size;
        self.camera.set_aspect(size.aspect());
        let surface_size = self.surface_size();
        self.surface.set_size(surface_size);
        tracing::debug!(
            "viewport resized to {}x{} (surface {}x{}, pixel ratio {})",
            size.width,
            size.height,
            surface_size.width,
            surface_size.height,
            self.pixel_ratio
        );
    }

    /// Apply a new device pixel ratio. The ratio is capped before use.
    pub fn set_device_pixel_ratio(&mut self, device_pixel_ratio: f64) {
        let capped = cap_pixel_ratio(device_pixel_ratio);
        if capped == self.pixel_ratio {
            return;
        }
        self.pixel_ratio = capped;
        self.surface.set_size(self.surface_size());
    }

    /// Draw `scene` through the camera.
    pub fn render(&mut self, scene: &Scene) -> Result<(), RenderError> {
        self.surface.render(scene, &self.camera)
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    /// Capped pixel ratio in effect.
    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn surface_size(&self) -> SurfaceSize {
        SurfaceSize::from_logical(self.size, self.pixel_ratio)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Release the surface, e.g. to hand it back to the host on unmount.
    pub fn into_surface(self) -> S {
        self.surface
    }
}
