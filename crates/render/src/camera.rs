use glam::{Mat4, Vec3};
use globe_common::CameraConfig;

/// Perspective camera looking at a fixed target.
///
/// The projection is cached; call [`update_projection_matrix`] after changing
/// `fov_degrees`, `near` or `far` directly. [`set_aspect`] does it for you.
///
/// [`update_projection_matrix`]: PerspectiveCamera::update_projection_matrix
/// [`set_aspect`]: PerspectiveCamera::set_aspect
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    aspect: f32,
    projection: Mat4,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), 16.0 / 9.0)
    }
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            fov_degrees,
            near,
            far,
            aspect,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Camera on +Z at `config.distance`, looking at the origin.
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self::new(config.fov_degrees, aspect, config.near, config.far);
        camera.position = Vec3::new(0.0, 0.0, config.distance);
        camera
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        );
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera() {
        let cam = PerspectiveCamera::default();
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 12.5));
        assert_eq!(cam.fov_degrees, 75.0);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn origin_projects_to_screen_centre() {
        let cam = PerspectiveCamera::default();
        let clip = cam.view_projection() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn set_aspect_recomputes_projection() {
        let mut cam = PerspectiveCamera::default();
        let before = cam.projection_matrix();
        cam.set_aspect(1920.0 / 1080.0);
        assert_ne!(cam.projection_matrix(), before);
        assert_eq!(cam.aspect(), 1920.0 / 1080.0);
        let expected = Mat4::perspective_rh(75f32.to_radians(), 1920.0 / 1080.0, 0.1, 1000.0);
        assert_eq!(cam.projection_matrix(), expected);
    }
}
