use glam::Vec3;

/// Directional light. Only its position is consumed, as the globe's sun position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(5.0, 3.0, -4.5),
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }
}
