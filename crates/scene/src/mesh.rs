use crate::geometry::SphereGeometry;
use globe_assets::TextureHandle;
use globe_common::Transform;
use glam::Vec3;

/// Which faces of a mesh are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Front,
    /// Only faces pointing away from the viewer (front faces are culled).
    Back,
    Double,
}

/// How fragments combine with the framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blending {
    /// Replace the destination color.
    Opaque,
    /// `src * src_alpha + dst`.
    Additive,
}

/// Day/night material: two maps plus a light position fixed at build time.
#[derive(Debug, Clone)]
pub struct GlobeMaterial {
    pub day: TextureHandle,
    pub night: TextureHandle,
    /// Snapshot of the light position when the material was built.
    pub sun_position: Vec3,
    /// Terminator sharpening factor applied to the sun/normal cosine.
    pub terminator_sharpness: f32,
}

impl GlobeMaterial {
    pub fn side(&self) -> Side {
        Side::Front
    }

    pub fn blending(&self) -> Blending {
        Blending::Opaque
    }
}

/// Rim-glow material for the atmosphere shell.
#[derive(Debug, Clone, PartialEq)]
pub struct AtmosphereMaterial {
    pub color: [f32; 3],
    pub side: Side,
    pub blending: Blending,
}

impl Default for AtmosphereMaterial {
    fn default() -> Self {
        Self {
            color: [0.3, 0.6, 1.0],
            side: Side::Back,
            blending: Blending::Additive,
        }
    }
}

/// Textured globe sphere.
#[derive(Debug, Clone)]
pub struct GlobeMesh {
    pub geometry: SphereGeometry,
    pub material: GlobeMaterial,
    pub transform: Transform,
}

/// Glow shell around the globe: same sphere, scaled up, drawn inside-out.
#[derive(Debug, Clone)]
pub struct AtmosphereMesh {
    pub geometry: SphereGeometry,
    pub material: AtmosphereMaterial,
    pub transform: Transform,
}

impl AtmosphereMesh {
    pub fn new(geometry: SphereGeometry, scale: f32) -> Self {
        Self {
            geometry,
            material: AtmosphereMaterial::default(),
            transform: Transform::from_uniform_scale(scale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atmosphere_defaults_to_back_side_additive() {
        let shell = AtmosphereMesh::new(SphereGeometry::new(5.0, 50, 50), 1.1);
        assert_eq!(shell.material.side, Side::Back);
        assert_eq!(shell.material.blending, Blending::Additive);
        assert_eq!(shell.material.color, [0.3, 0.6, 1.0]);
        assert_eq!(shell.transform.scale, Vec3::splat(1.1));
    }
}
