use bytemuck::{Pod, Zeroable};
use std::f32::consts::PI;

/// Interleaved vertex shared by every sphere mesh.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Equirectangular texture coordinate; `v = 0` at the north pole (top image row).
    pub uv: [f32; 2],
}

/// Indexed triangle list.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

/// Latitude/longitude sphere description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereGeometry {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl SphereGeometry {
    pub fn new(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        Self {
            radius,
            width_segments: width_segments.max(3),
            height_segments: height_segments.max(2),
        }
    }

    pub fn vertex_count(&self) -> usize {
        (self.width_segments as usize + 1) * (self.height_segments as usize + 1)
    }

    /// Tessellate into a counter-clockwise (outward-facing) triangle list.
    ///
    /// Each row repeats its first vertex at `u = 1` so the texture seam has no
    /// wrap-around. Pole rows emit one triangle per segment instead of two.
    pub fn build(&self) -> MeshData {
        let w = self.width_segments;
        let h = self.height_segments;
        let mut vertices = Vec::with_capacity(self.vertex_count());

        for iy in 0..=h {
            let v = iy as f32 / h as f32;
            // Centre the pole texel so the single pole triangle samples mid-segment.
            let u_offset = if iy == 0 {
                0.5 / w as f32
            } else if iy == h {
                -0.5 / w as f32
            } else {
                0.0
            };
            let theta = v * PI;

            for ix in 0..=w {
                let u = ix as f32 / w as f32;
                let phi = u * 2.0 * PI;
                let position = [
                    -self.radius * phi.cos() * theta.sin(),
                    self.radius * theta.cos(),
                    self.radius * phi.sin() * theta.sin(),
                ];
                let normal = glam::Vec3::from(position).normalize_or_zero().to_array();
                vertices.push(MeshVertex {
                    position,
                    normal,
                    uv: [u + u_offset, v],
                });
            }
        }

        let row = w + 1;
        let mut indices = Vec::with_capacity((w * (h - 1) * 6) as usize);
        for iy in 0..h {
            for ix in 0..w {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != h - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        MeshData { vertices, indices }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn globe_sphere_counts() {
        let mesh = SphereGeometry::new(5.0, 50, 50).build();
        assert_eq!(mesh.vertices.len(), 51 * 51);
        // Two triangles per quad except the single-triangle pole rows.
        assert_eq!(mesh.indices.len(), 50 * 98 * 3);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn vertices_lie_on_radius() {
        let mesh = SphereGeometry::new(5.0, 16, 12).build();
        for v in &mesh.vertices {
            let len = Vec3::from(v.position).length();
            assert!((len - 5.0).abs() < 1e-4, "vertex off sphere: {len}");
        }
    }

    #[test]
    fn poles_and_uv_orientation() {
        let mesh = SphereGeometry::new(5.0, 8, 4).build();
        let north = mesh.vertices[0];
        let south = mesh.vertices[mesh.vertices.len() - 1];
        assert!((north.position[1] - 5.0).abs() < 1e-5);
        assert!((south.position[1] + 5.0).abs() < 1e-5);
        assert_eq!(north.uv[1], 0.0);
        assert_eq!(south.uv[1], 1.0);
    }

    #[test]
    fn triangles_face_outward() {
        let mesh = SphereGeometry::new(5.0, 12, 8).build();
        for tri in mesh.indices.chunks(3) {
            let p = |i: u32| Vec3::from(mesh.vertices[i as usize].position);
            let (a, b, c) = (p(tri[0]), p(tri[1]), p(tri[2]));
            let face_normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(face_normal.dot(centroid) > 0.0, "inward-facing triangle {tri:?}");
        }
    }

    #[test]
    fn degenerate_segments_are_clamped() {
        let geometry = SphereGeometry::new(1.0, 0, 0);
        assert_eq!((geometry.width_segments, geometry.height_segments), (3, 2));
        assert!(!geometry.build().indices.is_empty());
    }
}
