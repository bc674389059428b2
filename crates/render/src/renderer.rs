use crate::camera::PerspectiveCamera;
use crate::error::RenderError;
use globe_common::SurfaceSize;
use globe_scene::{Node, Scene};
use std::fmt::Write as _;

/// Renderer-agnostic drawing surface. All surfaces implement this trait.
///
/// The renderer reads the scene and camera and draws one frame. It never
/// mutates the scene; the animation driver owns the only moving part.
pub trait Renderer {
    /// Resize the drawing surface, in physical pixels.
    fn set_size(&mut self, size: SurfaceSize);

    /// Draw one frame of `scene` as seen by `camera`.
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError>;
}

/// Text renderer for headless runs and tests.
///
/// Produces a human-readable description of each frame instead of pixels.
#[derive(Debug)]
pub struct DebugTextRenderer {
    size: SurfaceSize,
    frames: u64,
    last_frame: String,
}

impl DebugTextRenderer {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            frames: 0,
            last_frame: String::new(),
        }
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Number of frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Text of the most recent frame; empty until the first render.
    pub fn last_frame(&self) -> &str {
        &self.last_frame
    }
}

impl Renderer for DebugTextRenderer {
    fn set_size(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        self.frames += 1;
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "=== Frame {} ({}x{}) ===",
            self.frames, self.size.width, self.size.height
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) fov={:.0} aspect={:.3}",
            camera.position.x,
            camera.position.y,
            camera.position.z,
            camera.fov_degrees,
            camera.aspect()
        );
        let _ = writeln!(out, "Nodes: {}", scene.node_count());

        for (id, _, node) in scene.traverse() {
            let line = match node {
                Node::Group(g) => format!("group rotation_y={:.3}", g.rotation_y()),
                Node::Globe(m) => format!(
                    "globe radius={:.1} segments={}x{} day={} night={} sun=({:.1}, {:.1}, {:.1})",
                    m.geometry.radius,
                    m.geometry.width_segments,
                    m.geometry.height_segments,
                    m.material.day.label,
                    m.material.night.label,
                    m.material.sun_position.x,
                    m.material.sun_position.y,
                    m.material.sun_position.z
                ),
                Node::Atmosphere(m) => format!(
                    "atmosphere scale={:.2} side={:?} blending={:?}",
                    m.transform.scale.x, m.material.side, m.material.blending
                ),
                Node::Light(l) => format!(
                    "light position=({:.1}, {:.1}, {:.1}) intensity={:.1}",
                    l.position.x, l.position.y, l.position.z, l.intensity
                ),
                Node::Stars(s) => format!("stars points={}", s.point_count()),
            };
            let _ = writeln!(out, "  [{id:?}] {line}");
        }

        self.last_frame = out;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use globe_scene::{DirectionalLight, RotatingGroup};

    #[test]
    fn debug_renderer_empty_scene() {
        let mut renderer = DebugTextRenderer::new(SurfaceSize::new(800, 600));
        renderer
            .render(&Scene::new(), &PerspectiveCamera::default())
            .unwrap();

        assert_eq!(renderer.frames(), 1);
        assert!(renderer.last_frame().contains("Frame 1 (800x600)"));
        assert!(renderer.last_frame().contains("Nodes: 0"));
    }

    #[test]
    fn debug_renderer_lists_nodes() {
        let mut scene = Scene::new();
        let group = scene.add(Node::Group(RotatingGroup::new()));
        scene
            .add_child(group, Node::Light(DirectionalLight::default()))
            .unwrap();
        let handle = scene.group_handle(group).unwrap();
        scene.set_group_rotation(handle, 1.5);

        let mut renderer = DebugTextRenderer::new(SurfaceSize::new(800, 600));
        renderer.set_size(SurfaceSize::new(1024, 768));
        renderer.render(&scene, &PerspectiveCamera::default()).unwrap();

        let frame = renderer.last_frame();
        assert!(frame.contains("(1024x768)"));
        assert!(frame.contains("group rotation_y=1.500"));
        assert!(frame.contains("light position=(5.0, 3.0, -4.5)"));
    }
}
