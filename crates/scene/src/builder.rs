use crate::geometry::SphereGeometry;
use crate::graph::{GroupHandle, Node, NodeKind, RotatingGroup, Scene, SceneError};
use crate::light::DirectionalLight;
use crate::mesh::{AtmosphereMesh, GlobeMaterial, GlobeMesh};
use crate::stars::StarField;
use glam::Vec3;
use globe_assets::TexturePair;
use globe_common::{GlobeConfig, GlobeParams, StarConfig, Transform};
use rand::Rng;

/// Completed scene plus the handle the animation driver rotates each frame.
#[derive(Debug, Clone)]
pub struct BuiltScene {
    pub scene: Scene,
    pub group: GroupHandle,
}

/// Assembles the globe scene from loaded textures.
#[derive(Debug, Clone)]
pub struct SceneBuilder {
    globe: GlobeParams,
    stars: StarConfig,
}

impl SceneBuilder {
    pub fn new(globe: GlobeParams, stars: StarConfig) -> Self {
        Self { globe, stars }
    }

    pub fn from_config(config: &GlobeConfig) -> Self {
        Self::new(config.globe.clone(), config.stars.clone())
    }

    /// Build the scene with an unseeded star field.
    pub fn build(&self, textures: TexturePair) -> Result<BuiltScene, SceneError> {
        self.build_with_rng(textures, &mut rand::rng())
    }

    /// Build the scene, drawing star positions from `rng`.
    ///
    /// Layout: root → { group → { globe, atmosphere, light }, stars }.
    pub fn build_with_rng<R: Rng + ?Sized>(
        &self,
        textures: TexturePair,
        rng: &mut R,
    ) -> Result<BuiltScene, SceneError> {
        let params = &self.globe;
        let geometry =
            SphereGeometry::new(params.radius, params.width_segments, params.height_segments);

        let light = DirectionalLight {
            position: Vec3::from(params.light_position),
            color: Vec3::from(params.light_color),
            intensity: params.light_intensity,
        };

        let globe = GlobeMesh {
            geometry,
            material: GlobeMaterial {
                day: textures.day,
                night: textures.night,
                sun_position: light.position,
                terminator_sharpness: params.terminator_sharpness,
            },
            transform: Transform::default(),
        };
        let atmosphere = AtmosphereMesh::new(geometry, params.atmosphere_scale);

        let mut scene = Scene::new();
        let group_id = scene.add(Node::Group(RotatingGroup::new()));
        scene.add_child(group_id, Node::Globe(globe))?;
        scene.add_child(group_id, Node::Atmosphere(atmosphere))?;
        scene.add_child(group_id, Node::Light(light))?;

        let stars = StarField::generate(rng, self.stars.pairs, self.stars.extent);
        scene.add(Node::Stars(stars));

        let group = scene.group_handle(group_id)?;
        tracing::debug!(
            "scene built: {} nodes, {} globe vertices, {} stars",
            scene.node_count(),
            geometry.vertex_count(),
            self.stars.pairs * 2
        );
        debug_assert_eq!(scene.count(NodeKind::Group), 1);
        debug_assert_eq!(scene.count(NodeKind::Stars), 1);

        Ok(BuiltScene { scene, group })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use globe_assets::TextureImage;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Arc;

    fn textures() -> TexturePair {
        let tex = |label: &str| {
            Arc::new(TextureImage::from_rgba8(label, 2, 1, vec![128; 8]).unwrap())
        };
        TexturePair {
            day: tex("day"),
            night: tex("night"),
        }
    }

    fn build() -> BuiltScene {
        SceneBuilder::from_config(&GlobeConfig::default())
            .build_with_rng(textures(), &mut StdRng::seed_from_u64(11))
            .unwrap()
    }

    #[test]
    fn builds_one_of_each_node() {
        let built = build();
        let scene = &built.scene;
        assert_eq!(scene.count(NodeKind::Group), 1);
        assert_eq!(scene.count(NodeKind::Globe), 1);
        assert_eq!(scene.count(NodeKind::Atmosphere), 1);
        assert_eq!(scene.count(NodeKind::Light), 1);
        assert_eq!(scene.count(NodeKind::Stars), 1);
        assert_eq!(scene.roots().len(), 2);
    }

    #[test]
    fn group_holds_globe_atmosphere_and_light() {
        let built = build();
        let children = built.scene.children(built.group.id());
        let kinds: Vec<NodeKind> = children
            .iter()
            .filter_map(|&id| built.scene.get(id).map(|n| n.kind()))
            .collect();
        assert_eq!(
            kinds,
            vec![NodeKind::Globe, NodeKind::Atmosphere, NodeKind::Light]
        );
    }

    #[test]
    fn globe_and_atmosphere_share_geometry_not_material() {
        let built = build();
        let mut globe = None;
        let mut atmosphere = None;
        for (_, _, node) in built.scene.traverse() {
            match node {
                Node::Globe(g) => globe = Some(g.clone()),
                Node::Atmosphere(a) => atmosphere = Some(a.clone()),
                _ => {}
            }
        }
        let globe = globe.unwrap();
        let atmosphere = atmosphere.unwrap();
        assert_eq!(globe.geometry, atmosphere.geometry);
        assert_eq!(globe.geometry.radius, 5.0);
        assert_eq!(globe.geometry.width_segments, 50);
        assert_eq!(atmosphere.transform.scale, Vec3::splat(1.1));
    }

    #[test]
    fn sun_position_is_snapshot_of_light() {
        let built = build();
        let globe = built
            .scene
            .traverse()
            .into_iter()
            .find_map(|(_, _, node)| match node {
                Node::Globe(g) => Some(g.material.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(globe.sun_position, Vec3::new(5.0, 3.0, -4.5));
        assert_eq!(globe.terminator_sharpness, 10.0);
        assert_eq!(globe.day.label, "day");
    }

    #[test]
    fn star_field_is_root_level() {
        let built = build();
        let stars = built
            .scene
            .roots()
            .iter()
            .find_map(|&id| match built.scene.get(id) {
                Some(Node::Stars(s)) => Some(s.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(stars.positions().len(), 30_000);
    }

    #[test]
    fn rotating_the_group_leaves_stars_fixed() {
        let mut built = build();
        let stars_id = built.scene.roots()[1];
        assert!(built.scene.set_group_rotation(built.group, 1.0));
        assert_eq!(built.scene.world_matrix(stars_id), glam::Mat4::IDENTITY);
        assert_ne!(
            built.scene.world_matrix(built.group.id()),
            glam::Mat4::IDENTITY
        );
    }
}
