//! Globe scene: the static scene graph the renderer draws each frame.
//!
//! # Invariants
//! - A built scene holds exactly one rotating group and exactly one star field,
//!   both attached to the root independently.
//! - The globe and atmosphere share sphere dimensions but never a material.
//! - The group's rotation about +Y is the only quantity that changes after build.

pub mod builder;
pub mod geometry;
pub mod graph;
pub mod light;
pub mod mesh;
pub mod stars;

pub use builder::{BuiltScene, SceneBuilder};
pub use geometry::{MeshData, MeshVertex, SphereGeometry};
pub use graph::{GroupHandle, Node, NodeId, NodeKind, RotatingGroup, Scene, SceneError};
pub use light::DirectionalLight;
pub use mesh::{AtmosphereMaterial, AtmosphereMesh, Blending, GlobeMaterial, GlobeMesh, Side};
pub use stars::StarField;
