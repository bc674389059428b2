use crate::light::DirectionalLight;
use crate::mesh::{AtmosphereMesh, GlobeMesh};
use crate::stars::StarField;
use glam::{Mat4, Quat};
use globe_common::Transform;
use std::collections::BTreeMap;
use std::f32::consts::TAU;

/// Identifier of a node within one [`Scene`]. Allocated sequentially.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

/// Typed handle to the scene's rotating group, returned by the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupHandle(NodeId);

impl GroupHandle {
    pub fn id(&self) -> NodeId {
        self.0
    }
}

/// Transform node whose rotation about +Y is animated.
#[derive(Debug, Clone, Default)]
pub struct RotatingGroup {
    transform: Transform,
    rotation_y: f32,
}

impl RotatingGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current rotation about +Y in radians, in `[0, 2π)`.
    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    /// Set the absolute rotation about +Y. The angle is wrapped into `[0, 2π)`.
    pub fn set_rotation_y(&mut self, angle: f32) {
        self.rotation_y = angle.rem_euclid(TAU);
        self.transform.rotation = Quat::from_rotation_y(self.rotation_y);
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }
}

/// A node in the scene graph.
#[derive(Debug, Clone)]
pub enum Node {
    Group(RotatingGroup),
    Globe(GlobeMesh),
    Atmosphere(AtmosphereMesh),
    Light(DirectionalLight),
    Stars(StarField),
}

/// Discriminant of [`Node`], used for counting and lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Group,
    Globe,
    Atmosphere,
    Light,
    Stars,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Group(_) => NodeKind::Group,
            Node::Globe(_) => NodeKind::Globe,
            Node::Atmosphere(_) => NodeKind::Atmosphere,
            Node::Light(_) => NodeKind::Light,
            Node::Stars(_) => NodeKind::Stars,
        }
    }

    /// Local-to-parent matrix. Lights and star fields have no transform of their own.
    pub fn local_matrix(&self) -> Mat4 {
        match self {
            Node::Group(g) => g.transform.matrix(),
            Node::Globe(m) => m.transform.matrix(),
            Node::Atmosphere(m) => m.transform.matrix(),
            Node::Light(_) | Node::Stars(_) => Mat4::IDENTITY,
        }
    }
}

/// Errors from scene graph edits.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("node not found: {0:?}")]
    NotFound(NodeId),
    #[error("node {0:?} is not a group and cannot have children")]
    NotAGroup(NodeId),
}

#[derive(Debug, Clone)]
struct NodeEntry {
    node: Node,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Root container of everything that is drawn or lit.
///
/// All edits go through explicit operations. Nodes are kept in a BTreeMap so
/// traversal order is insertion order and stable across runs.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: BTreeMap<NodeId, NodeEntry>,
    roots: Vec<NodeId>,
    next_id: u32,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the scene.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes of the given kind.
    pub fn count(&self, kind: NodeKind) -> usize {
        self.nodes.values().filter(|e| e.node.kind() == kind).count()
    }

    /// Attach a node directly under the scene root.
    pub fn add(&mut self, node: Node) -> NodeId {
        let id = self.allocate(node, None);
        self.roots.push(id);
        id
    }

    /// Attach a node under an existing group.
    pub fn add_child(&mut self, parent: NodeId, node: Node) -> Result<NodeId, SceneError> {
        match self.nodes.get(&parent) {
            None => return Err(SceneError::NotFound(parent)),
            Some(entry) if entry.node.kind() != NodeKind::Group => {
                return Err(SceneError::NotAGroup(parent));
            }
            Some(_) => {}
        }
        let id = self.allocate(node, Some(parent));
        if let Some(entry) = self.nodes.get_mut(&parent) {
            entry.children.push(id);
        }
        Ok(id)
    }

    /// Wrap a group node id in a [`GroupHandle`].
    pub fn group_handle(&self, id: NodeId) -> Result<GroupHandle, SceneError> {
        match self.get(id) {
            Some(Node::Group(_)) => Ok(GroupHandle(id)),
            Some(_) => Err(SceneError::NotAGroup(id)),
            None => Err(SceneError::NotFound(id)),
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id).map(|e| &e.node)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id).map(|e| &mut e.node)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|e| e.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map_or(&[], |e| e.children.as_slice())
    }

    /// Ids of the nodes attached directly under the root.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn group(&self, handle: GroupHandle) -> Option<&RotatingGroup> {
        match self.get(handle.0) {
            Some(Node::Group(g)) => Some(g),
            _ => None,
        }
    }

    pub fn group_mut(&mut self, handle: GroupHandle) -> Option<&mut RotatingGroup> {
        match self.get_mut(handle.0) {
            Some(Node::Group(g)) => Some(g),
            _ => None,
        }
    }

    /// Set a group's rotation about +Y. Returns `false` if the handle is stale.
    pub fn set_group_rotation(&mut self, handle: GroupHandle, angle: f32) -> bool {
        match self.group_mut(handle) {
            Some(group) => {
                group.set_rotation_y(angle);
                true
            }
            None => false,
        }
    }

    /// Local-to-world matrix of a node (product of its ancestors' transforms).
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(entry) = self.nodes.get(&node_id) else {
                break;
            };
            matrix = entry.node.local_matrix() * matrix;
            current = entry.parent;
        }
        matrix
    }

    /// Every node with its world matrix, depth-first from the roots.
    pub fn traverse(&self) -> Vec<(NodeId, Mat4, &Node)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(NodeId, Mat4)> = self
            .roots
            .iter()
            .rev()
            .map(|&id| (id, Mat4::IDENTITY))
            .collect();
        while let Some((id, parent_matrix)) = stack.pop() {
            let Some(entry) = self.nodes.get(&id) else {
                continue;
            };
            let world = parent_matrix * entry.node.local_matrix();
            out.push((id, world, &entry.node));
            for &child in entry.children.iter().rev() {
                stack.push((child, world));
            }
        }
        out
    }

    fn allocate(&mut self, node: Node, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            NodeEntry {
                node,
                parent,
                children: Vec::new(),
            },
        );
        id
    }
}
