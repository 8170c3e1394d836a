/// Scene graph: an arena of nodes with parent/child ownership
use nalgebra::{Matrix4, Point3, Vector3};

use crate::geometry::Mesh;
use crate::material::{Color, Material};
use crate::transform::{RotationState, Transform};

/// Handle of a node inside a [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub target: Point3<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Group,
    Mesh { mesh: Mesh, material: Material },
    DirectionalLight(DirectionalLight),
    AmbientLight(AmbientLight),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub position: Vector3<f32>,
    pub rotation: RotationState,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            position: Vector3::zeros(),
            rotation: RotationState::zero(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn mesh(name: impl Into<String>, mesh: Mesh, material: Material) -> Self {
        Self::new(name, NodeKind::Mesh { mesh, material })
    }

    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vector3::new(x, y, z);
        self
    }

    pub fn local_matrix(&self) -> Matrix4<f32> {
        Transform::model_matrix(&self.position, &self.rotation)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn material(&self) -> Option<&Material> {
        match &self.kind {
            NodeKind::Mesh { material, .. } => Some(material),
            _ => None,
        }
    }

    pub fn material_mut(&mut self) -> Option<&mut Material> {
        match &mut self.kind {
            NodeKind::Mesh { material, .. } => Some(material),
            _ => None,
        }
    }
}

/// A mesh ready to draw, with its world matrix
pub struct MeshDraw<'a> {
    pub id: NodeId,
    pub mesh: &'a Mesh,
    pub material: &'a Material,
    pub world: Matrix4<f32>,
}

/// Lights in world space
#[derive(Debug, Clone, Default)]
pub struct Lighting {
    /// Sum of ambient color × intensity
    pub ambient: Color,
    /// Direction towards each light (unit length) and its radiance
    pub directional: Vec<(Vector3<f32>, Color)>,
}

/// Root of the scene graph; exclusively owns every node
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node at the top level
    pub fn add(&mut self, node: Node) -> NodeId {
        let id = self.insert(node, None);
        self.roots.push(id);
        id
    }

    /// Add a node owned by `parent`
    pub fn add_child(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = self.insert(node, Some(parent));
        self.nodes[parent.0].children.push(id);
        id
    }

    fn insert(&mut self, mut node: Node, parent: Option<NodeId>) -> NodeId {
        node.parent = parent;
        node.children.clear();
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name).map(NodeId)
    }

    pub fn mesh_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Mesh { .. }))
            .count()
    }

    /// World matrix of a node: product of its ancestors' local matrices and its own
    pub fn world_matrix(&self, id: NodeId) -> Matrix4<f32> {
        let node = self.node(id);
        match node.parent {
            Some(parent) => self.world_matrix(parent) * node.local_matrix(),
            None => node.local_matrix(),
        }
    }

    /// Every mesh reachable from the roots, depth first, in insertion order
    pub fn mesh_draws(&self) -> Vec<MeshDraw<'_>> {
        let mut draws = Vec::new();
        for &root in &self.roots {
            self.collect_draws(root, Matrix4::identity(), &mut draws);
        }
        draws
    }

    fn collect_draws<'a>(&'a self, id: NodeId, parent: Matrix4<f32>, draws: &mut Vec<MeshDraw<'a>>) {
        let node = self.node(id);
        let world = parent * node.local_matrix();
        if let NodeKind::Mesh { mesh, material } = &node.kind {
            draws.push(MeshDraw {
                id,
                mesh,
                material,
                world,
            });
        }
        for &child in &node.children {
            self.collect_draws(child, world, draws);
        }
    }

    pub fn lighting(&self) -> Lighting {
        let mut lighting = Lighting::default();
        for (index, node) in self.nodes.iter().enumerate() {
            match &node.kind {
                NodeKind::AmbientLight(light) => {
                    lighting.ambient = lighting.ambient.add(light.color.scale(light.intensity));
                }
                NodeKind::DirectionalLight(light) => {
                    let position = self.world_matrix(NodeId(index)).transform_point(&Point3::origin());
                    let towards = position - light.target;
                    if towards.norm() > f32::EPSILON {
                        lighting
                            .directional
                            .push((towards.normalize(), light.color.scale(light.intensity)));
                    }
                }
                _ => {}
            }
        }
        lighting
    }
}
