use glam::{Mat4, Quat, Vec3};

use crate::api::types::NodeId;
use crate::components::mesh::MeshComponent;

/// Fat scene node: a transform with an optional mesh.
/// Nodes without a mesh act as groups for their children.
#[derive(Debug)]
pub struct Node {
    /// Unique identifier within its scene.
    pub id: NodeId,
    /// String tag for finding nodes by name.
    pub tag: String,
    /// Invisible nodes hide themselves and all descendants.
    pub visible: bool,
    /// Parent node in the same scene, if any.
    pub parent: Option<NodeId>,
    /// Position relative to the parent.
    pub position: Vec3,
    /// Orientation relative to the parent.
    pub rotation: Quat,
    pub scale: Vec3,
    /// Renderable component. Groups have none.
    pub mesh: Option<MeshComponent>,
}

impl Node {
    /// Create a new node with the given ID at the origin.
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            tag: String::new(),
            visible: true,
            parent: None,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            mesh: None,
        }
    }

    // -- Builder pattern --

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_mesh(mut self, mesh: MeshComponent) -> Self {
        self.mesh = Some(mesh);
        self
    }

    /// Local transform matrix (scale, then rotate, then translate).
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}
