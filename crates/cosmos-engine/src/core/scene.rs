use glam::Mat4;

use crate::api::types::NodeId;
use crate::components::node::Node;

/// Simple node storage using a flat Vec.
/// Each content group (an epoch, the backdrop, the galaxy field, the morph
/// field) keeps its own scene; parent links never cross scenes.
#[derive(Debug)]
pub struct Scene {
    nodes: Vec<Node>,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            nodes: Vec::with_capacity(64),
            next_id: 1,
        }
    }

    /// Generate the next unique node ID.
    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a node to the scene. Returns its ID.
    pub fn spawn(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.push(node);
        id
    }

    /// Remove a node by ID. Returns the removed node if found.
    /// Dropping the returned node releases its resources.
    pub fn despawn(&mut self, id: NodeId) -> Option<Node> {
        let idx = self.nodes.iter().position(|n| n.id == id)?;
        Some(self.nodes.swap_remove(idx))
    }

    /// Get a reference to a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Get a mutable reference to a node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Iterate over all nodes.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Iterate over all nodes mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    /// Find the first node with the given tag.
    pub fn find_by_tag(&self, tag: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.tag == tag)
    }

    /// Find all nodes with the given tag.
    pub fn find_all_by_tag(&self, tag: &str) -> Vec<&Node> {
        self.nodes.iter().filter(|n| n.tag == tag).collect()
    }

    /// Transform from the node's local space to scene space.
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let mut node = self.get(id)?;
        let mut matrix = node.local_matrix();
        // Bounded walk: a malformed cycle must not hang the frame.
        for _ in 0..self.nodes.len() {
            let Some(parent) = node.parent.and_then(|p| self.get(p)) else {
                break;
            };
            matrix = parent.local_matrix() * matrix;
            node = parent;
        }
        Some(matrix)
    }

    /// A node is shown only if it and all of its ancestors are visible.
    pub fn is_shown(&self, id: NodeId) -> bool {
        let mut current = self.get(id);
        for _ in 0..=self.nodes.len() {
            match current {
                Some(node) if !node.visible => return false,
                Some(node) => current = node.parent.and_then(|p| self.get(p)),
                None => return true,
            }
        }
        true
    }

    /// Number of nodes in the scene.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes carrying a mesh.
    pub fn mesh_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.mesh.is_some()).count()
    }

    /// Remove all nodes, releasing their resources.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    #[test]
    fn spawn_and_get() {
        let mut scene = Scene::new();
        let id = scene.next_id();
        scene.spawn(Node::new(id).with_position(Vec3::new(10.0, 20.0, 30.0)));
        let n = scene.get(id).unwrap();
        assert_eq!(n.position, Vec3::new(10.0, 20.0, 30.0));
    }

    #[test]
    fn despawn_removes_node() {
        let mut scene = Scene::new();
        let id = scene.next_id();
        scene.spawn(Node::new(id));
        assert_eq!(scene.len(), 1);
        assert!(scene.despawn(id).is_some());
        assert_eq!(scene.len(), 0);
        assert!(scene.despawn(id).is_none());
    }

    #[test]
    fn find_by_tag() {
        let mut scene = Scene::new();
        let a = scene.next_id();
        let b = scene.next_id();
        scene.spawn(Node::new(a).with_tag("sun"));
        scene.spawn(Node::new(b).with_tag("portal"));
        assert_eq!(scene.find_by_tag("portal").unwrap().id, b);
    }

    #[test]
    fn world_matrix_composes_parents() {
        let mut scene = Scene::new();
        let parent = scene.next_id();
        let child = scene.next_id();
        scene.spawn(
            Node::new(parent)
                .with_position(Vec3::new(100.0, 0.0, 0.0))
                .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
        );
        scene.spawn(Node::new(child).with_parent(parent).with_position(Vec3::new(0.0, 0.0, 10.0)));
        let world = scene.world_matrix(child).unwrap();
        let p = world.transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(110.0, 0.0, 0.0)).length() < 1e-4, "p = {p}");
    }

    #[test]
    fn hidden_parent_hides_child() {
        let mut scene = Scene::new();
        let parent = scene.next_id();
        let child = scene.next_id();
        scene.spawn(Node::new(parent).with_visible(false));
        scene.spawn(Node::new(child).with_parent(parent));
        assert!(!scene.is_shown(child));
        scene.get_mut(parent).unwrap().visible = true;
        assert!(scene.is_shown(child));
    }
}
