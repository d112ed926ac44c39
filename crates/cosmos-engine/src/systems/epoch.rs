//! Generation epoch: one atomically replaceable set of generated content.
//!
//! An epoch owns its scene (and through it every geometry and material),
//! plus the explicit per-frame bookkeeping for that content: which nodes
//! take `time`/`energy` parameters, which pivots orbit, which groups spin.
//! Dropping an epoch releases all of its resources.

use glam::{Quat, Vec3};

use crate::api::types::NodeId;
use crate::components::mesh::{GeometryKind, MaterialDesc, MeshComponent};
use crate::components::node::Node;
use crate::core::scene::Scene;
use crate::renderer::resources::ResourcePool;

/// Which per-frame parameters a node's material consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnimatedParams {
    pub time: bool,
    pub energy: bool,
}

impl AnimatedParams {
    pub const TIME: Self = Self {
        time: true,
        energy: false,
    };
    pub const TIME_ENERGY: Self = Self {
        time: true,
        energy: true,
    };
}

#[derive(Debug, Clone, Copy)]
pub struct AnimatedNode {
    pub node: NodeId,
    pub params: AnimatedParams,
}

/// A pivot carrying a body at `orbit_radius` along its local +X.
/// The pivot is tilted about Z once and then turns about its Y axis.
#[derive(Debug, Clone, Copy)]
pub struct OrbitingBody {
    pub pivot: NodeId,
    /// Group the pivot hangs from.
    pub parent: NodeId,
    pub orbit_radius: f32,
    /// Radians per second.
    pub angular_speed: f32,
    pub tilt: f32,
    pub angle: f32,
}

impl OrbitingBody {
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.angle) * Quat::from_rotation_z(self.tilt)
    }
}

/// A node that turns about its local Y axis at a fixed rate.
#[derive(Debug, Clone, Copy)]
pub struct Spinner {
    pub node: NodeId,
    /// Radians per second.
    pub rate: f32,
    pub angle: f32,
}

#[derive(Debug)]
pub struct Epoch {
    pub scene: Scene,
    pool: ResourcePool,
    animated: Vec<AnimatedNode>,
    orbits: Vec<OrbitingBody>,
    spinners: Vec<Spinner>,
}

impl Epoch {
    pub fn new(pool: &ResourcePool) -> Self {
        Self {
            scene: Scene::new(),
            pool: pool.clone(),
            animated: Vec::new(),
            orbits: Vec::new(),
            spinners: Vec::new(),
        }
    }

    pub fn next_id(&mut self) -> NodeId {
        self.scene.next_id()
    }

    /// Allocate a mesh from this epoch's resource pool.
    pub fn mesh(&self, kind: GeometryKind, desc: MaterialDesc) -> MeshComponent {
        MeshComponent::new(&self.pool, kind, desc)
    }

    /// Spawn a mesh node. `configure` receives the fresh node to set its transform.
    pub fn spawn_mesh(
        &mut self,
        tag: &str,
        kind: GeometryKind,
        desc: MaterialDesc,
        configure: impl FnOnce(Node) -> Node,
    ) -> NodeId {
        let id = self.next_id();
        let mesh = self.mesh(kind, desc);
        self.scene.spawn(configure(Node::new(id).with_tag(tag).with_mesh(mesh)))
    }

    /// Spawn an empty group node.
    pub fn spawn_group(&mut self, tag: &str, configure: impl FnOnce(Node) -> Node) -> NodeId {
        let id = self.next_id();
        self.scene.spawn(configure(Node::new(id).with_tag(tag)))
    }

    /// Register a node for per-frame parameter updates.
    pub fn animate(&mut self, node: NodeId, params: AnimatedParams) {
        self.animated.push(AnimatedNode { node, params });
    }

    pub fn add_orbit(&mut self, body: OrbitingBody) {
        if let Some(pivot) = self.scene.get_mut(body.pivot) {
            pivot.rotation = body.rotation();
        }
        self.orbits.push(body);
    }

    pub fn add_spinner(&mut self, node: NodeId, rate: f32) {
        self.spinners.push(Spinner {
            node,
            rate,
            angle: 0.0,
        });
    }

    pub fn animated(&self) -> &[AnimatedNode] {
        &self.animated
    }

    pub fn orbits(&self) -> &[OrbitingBody] {
        &self.orbits
    }

    pub fn spinners(&self) -> &[Spinner] {
        &self.spinners
    }

    /// Push `time`/`energy` into registered materials, turn orbit pivots and
    /// spinning groups.
    pub fn advance(&mut self, dt: f32, time: f32, energy: f32) {
        for entry in &self.animated {
            let Some(mesh) = self.scene.get_mut(entry.node).and_then(|n| n.mesh.as_mut()) else {
                continue;
            };
            let uniforms = mesh.uniforms_mut();
            if entry.params.time {
                uniforms.set_float("time", time);
            }
            if entry.params.energy {
                uniforms.set_float("energy", energy);
            }
        }

        for body in &mut self.orbits {
            body.angle += dt * body.angular_speed;
            if let Some(pivot) = self.scene.get_mut(body.pivot) {
                pivot.rotation = body.rotation();
            }
        }

        for spinner in &mut self.spinners {
            spinner.angle += dt * spinner.rate;
            if let Some(node) = self.scene.get_mut(spinner.node) {
                node.rotation = Quat::from_rotation_y(spinner.angle);
            }
        }
    }

    /// Geometries plus materials currently held by this epoch's nodes.
    pub fn resource_count(&self) -> usize {
        self.scene.mesh_count() * 2
    }

    /// Remove a node and release its resources. Children must be removed separately.
    pub fn remove(&mut self, node: NodeId) -> bool {
        self.animated.retain(|a| a.node != node);
        self.scene.despawn(node).is_some()
    }

    pub fn position_of(&self, node: NodeId) -> Option<Vec3> {
        self.scene.get(node).map(|n| n.position)
    }

    /// Drop every node and registry entry, releasing all resources.
    pub fn clear(&mut self) {
        self.animated.clear();
        self.orbits.clear();
        self.spinners.clear();
        self.scene.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::mesh::ShaderProgram;

    fn sphere() -> GeometryKind {
        GeometryKind::Sphere {
            radius: 1.0,
            segments: 8,
        }
    }

    #[test]
    fn advance_updates_registered_params_only() {
        let pool = ResourcePool::new();
        let mut epoch = Epoch::new(&pool);
        let a = epoch.spawn_mesh("a", sphere(), MaterialDesc::new(ShaderProgram::Ether), |n| n);
        let b = epoch.spawn_mesh("b", sphere(), MaterialDesc::new(ShaderProgram::Sun), |n| n);
        epoch.animate(a, AnimatedParams::TIME_ENERGY);
        epoch.animate(b, AnimatedParams::TIME);

        epoch.advance(0.016, 3.0, 0.7);
        let ua = &epoch.scene.get(a).unwrap().mesh.as_ref().unwrap().material.desc.uniforms;
        let ub = &epoch.scene.get(b).unwrap().mesh.as_ref().unwrap().material.desc.uniforms;
        assert_eq!(ua.float("time"), Some(3.0));
        assert_eq!(ua.float("energy"), Some(0.7));
        assert_eq!(ub.float("time"), Some(3.0));
        assert!(!ub.contains("energy"));
    }

    #[test]
    fn orbit_turns_pivot() {
        let pool = ResourcePool::new();
        let mut epoch = Epoch::new(&pool);
        let parent = epoch.spawn_group("planet", |n| n);
        let pivot = epoch.spawn_group("moon-pivot", |n| n.with_parent(parent));
        epoch.add_orbit(OrbitingBody {
            pivot,
            parent,
            orbit_radius: 30.0,
            angular_speed: 0.5,
            tilt: 0.0,
            angle: 0.0,
        });
        epoch.advance(1.0, 1.0, 0.0);
        let rot = epoch.scene.get(pivot).unwrap().rotation;
        let expected = Quat::from_rotation_y(0.5);
        assert!(rot.abs_diff_eq(expected, 1e-6));
        assert!((epoch.orbits()[0].angle - 0.5).abs() < 1e-6);
    }

    #[test]
    fn dropping_epoch_releases_everything() {
        let pool = ResourcePool::new();
        let mut epoch = Epoch::new(&pool);
        for _ in 0..5 {
            epoch.spawn_mesh("m", sphere(), MaterialDesc::new(ShaderProgram::Basic), |n| n);
        }
        assert_eq!(epoch.resource_count(), 10);
        assert_eq!(pool.live_count(), 10);
        drop(epoch);
        assert_eq!(pool.live_count(), 0);
        assert_eq!(pool.drain_released().len(), 10);
    }

    #[test]
    fn clear_releases_everything_in_place() {
        let pool = ResourcePool::new();
        let mut epoch = Epoch::new(&pool);
        let id = epoch.spawn_mesh("m", sphere(), MaterialDesc::new(ShaderProgram::Basic), |n| n);
        epoch.animate(id, AnimatedParams::TIME);
        epoch.add_spinner(id, 1.0);
        epoch.clear();
        assert_eq!(pool.live_count(), 0);
        assert_eq!(pool.drain_released().len(), 2);
        assert!(epoch.animated().is_empty());
        assert!(epoch.spinners().is_empty());
        epoch.advance(0.1, 0.1, 0.0);
    }

    #[test]
    fn remove_releases_node_resources() {
        let pool = ResourcePool::new();
        let mut epoch = Epoch::new(&pool);
        let id = epoch.spawn_mesh("m", sphere(), MaterialDesc::new(ShaderProgram::Basic), |n| n);
        epoch.animate(id, AnimatedParams::TIME);
        assert!(epoch.remove(id));
        assert!(!epoch.remove(id));
        assert!(epoch.animated().is_empty());
        assert_eq!(pool.live_count(), 0);
    }
}
