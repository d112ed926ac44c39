use glam::Mat4;

use crate::components::mesh::BlendMode;
use crate::core::scene::Scene;
use crate::renderer::traits::DrawItem;

/// Append every shown mesh node of `scene` to `out`, with world matrices
/// composed onto `base` (the transform of the group the scene hangs from).
pub fn collect_draws<'a>(scene: &'a Scene, base: Mat4, out: &mut Vec<DrawItem<'a>>) {
    for node in scene.iter() {
        let Some(mesh) = node.mesh.as_ref() else {
            continue;
        };
        if !scene.is_shown(node.id) {
            continue;
        }
        let Some(local) = scene.world_matrix(node.id) else {
            continue;
        };
        out.push(DrawItem {
            node: node.id,
            world: base * local,
            geometry: &mesh.geometry,
            material: &mesh.material,
        });
    }
}

/// Order draws for submission: normal-blended first, then additive.
/// Stable, so each group keeps its collection order.
pub fn order_by_blend(draws: &mut [DrawItem<'_>]) {
    draws.sort_by_key(|d| d.material.desc.blend == BlendMode::Additive);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::mesh::{GeometryKind, MaterialDesc, MeshComponent, ShaderProgram};
    use crate::components::node::Node;
    use crate::renderer::resources::ResourcePool;
    use glam::Vec3;

    fn quad(pool: &ResourcePool, desc: MaterialDesc) -> MeshComponent {
        MeshComponent::new(
            pool,
            GeometryKind::Plane {
                width: 1.0,
                height: 1.0,
            },
            desc,
        )
    }

    #[test]
    fn hidden_and_meshless_nodes_are_skipped() {
        let pool = ResourcePool::new();
        let mut scene = Scene::new();
        let group = scene.next_id();
        let shown = scene.next_id();
        let hidden = scene.next_id();
        let under_hidden = scene.next_id();
        scene.spawn(Node::new(group).with_position(Vec3::new(5.0, 0.0, 0.0)));
        scene.spawn(
            Node::new(shown)
                .with_parent(group)
                .with_mesh(quad(&pool, MaterialDesc::new(ShaderProgram::Basic))),
        );
        scene.spawn(
            Node::new(hidden)
                .with_visible(false)
                .with_mesh(quad(&pool, MaterialDesc::new(ShaderProgram::Basic))),
        );
        scene.spawn(
            Node::new(under_hidden)
                .with_parent(hidden)
                .with_mesh(quad(&pool, MaterialDesc::new(ShaderProgram::Basic))),
        );

        let mut draws = Vec::new();
        collect_draws(&scene, Mat4::from_translation(Vec3::new(0.0, 10.0, 0.0)), &mut draws);
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].node, shown);
        let p = draws[0].world.transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(5.0, 10.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn additive_draws_come_last() {
        let pool = ResourcePool::new();
        let mut scene = Scene::new();
        for additive in [true, false, true, false] {
            let id = scene.next_id();
            let desc = if additive {
                MaterialDesc::glow(ShaderProgram::Sun)
            } else {
                MaterialDesc::new(ShaderProgram::Standard)
            };
            scene.spawn(Node::new(id).with_mesh(quad(&pool, desc)));
        }
        let mut draws = Vec::new();
        collect_draws(&scene, Mat4::IDENTITY, &mut draws);
        order_by_blend(&mut draws);
        let blends: Vec<BlendMode> = draws.iter().map(|d| d.material.desc.blend).collect();
        assert_eq!(
            blends,
            vec![BlendMode::Normal, BlendMode::Normal, BlendMode::Additive, BlendMode::Additive]
        );
    }
}
