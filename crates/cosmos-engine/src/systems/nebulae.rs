//! Nebula volumes: back-faced spheres shaded with a two-colour noise gradient.

use crate::api::types::NodeId;
use crate::assets::profiles::QualityProfile;
use crate::components::mesh::{
    GeometryKind, MaterialDesc, ShaderProgram, Side, UniformValue, Uniforms,
};
use crate::core::math::{hex, sample_cube};
use crate::systems::epoch::{AnimatedParams, Epoch};
use crate::systems::rng::Rng;

const PALETTE: [(u32, u32); 3] = [
    (0x330088, 0x0022ff),
    (0xcc3300, 0xffaa00),
    (0x008844, 0x001144),
];

const MIN_RADIUS: f32 = 150.0;
const MAX_RADIUS: f32 = 250.0;
const SPREAD: f32 = 400.0;
const OPACITY: f32 = 0.12;

pub fn build(epoch: &mut Epoch, rng: &mut Rng, profile: &QualityProfile) -> Vec<NodeId> {
    let count = profile.nebula_count();
    let mut nebulae = Vec::with_capacity(count);

    for i in 0..count {
        let (inner, outer) = PALETTE[i % PALETTE.len()];
        let radius = rng.range(MIN_RADIUS, MAX_RADIUS);
        let uniforms = Uniforms::new()
            .with_float("time", 0.0)
            .with_float("opacity", OPACITY)
            .with_float("warp", profile.nebula_warp)
            .with("octaves", UniformValue::Int(profile.nebula_octaves as i32))
            .with_color("color1", hex(inner))
            .with_color("color2", hex(outer));
        let material = MaterialDesc::glow(ShaderProgram::Nebula)
            .with_side(Side::Back)
            .with_uniforms(uniforms);
        let position = sample_cube(rng, SPREAD);

        let id = epoch.spawn_mesh(
            "nebula",
            GeometryKind::Sphere {
                radius,
                segments: 32,
            },
            material,
            |n| n.with_position(position),
        );
        epoch.animate(id, AnimatedParams::TIME);
        nebulae.push(id);
    }

    log::debug!("nebulae: {}", nebulae.len());
    nebulae
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::QualityLevel;
    use crate::renderer::resources::ResourcePool;

    #[test]
    fn count_follows_octave_budget() {
        let pool = ResourcePool::new();
        let mut rng = Rng::new(10);
        for (level, expected) in [
            (QualityLevel::Low, 3),
            (QualityLevel::Medium, 3),
            (QualityLevel::High, 6),
        ] {
            let mut epoch = Epoch::new(&pool);
            let ids = build(&mut epoch, &mut rng, QualityProfile::for_level(level));
            assert_eq!(ids.len(), expected);
        }
    }

    #[test]
    fn profile_parameters_reach_the_material() {
        let pool = ResourcePool::new();
        let mut rng = Rng::new(10);
        let mut epoch = Epoch::new(&pool);
        let profile = QualityProfile::for_level(QualityLevel::High);
        let ids = build(&mut epoch, &mut rng, profile);
        for id in ids {
            let node = epoch.scene.get(id).unwrap();
            assert!(node.position.abs().max_element() <= SPREAD);
            let u = &node.mesh.as_ref().unwrap().material.desc.uniforms;
            assert_eq!(u.float("warp"), Some(0.5));
            assert_eq!(u.get("octaves"), Some(UniformValue::Int(6)));
            assert_eq!(u.float("opacity"), Some(OPACITY));
        }
    }
}
