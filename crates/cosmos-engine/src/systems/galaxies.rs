//! Distant galaxy billboards on an enclosing sphere, facing the origin.

use glam::{Quat, Vec3};

use crate::api::types::{NodeId, QualityLevel};
use crate::assets::profiles::QualityProfile;
use crate::components::mesh::{
    GeometryKind, MaterialDesc, ShaderProgram, Side, UniformValue, Uniforms,
};
use crate::core::math::{face_toward, hsl, sample_sphere};
use crate::renderer::resources::ResourcePool;
use crate::systems::epoch::{AnimatedParams, Epoch};
use crate::systems::rng::Rng;

const SPIRAL_SHARE: f32 = 0.6;
const MIN_SIZE: f32 = 50.0;
const MAX_SIZE: f32 = 200.0;
const MIN_RADIUS: f32 = 800.0;
const MAX_RADIUS: f32 = 2300.0;

/// Morphology passed to the galaxy program as `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalaxyKind {
    Spiral = 0,
    Irregular = 1,
}

#[derive(Debug)]
pub struct GalaxyField {
    pub epoch: Epoch,
    galaxies: Vec<NodeId>,
    quality: QualityLevel,
}

impl GalaxyField {
    pub fn build(pool: &ResourcePool, rng: &mut Rng, quality: QualityLevel) -> Self {
        let count = QualityProfile::galaxy_count(quality);
        let mut epoch = Epoch::new(pool);
        let mut galaxies = Vec::with_capacity(count);

        for _ in 0..count {
            let kind = if rng.chance(SPIRAL_SHARE) {
                GalaxyKind::Spiral
            } else {
                GalaxyKind::Irregular
            };
            let size = rng.range(MIN_SIZE, MAX_SIZE);
            let uniforms = Uniforms::new()
                .with_float("time", 0.0)
                .with_color("coreColor", hsl(rng.next_f32() * 0.1 + 0.05, 0.8, 0.9))
                .with_color("armColor", hsl(rng.next_f32() * 0.2 + 0.5, 0.6, 0.6))
                .with("type", UniformValue::Int(kind as i32))
                .with_float("swirl", rng.range(2.0, 7.0));
            let material = MaterialDesc::glow(ShaderProgram::Galaxy)
                .with_side(Side::Double)
                .with_uniforms(uniforms);

            let radius = rng.range(MIN_RADIUS, MAX_RADIUS);
            let position = sample_sphere(rng, radius);
            let roll = Quat::from_rotation_z(rng.next_f32() * std::f32::consts::PI);
            let rotation = face_toward(position, Vec3::ZERO) * roll;

            let id = epoch.spawn_mesh(
                "galaxy",
                GeometryKind::Plane {
                    width: size,
                    height: size,
                },
                material,
                |n| n.with_position(position).with_rotation(rotation),
            );
            epoch.animate(id, AnimatedParams::TIME);
            galaxies.push(id);
        }

        log::debug!("galaxy field: {} billboards", galaxies.len());
        Self {
            epoch,
            galaxies,
            quality,
        }
    }

    pub fn update(&mut self, time: f32) {
        self.epoch.advance(0.0, time, 0.0);
    }

    pub fn galaxies(&self) -> &[NodeId] {
        &self.galaxies
    }

    pub fn quality(&self) -> QualityLevel {
        self.quality
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_scales_with_quality() {
        let pool = ResourcePool::new();
        let mut rng = Rng::new(2);
        assert_eq!(GalaxyField::build(&pool, &mut rng, QualityLevel::Low).galaxies().len(), 30);
        assert_eq!(GalaxyField::build(&pool, &mut rng, QualityLevel::Medium).galaxies().len(), 30);
        assert_eq!(GalaxyField::build(&pool, &mut rng, QualityLevel::High).galaxies().len(), 60);
    }

    #[test]
    fn billboards_face_the_origin() {
        let pool = ResourcePool::new();
        let mut rng = Rng::new(2);
        let field = GalaxyField::build(&pool, &mut rng, QualityLevel::Medium);
        for id in field.galaxies() {
            let node = field.epoch.scene.get(*id).unwrap();
            let r = node.position.length();
            assert!(r >= MIN_RADIUS - 1e-2 && r <= MAX_RADIUS + 1e-2);
            let normal = node.rotation * Vec3::Z;
            let to_origin = (-node.position).normalize();
            assert!(normal.dot(to_origin) > 0.999);
        }
    }

    #[test]
    fn parameters_in_range() {
        let pool = ResourcePool::new();
        let mut rng = Rng::new(4);
        let field = GalaxyField::build(&pool, &mut rng, QualityLevel::High);
        let mut spirals = 0;
        for node in field.epoch.scene.iter() {
            let mesh = node.mesh.as_ref().unwrap();
            let u = &mesh.material.desc.uniforms;
            let swirl = u.float("swirl").unwrap();
            assert!((2.0..7.0).contains(&swirl));
            if u.get("type") == Some(UniformValue::Int(0)) {
                spirals += 1;
            }
            match mesh.geometry.kind {
                GeometryKind::Plane { width, .. } => assert!((MIN_SIZE..MAX_SIZE).contains(&width)),
                _ => panic!("galaxy must be a plane"),
            }
        }
        assert!(spirals > 0 && spirals < 60);
    }
}
