//! Reactive morph field.
//!
//! A particle shell whose displacement is driven by motion energy, plus two
//! tiers of shapes that switch on as energy climbs: four seeds (wireframe
//! spheres and rings) and three plasma knots. The whole field rides along
//! with the camera.

use glam::{Quat, Vec3};

use crate::api::types::{MotionSignal, NodeId};
use crate::components::mesh::{GeometryKind, MaterialDesc, PointBuffers, ShaderProgram, Uniforms};
use crate::core::math::{hex, lerp, sample_cube, sample_sphere};
use crate::renderer::resources::ResourcePool;
use crate::renderer::traits::DrawItem;
use crate::systems::epoch::{AnimatedParams, Epoch};
use crate::systems::render::collect_draws;
use crate::systems::rng::Rng;

const PARTICLE_MIN_RADIUS: f32 = 15.0;
const PARTICLE_MAX_RADIUS: f32 = 75.0;
const PARTICLE_MIN_SIZE: f32 = 2.0;
const PARTICLE_MAX_SIZE: f32 = 8.0;

const SEED_COUNT: usize = 4;
const SEED_BASE_THRESHOLD: f32 = 0.25;
const SEED_THRESHOLD_STEP: f32 = 0.2;
const SEED_SPREAD: f32 = 60.0;
const SEED_SPHERE_RADIUS: f32 = 3.5;
const SEED_RING_RADIUS: f32 = 5.0;
const SEED_RING_TUBE: f32 = 0.15;
const SEED_RING_COLOR: u32 = 0x0088ff;
const SEED_OPACITY_GAIN: f32 = 2.5;
const SEED_MAX_OPACITY: f32 = 0.8;
const OPACITY_BLEND: f32 = 0.1;
const JITTER_IMPULSE: f32 = 0.4;

const KNOT_COUNT: usize = 3;
const KNOT_BASE_THRESHOLD: f32 = 0.7;
const KNOT_THRESHOLD_STEP: f32 = 0.1;
const KNOT_SPREAD: f32 = 75.0;
const KNOT_RADIUS: f32 = 2.0;
const KNOT_DETAIL: u32 = 4;
const KNOT_COLOR: u32 = 0xff3300;
const KNOT_OPACITY_GAIN: f32 = 3.0;
const KNOT_SPIN: f32 = 5.0;
const KNOT_PULSE_FREQ: f32 = 10.0;
const KNOT_PULSE_DEPTH: f32 = 0.2;

/// A shape that switches on above an energy threshold.
#[derive(Debug, Clone, Copy)]
pub struct Stage {
    pub node: NodeId,
    pub threshold: f32,
    /// Accumulated Euler spin (x, y).
    spin: (f32, f32),
}

#[derive(Debug)]
pub struct MorphField {
    pub epoch: Epoch,
    root: NodeId,
    particles: NodeId,
    seeds: Vec<Stage>,
    knots: Vec<Stage>,
    rng: Rng,
    time: f32,
}

impl MorphField {
    pub fn new(pool: &ResourcePool, seed: u64, particle_count: usize) -> Self {
        let mut rng = Rng::new(seed);
        let mut epoch = Epoch::new(pool);
        let root = epoch.spawn_group("morph-field", |n| n);

        let mut points = PointBuffers::with_capacity(particle_count);
        for _ in 0..particle_count {
            let radius = rng.range(PARTICLE_MIN_RADIUS, PARTICLE_MAX_RADIUS);
            let position = sample_sphere(&mut rng, radius);
            let size = rng.range(PARTICLE_MIN_SIZE, PARTICLE_MAX_SIZE);
            points.push(position, [1.0; 3], size, None);
        }
        let material = MaterialDesc::glow(ShaderProgram::MorphParticle)
            .with_uniforms(Uniforms::new().with_float("time", 0.0).with_float("energy", 0.0));
        let geometry = GeometryKind::Points(points);
        let particles =
            epoch.spawn_mesh("morph-particles", geometry, material, |n| n.with_parent(root));
        epoch.animate(particles, AnimatedParams::TIME_ENERGY);

        let seeds = (0..SEED_COUNT)
            .map(|i| {
                let (tag, kind, desc) = if i < 2 {
                    (
                        "morph-seed-sphere",
                        GeometryKind::Sphere {
                            radius: SEED_SPHERE_RADIUS,
                            segments: 32,
                        },
                        MaterialDesc::glow(ShaderProgram::Basic).wireframe(),
                    )
                } else {
                    (
                        "morph-seed-ring",
                        GeometryKind::Torus {
                            radius: SEED_RING_RADIUS,
                            tube: SEED_RING_TUBE,
                            radial_segments: 16,
                            tubular_segments: 100,
                        },
                        MaterialDesc::glow(ShaderProgram::Basic).with_color(hex(SEED_RING_COLOR)),
                    )
                };
                let position = sample_cube(&mut rng, SEED_SPREAD);
                let node = epoch.spawn_mesh(tag, kind, desc.with_opacity(0.0), |n| {
                    n.with_parent(root).with_position(position).with_visible(false)
                });
                Stage {
                    node,
                    threshold: SEED_BASE_THRESHOLD + SEED_THRESHOLD_STEP * i as f32,
                    spin: (0.0, 0.0),
                }
            })
            .collect();

        let knots = (0..KNOT_COUNT)
            .map(|i| {
                let position = sample_cube(&mut rng, KNOT_SPREAD);
                let desc = MaterialDesc::glow(ShaderProgram::Basic)
                    .wireframe()
                    .with_color(hex(KNOT_COLOR))
                    .with_opacity(0.0);
                let node = epoch.spawn_mesh(
                    "morph-knot",
                    GeometryKind::Icosahedron {
                        radius: KNOT_RADIUS,
                        detail: KNOT_DETAIL,
                    },
                    desc,
                    |n| n.with_parent(root).with_position(position).with_visible(false),
                );
                Stage {
                    node,
                    threshold: KNOT_BASE_THRESHOLD + KNOT_THRESHOLD_STEP * i as f32,
                    spin: (0.0, 0.0),
                }
            })
            .collect();

        Self {
            epoch,
            root,
            particles,
            seeds,
            knots,
            rng,
            time: 0.0,
        }
    }

    pub fn update(&mut self, dt: f32, signal: MotionSignal, camera_position: Vec3) {
        self.time += dt;
        let MotionSignal { energy, impulse } = signal;
        self.epoch.advance(dt, self.time, energy);

        for stage in &mut self.seeds {
            let Some(node) = self.epoch.scene.get_mut(stage.node) else {
                continue;
            };
            let active = energy > stage.threshold;
            node.visible = active;
            if !active {
                continue;
            }
            let target =
                ((energy - stage.threshold) * SEED_OPACITY_GAIN).clamp(0.0, SEED_MAX_OPACITY);
            if let Some(mesh) = node.mesh.as_mut() {
                let desc = &mut mesh.material.desc;
                desc.opacity = lerp(desc.opacity, target, OPACITY_BLEND);
            }
            stage.spin.0 += dt * (0.5 + energy);
            stage.spin.1 += dt * (1.0 + energy * 2.0);
            node.rotation = Quat::from_euler(glam::EulerRot::XYZ, stage.spin.0, stage.spin.1, 0.0);
            if impulse > JITTER_IMPULSE {
                node.position.x += self.rng.symmetric(0.5) * impulse * 2.0;
                node.position.y += self.rng.symmetric(0.5) * impulse * 2.0;
            }
        }

        let pulse = 1.0 + (self.time * KNOT_PULSE_FREQ).sin() * KNOT_PULSE_DEPTH;
        for stage in &mut self.knots {
            let Some(node) = self.epoch.scene.get_mut(stage.node) else {
                continue;
            };
            let active = energy > stage.threshold;
            node.visible = active;
            if !active {
                continue;
            }
            let target = ((energy - stage.threshold) * KNOT_OPACITY_GAIN).clamp(0.0, 1.0);
            if let Some(mesh) = node.mesh.as_mut() {
                let desc = &mut mesh.material.desc;
                desc.opacity = lerp(desc.opacity, target, OPACITY_BLEND);
            }
            stage.spin.1 -= dt * KNOT_SPIN;
            node.rotation = Quat::from_rotation_y(stage.spin.1);
            node.scale = Vec3::splat(pulse);
        }

        if let Some(root) = self.epoch.scene.get_mut(self.root) {
            root.position = camera_position;
        }
    }

    /// Show or hide the whole field.
    pub fn set_visible(&mut self, visible: bool) {
        if let Some(root) = self.epoch.scene.get_mut(self.root) {
            root.visible = visible;
        }
    }

    /// Release every resource the field holds. The field stays empty.
    pub fn clear(&mut self) {
        self.seeds.clear();
        self.knots.clear();
        self.epoch.clear();
    }

    pub fn is_visible(&self) -> bool {
        self.epoch.scene.get(self.root).is_some_and(|n| n.visible)
    }

    pub fn collect_draws<'a>(&'a self, out: &mut Vec<DrawItem<'a>>) {
        collect_draws(&self.epoch.scene, glam::Mat4::IDENTITY, out);
    }

    pub fn seeds(&self) -> &[Stage] {
        &self.seeds
    }

    pub fn knots(&self) -> &[Stage] {
        &self.knots
    }

    pub fn particles(&self) -> NodeId {
        self.particles
    }

    pub fn position(&self) -> Vec3 {
        self.epoch.position_of(self.root).unwrap_or(Vec3::ZERO)
    }

    pub fn stage_opacity(&self, stage: &Stage) -> f32 {
        self.epoch
            .scene
            .get(stage.node)
            .and_then(|n| n.mesh.as_ref())
            .map_or(0.0, |m| m.material.desc.opacity)
    }

    pub fn stage_visible(&self, stage: &Stage) -> bool {
        self.epoch.scene.get(stage.node).is_some_and(|n| n.visible)
    }
}
