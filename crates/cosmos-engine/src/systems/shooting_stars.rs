//! Transient shooting stars.
//!
//! Spawned at random on a shell around the origin, each streak flies in a
//! straight line and fades out linearly over its lifetime. The streak's node
//! (and with it its geometry and material) is removed on the update where
//! its age first reaches its lifetime.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::api::types::NodeId;
use crate::components::mesh::{GeometryKind, MaterialDesc, ShaderProgram, Side, Uniforms};
use crate::core::math::{face_toward, spherical};
use crate::systems::epoch::Epoch;
use crate::systems::rng::Rng;

pub const BASE_SPAWN_CHANCE: f32 = 0.01;
pub const ENERGY_SPAWN_CHANCE: f32 = 0.1;

const STREAK_LENGTH: f32 = 10.0;
const STREAK_WIDTH: f32 = 0.2;
const MIN_RADIUS: f32 = 400.0;
const MAX_RADIUS: f32 = 600.0;
const MIN_SPEED: f32 = 50.0;
const MAX_SPEED: f32 = 150.0;
const MIN_LIFE: f32 = 1.0;
const MAX_LIFE: f32 = 2.0;
const INITIAL_OPACITY: f32 = 0.8;

/// Per-update spawn probability for the given energy.
pub fn spawn_chance(energy: f32) -> f32 {
    BASE_SPAWN_CHANCE + energy * ENERGY_SPAWN_CHANCE
}

/// One streak in flight.
#[derive(Debug, Clone)]
pub struct ShootingStar {
    pub node: NodeId,
    pub velocity: Vec3,
    pub age: f32,
    pub max_life: f32,
}

impl ShootingStar {
    /// Advance age. Returns false when expired.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.age += dt;
        self.age < self.max_life
    }

    pub fn opacity(&self) -> f32 {
        (1.0 - self.age / self.max_life).max(0.0)
    }
}

/// Live streaks plus lifetime counters.
#[derive(Debug, Default)]
pub struct ShootingStars {
    stars: Vec<ShootingStar>,
    spawned_total: u64,
    expired_total: u64,
}

impl ShootingStars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Roll the per-update spawn chance and spawn one streak on success.
    pub fn maybe_spawn(&mut self, epoch: &mut Epoch, rng: &mut Rng, energy: f32) -> Option<NodeId> {
        if !rng.chance(spawn_chance(energy)) {
            return None;
        }
        Some(self.spawn(epoch, rng))
    }

    pub fn spawn(&mut self, epoch: &mut Epoch, rng: &mut Rng) -> NodeId {
        let radius = rng.range(MIN_RADIUS, MAX_RADIUS);
        let theta = rng.next_f32() * TAU;
        let phi = rng.next_f32() * PI;
        let position = spherical(radius, theta, phi);

        let heading = Vec3::new(rng.symmetric(0.5), rng.symmetric(0.5), rng.symmetric(0.5));
        let speed = rng.range(MIN_SPEED, MAX_SPEED);
        let velocity = heading.try_normalize().unwrap_or(Vec3::X) * speed;
        let max_life = rng.range(MIN_LIFE, MAX_LIFE);

        let material = MaterialDesc::glow(ShaderProgram::ShootingStar)
            .with_side(Side::Double)
            .with_opacity(INITIAL_OPACITY)
            .with_uniforms(Uniforms::new().with_float("opacity", INITIAL_OPACITY));
        let node = epoch.spawn_mesh(
            "shooting-star",
            GeometryKind::Plane {
                width: STREAK_LENGTH,
                height: STREAK_WIDTH,
            },
            material,
            |n| {
                n.with_position(position)
                    .with_rotation(face_toward(position, Vec3::ZERO))
            },
        );

        self.stars.push(ShootingStar {
            node,
            velocity,
            age: 0.0,
            max_life,
        });
        self.spawned_total += 1;
        log::trace!("shooting star {:?} spawned, life {:.2}s", node, max_life);
        node
    }

    /// Move, fade and expire every live streak.
    pub fn update(&mut self, epoch: &mut Epoch, dt: f32) {
        let mut expired = 0;
        self.stars.retain_mut(|star| {
            let alive = star.tick(dt);
            if let Some(node) = epoch.scene.get_mut(star.node) {
                node.position += star.velocity * dt;
                if let Some(mesh) = node.mesh.as_mut() {
                    let opacity = star.opacity();
                    mesh.material.desc.opacity = opacity;
                    mesh.uniforms_mut().set_float("opacity", opacity);
                }
            }
            if !alive {
                epoch.remove(star.node);
                log::trace!("shooting star {:?} expired", star.node);
                expired += 1;
            }
            alive
        });
        self.expired_total += expired;
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShootingStar> {
        self.stars.iter()
    }

    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    pub fn expired_total(&self) -> u64 {
        self.expired_total
    }
}
