//! Parallax backdrop: three far star shells that trail the camera.
//!
//! Each shell is repositioned to `camera * rate` every frame with a rate just
//! below 1, so it barely moves relative to the viewer and the three shells
//! slide against each other.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::api::types::{NodeId, QualityLevel};
use crate::assets::profiles::QualityProfile;
use crate::components::mesh::{GeometryKind, MaterialDesc, PointBuffers, ShaderProgram, Uniforms};
use crate::core::math::{hex, lerp_color, sample_sphere};
use crate::renderer::resources::ResourcePool;
use crate::systems::epoch::{AnimatedParams, Epoch};
use crate::systems::rng::Rng;

struct ShellSpec {
    share: f32,
    radius: f32,
    size: f32,
    color: u32,
    rate: f32,
}

const SHELLS: [ShellSpec; 3] = [
    ShellSpec { share: 0.5, radius: 1500.0, size: 0.8, color: 0x88aaff, rate: 0.99 },
    ShellSpec { share: 0.3, radius: 2500.0, size: 1.2, color: 0xffccaa, rate: 0.995 },
    ShellSpec { share: 0.2, radius: 3500.0, size: 2.0, color: 0xffffff, rate: 0.999 },
];

const RADIUS_JITTER: f32 = 250.0;
/// Share of the outer shell pulled into the flattened galactic band.
const BAND_SHARE: f32 = 0.6;
const BAND_RADIUS_JITTER: f32 = 100.0;
const DUST_COLOR: u32 = 0x221144;
const DUST_MAX: f32 = 0.5;

#[derive(Debug, Clone, Copy)]
pub struct BackdropLayer {
    pub node: NodeId,
    /// Trailing coefficient, < 1.
    pub rate: f32,
}

#[derive(Debug)]
pub struct Backdrop {
    pub epoch: Epoch,
    layers: Vec<BackdropLayer>,
    quality: QualityLevel,
}

impl Backdrop {
    pub fn build(pool: &ResourcePool, rng: &mut Rng, quality: QualityLevel) -> Self {
        let profile = QualityProfile::for_level(quality);
        let mut epoch = Epoch::new(pool);
        let mut layers = Vec::with_capacity(SHELLS.len());
        let outer = SHELLS.len() - 1;

        for (idx, spec) in SHELLS.iter().enumerate() {
            let count = (profile.star_count as f32 * spec.share) as usize;
            let mut points = PointBuffers::with_capacity(count);
            for _ in 0..count {
                let position = if idx == outer && rng.chance(BAND_SHARE) {
                    band_point(rng, spec.radius)
                } else {
                    let radius = spec.radius + rng.symmetric(RADIUS_JITTER);
                    sample_sphere(rng, radius)
                };
                let mut color = hex(spec.color);
                if idx == outer {
                    color = lerp_color(color, hex(DUST_COLOR), rng.next_f32() * DUST_MAX);
                }
                let size = spec.size * (0.5 + rng.next_f32());
                let twinkle = 0.5 + rng.next_f32() * 1.5;
                points.push(position, color, size, Some(twinkle));
            }

            let material = MaterialDesc::glow(ShaderProgram::Star)
                .without_depth_test()
                .with_uniforms(Uniforms::new().with_float("time", 0.0));
            let geometry = GeometryKind::Points(points);
            let node = epoch.spawn_mesh("backdrop-shell", geometry, material, |n| n);
            epoch.animate(node, AnimatedParams::TIME);
            layers.push(BackdropLayer {
                node,
                rate: spec.rate,
            });
        }

        log::debug!("backdrop rebuilt for {:?}", quality);
        Self {
            epoch,
            layers,
            quality,
        }
    }

    /// Trail the camera and advance the twinkle clock.
    pub fn update(&mut self, camera_position: Vec3, time: f32) {
        for layer in &self.layers {
            if let Some(node) = self.epoch.scene.get_mut(layer.node) {
                node.position = camera_position * layer.rate;
            }
        }
        self.epoch.advance(0.0, time, 0.0);
    }

    pub fn layers(&self) -> &[BackdropLayer] {
        &self.layers
    }

    pub fn quality(&self) -> QualityLevel {
        self.quality
    }

    pub fn star_count(&self) -> usize {
        self.epoch
            .scene
            .iter()
            .filter_map(|n| n.mesh.as_ref())
            .map(|m| m.geometry.vertex_count())
            .sum()
    }
}

/// Point in a flattened ring around the Y axis.
fn band_point(rng: &mut Rng, radius: f32) -> Vec3 {
    let r = radius + rng.symmetric(BAND_RADIUS_JITTER);
    let theta = rng.next_f32() * TAU;
    let spread = 100.0 + rng.next_f32() * 150.0;
    Vec3::new(r * theta.cos(), rng.symmetric(spread / 2.0), r * theta.sin())
}
