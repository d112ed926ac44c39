//! Star shells and the constellation lines drawn between their stars.

use glam::Vec3;

use crate::api::types::NodeId;
use crate::assets::profiles::QualityProfile;
use crate::components::mesh::{GeometryKind, MaterialDesc, PointBuffers, ShaderProgram, Uniforms};
use crate::core::math::{hex, hsl, sample_sphere};
use crate::systems::epoch::{AnimatedParams, Epoch};
use crate::systems::rng::Rng;

/// Shell `i` spans `[300 + 200i, 600 + 400i]`.
const SHELL_MIN_BASE: f32 = 300.0;
const SHELL_MIN_STEP: f32 = 200.0;
const SHELL_MAX_BASE: f32 = 600.0;
const SHELL_MAX_STEP: f32 = 400.0;

const CONSTELLATION_SAMPLES: usize = 60;
const CONSTELLATION_MAX_LENGTH: f32 = 60.0;
const CONSTELLATION_COLOR: u32 = 0x5599ff;
const CONSTELLATION_OPACITY: f32 = 0.25;

/// Radius band of star shell `layer`.
pub fn shell_band(layer: usize) -> (f32, f32) {
    let i = layer as f32;
    (
        SHELL_MIN_BASE + SHELL_MIN_STEP * i,
        SHELL_MAX_BASE + SHELL_MAX_STEP * i,
    )
}

/// Build `profile.star_layers` concentric shells of `stars_per_layer` stars each.
pub fn build_shells(epoch: &mut Epoch, rng: &mut Rng, profile: &QualityProfile) -> Vec<NodeId> {
    let per_layer = profile.stars_per_layer();
    let mut shells = Vec::with_capacity(profile.star_layers);

    for layer in 0..profile.star_layers {
        let (min_r, max_r) = shell_band(layer);
        let mut points = PointBuffers::with_capacity(per_layer);
        for _ in 0..per_layer {
            let radius = rng.range(min_r, max_r);
            let position = sample_sphere(rng, radius);
            let color = hsl(rng.next_f32() * 0.1 + 0.55, 0.4, 0.8 + rng.next_f32() * 0.2);
            let size = (rng.next_f32() * 1.5 + 0.5) * (layer + 1) as f32;
            let twinkle = 0.5 + rng.next_f32() * 2.0;
            points.push(position, color, size, Some(twinkle));
        }

        let material = MaterialDesc::glow(ShaderProgram::Star)
            .with_uniforms(Uniforms::new().with_float("time", 0.0));
        let id = epoch.spawn_mesh("star-shell", GeometryKind::Points(points), material, |n| n);
        epoch.animate(id, AnimatedParams::TIME);
        shells.push(id);
    }

    log::debug!("star shells: {} x {}", shells.len(), per_layer);
    shells
}

/// Sample random star pairs from `shell` and join the close ones with lines.
/// Returns `None` only if `shell` is not a point cloud in this epoch.
pub fn build_constellations(epoch: &mut Epoch, rng: &mut Rng, shell: NodeId) -> Option<NodeId> {
    let segments = {
        let node = epoch.scene.get(shell)?;
        let GeometryKind::Points(points) = &node.mesh.as_ref()?.geometry.kind else {
            return None;
        };
        pick_segments(points, rng)
    };

    let line_count = segments.len() / 6;
    let material = MaterialDesc::new(ShaderProgram::Line)
        .additive()
        .transparent()
        .with_color(hex(CONSTELLATION_COLOR))
        .with_opacity(CONSTELLATION_OPACITY);
    let id = epoch.spawn_mesh(
        "constellations",
        GeometryKind::LineSegments { positions: segments },
        material,
        |n| n,
    );
    log::debug!("constellations: {} lines", line_count);
    Some(id)
}

fn pick_segments(points: &PointBuffers, rng: &mut Rng) -> Vec<f32> {
    let count = points.len();
    let mut segments = Vec::new();
    if count == 0 {
        return segments;
    }
    for _ in 0..CONSTELLATION_SAMPLES {
        let a = points.position(rng.next_int(count as u32) as usize);
        let b = points.position(rng.next_int(count as u32) as usize);
        if a.distance(b) < CONSTELLATION_MAX_LENGTH {
            push_segment(&mut segments, a, b);
        }
    }
    segments
}

fn push_segment(out: &mut Vec<f32>, a: Vec3, b: Vec3) {
    out.extend_from_slice(&a.to_array());
    out.extend_from_slice(&b.to_array());
}
