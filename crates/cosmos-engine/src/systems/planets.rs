//! The planet roster.
//!
//! Realistic planets are a group of surface, atmospheric rim, cloud shell,
//! optional ring and orbiting moons. Flat planets are a single lit sphere.
//! Every planet group spins slowly about its own Y axis.

use std::f32::consts::PI;

use glam::{Quat, Vec3};

use crate::api::types::NodeId;
use crate::components::mesh::{GeometryKind, MaterialDesc, ShaderProgram, Side, Uniforms};
use crate::core::math::{hex, lerp_color};
use crate::systems::epoch::{AnimatedParams, Epoch, OrbitingBody};
use crate::systems::rng::Rng;

struct PlanetSpec {
    radius: f32,
    color: u32,
    position: Vec3,
    glow: u32,
    ring: bool,
    moons: usize,
}

const ROSTER: [PlanetSpec; 3] = [
    PlanetSpec {
        radius: 15.0,
        color: 0x1133aa,
        position: Vec3::new(50.0, 0.0, -50.0),
        glow: 0x44aaff,
        ring: false,
        moons: 1,
    },
    PlanetSpec {
        radius: 25.0,
        color: 0xaa6622,
        position: Vec3::new(120.0, 40.0, 20.0),
        glow: 0xffaa44,
        ring: true,
        moons: 2,
    },
    PlanetSpec {
        radius: 10.0,
        color: 0xaa2244,
        position: Vec3::new(-40.0, 60.0, 80.0),
        glow: 0xff44aa,
        ring: false,
        moons: 0,
    },
];

pub const PLANET_SPIN_RATE: f32 = 0.05;

const ATMOSPHERE_SCALE: f32 = 1.05;
const ATMOSPHERE_POWER: f32 = 4.5;
const CLOUD_SCALE: f32 = 1.08;
const RING_SCALE: f32 = 5.0;
const RING_TILT: f32 = PI / 2.5;
const MOON_COLOR: u32 = 0x888888;

const FLAT_ROUGHNESS: f32 = 0.7;
const FLAT_METALNESS: f32 = 0.2;

fn sphere(radius: f32, segments: u32) -> GeometryKind {
    GeometryKind::Sphere { radius, segments }
}

/// Build the whole roster. Returns the planet group ids.
pub fn build(
    epoch: &mut Epoch,
    rng: &mut Rng,
    realistic: bool,
    sun_direction: Vec3,
) -> Vec<NodeId> {
    let groups: Vec<NodeId> = ROSTER
        .iter()
        .map(|spec| {
            let group = epoch.spawn_group("planet", |n| n.with_position(spec.position));
            if realistic {
                build_realistic(epoch, rng, spec, group, sun_direction);
            } else {
                build_flat(epoch, spec, group);
            }
            epoch.add_spinner(group, PLANET_SPIN_RATE);
            group
        })
        .collect();

    log::debug!(
        "planets: {} ({})",
        groups.len(),
        if realistic { "realistic" } else { "flat" }
    );
    groups
}

fn build_realistic(
    epoch: &mut Epoch,
    rng: &mut Rng,
    spec: &PlanetSpec,
    group: NodeId,
    sun_direction: Vec3,
) {
    let base = hex(spec.color);
    let sun = sun_direction.to_array();

    let surface = MaterialDesc::new(ShaderProgram::PlanetSurface).with_uniforms(
        Uniforms::new()
            .with_color("baseColor", base)
            .with_color("sunDirection", sun)
            .with_float("time", 0.0),
    );
    let id = epoch.spawn_mesh("planet-surface", sphere(spec.radius, 64), surface, |n| {
        n.with_parent(group)
    });
    epoch.animate(id, AnimatedParams::TIME);

    let atmosphere = MaterialDesc::glow(ShaderProgram::Atmosphere)
        .with_side(Side::Back)
        .with_uniforms(
            Uniforms::new()
                .with_color("color", hex(spec.glow))
                .with_float("power", ATMOSPHERE_POWER),
        );
    epoch.spawn_mesh(
        "planet-atmosphere",
        sphere(spec.radius * ATMOSPHERE_SCALE, 64),
        atmosphere,
        |n| n.with_parent(group),
    );

    let clouds = MaterialDesc::glow(ShaderProgram::Cloud).with_uniforms(
        Uniforms::new()
            .with_float("time", 0.0)
            .with_color("sunDirection", sun),
    );
    let id = epoch.spawn_mesh("planet-clouds", sphere(spec.radius * CLOUD_SCALE, 64), clouds, |n| {
        n.with_parent(group)
    });
    epoch.animate(id, AnimatedParams::TIME);

    if spec.ring {
        let size = spec.radius * RING_SCALE;
        let ring = MaterialDesc::new(ShaderProgram::Ring)
            .transparent()
            .with_side(Side::Double)
            .with_uniforms(Uniforms::new().with_color("color", lerp_color(base, [1.0; 3], 0.5)));
        epoch.spawn_mesh(
            "planet-ring",
            GeometryKind::Plane {
                width: size,
                height: size,
            },
            ring,
            |n| n.with_parent(group).with_rotation(Quat::from_rotation_x(RING_TILT)),
        );
    }

    for m in 0..spec.moons {
        let moon_radius = rng.range(1.0, 3.0);
        let orbit_radius = spec.radius * (2.0 + m as f32 * 0.5);
        let tilt = rng.next_f32() * PI;
        let angular_speed = rng.range(0.1, 0.6);

        let pivot = epoch.spawn_group("moon-pivot", |n| n.with_parent(group));
        epoch.spawn_mesh(
            "moon",
            sphere(moon_radius, 16),
            MaterialDesc::new(ShaderProgram::Standard).with_color(hex(MOON_COLOR)),
            |n| n.with_parent(pivot).with_position(Vec3::new(orbit_radius, 0.0, 0.0)),
        );
        epoch.add_orbit(OrbitingBody {
            pivot,
            parent: group,
            orbit_radius,
            angular_speed,
            tilt,
            angle: 0.0,
        });
    }
}

fn build_flat(epoch: &mut Epoch, spec: &PlanetSpec, group: NodeId) {
    let material = MaterialDesc::new(ShaderProgram::Standard)
        .with_color(hex(spec.color))
        .with_uniforms(
            Uniforms::new()
                .with_float("roughness", FLAT_ROUGHNESS)
                .with_float("metalness", FLAT_METALNESS),
        );
    epoch.spawn_mesh("planet-flat", sphere(spec.radius, 64), material, |n| n.with_parent(group));
}
