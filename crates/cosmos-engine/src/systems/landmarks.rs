//! Fixed landmarks: the ether shell, the sun, the black hole, the portal and
//! the Milky Way band.

use std::f32::consts::FRAC_PI_4;

use glam::{Quat, Vec3};

use crate::api::types::NodeId;
use crate::assets::profiles::QualityProfile;
use crate::components::mesh::{GeometryKind, MaterialDesc, ShaderProgram, Side, Uniforms};
use crate::core::math::face_toward;
use crate::systems::epoch::{AnimatedParams, Epoch};

pub const ETHER_RADIUS: f32 = 2000.0;

pub const SUN_POSITION: Vec3 = Vec3::new(1000.0, 500.0, -1000.0);
const SUN_SIZE: f32 = 300.0;

pub const BLACK_HOLE_POSITION: Vec3 = Vec3::new(-80.0, -30.0, -100.0);
const BLACK_HOLE_SIZE: f32 = 120.0;

pub const PORTAL_POSITION: Vec3 = Vec3::new(0.0, -60.0, -200.0);
const PORTAL_SIZE: f32 = 100.0;

const MILKY_WAY_RADIUS: f32 = 800.0;
const MILKY_WAY_TUBE: f32 = 300.0;

/// Global light direction, from the origin toward the sun.
pub fn sun_direction() -> Vec3 {
    SUN_POSITION.normalize()
}

fn plane(size: f32) -> GeometryKind {
    GeometryKind::Plane {
        width: size,
        height: size,
    }
}

/// Back-faced enclosing sphere reacting to time and energy.
pub fn build_ether(epoch: &mut Epoch) -> NodeId {
    let material = MaterialDesc::new(ShaderProgram::Ether)
        .transparent()
        .with_side(Side::Back)
        .with_uniforms(Uniforms::new().with_float("time", 0.0).with_float("energy", 0.0));
    let id = epoch.spawn_mesh(
        "ether",
        GeometryKind::Sphere {
            radius: ETHER_RADIUS,
            segments: 32,
        },
        material,
        |n| n,
    );
    epoch.animate(id, AnimatedParams::TIME_ENERGY);
    id
}

/// Sun billboard. Initially faces the origin; re-aimed at the camera every frame.
pub fn build_sun(epoch: &mut Epoch) -> NodeId {
    let material =
        MaterialDesc::glow(ShaderProgram::Sun)
            .with_uniforms(Uniforms::new().with_float("time", 0.0));
    let id = epoch.spawn_mesh("sun", plane(SUN_SIZE), material, |n| {
        n.with_position(SUN_POSITION)
            .with_rotation(face_toward(SUN_POSITION, Vec3::ZERO))
    });
    epoch.animate(id, AnimatedParams::TIME);
    id
}

/// Black hole: a positioned container holding the lensing billboard.
pub fn build_black_hole(epoch: &mut Epoch, profile: &QualityProfile) -> NodeId {
    let container = epoch.spawn_group("black-hole", |n| n.with_position(BLACK_HOLE_POSITION));
    let material = MaterialDesc::new(ShaderProgram::BlackHole)
        .transparent()
        .with_side(Side::Double)
        .with_uniforms(
            Uniforms::new()
                .with_float("time", 0.0)
                .with_float("detail", profile.distortion_detail),
        );
    let disc = epoch.spawn_mesh("black-hole-disc", plane(BLACK_HOLE_SIZE), material, |n| {
        n.with_parent(container)
    });
    epoch.animate(disc, AnimatedParams::TIME);
    container
}

pub fn build_portal(epoch: &mut Epoch) -> NodeId {
    let material =
        MaterialDesc::glow(ShaderProgram::Portal)
            .with_uniforms(Uniforms::new().with_float("time", 0.0));
    let id = epoch.spawn_mesh("portal", plane(PORTAL_SIZE), material, |n| {
        n.with_position(PORTAL_POSITION)
    });
    epoch.animate(id, AnimatedParams::TIME);
    id
}

/// Tilted torus carrying the galactic band glow.
pub fn build_milky_way(epoch: &mut Epoch) -> NodeId {
    let material = MaterialDesc::glow(ShaderProgram::MilkyWay)
        .with_side(Side::Double)
        .with_uniforms(Uniforms::new().with_float("time", 0.0).with_float("energy", 0.0));
    let id = epoch.spawn_mesh(
        "milky-way",
        GeometryKind::Torus {
            radius: MILKY_WAY_RADIUS,
            tube: MILKY_WAY_TUBE,
            radial_segments: 32,
            tubular_segments: 100,
        },
        material,
        |n| n.with_rotation(Quat::from_rotation_x(FRAC_PI_4)),
    );
    epoch.animate(id, AnimatedParams::TIME_ENERGY);
    id
}
