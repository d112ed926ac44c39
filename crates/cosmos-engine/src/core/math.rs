//! Small math helpers shared by the generators and the controller.

use std::f32::consts::TAU;

use glam::{Quat, Vec3};

use crate::systems::rng::Rng;

/// Linear interpolation: blend `a` toward `b` by factor `t`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn lerp_color(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [lerp(a[0], b[0], t), lerp(a[1], b[1], t), lerp(a[2], b[2], t)]
}

/// Point at `radius` on the sphere given azimuth `theta` and polar angle `phi`.
#[inline]
pub fn spherical(radius: f32, theta: f32, phi: f32) -> Vec3 {
    Vec3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.sin() * theta.sin(),
        radius * phi.cos(),
    )
}

/// Uniformly distributed point on a sphere of `radius`
/// (`theta ~ U[0, 2π)`, `phi = acos(2u − 1)`).
pub fn sample_sphere(rng: &mut Rng, radius: f32) -> Vec3 {
    let theta = rng.next_f32() * TAU;
    let phi = (2.0 * rng.next_f32() - 1.0).acos();
    spherical(radius, theta, phi)
}

/// Uniform point in the cube `[-half, half]^3`.
pub fn sample_cube(rng: &mut Rng, half: f32) -> Vec3 {
    Vec3::new(
        rng.symmetric(half),
        rng.symmetric(half),
        rng.symmetric(half),
    )
}

/// `0xRRGGBB` to linear-ish RGB in [0, 1].
pub const fn hex(rgb: u32) -> [f32; 3] {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
    ]
}

/// HSL (all components in [0, 1]) to RGB.
pub fn hsl(h: f32, s: f32, l: f32) -> [f32; 3] {
    if s <= 0.0 {
        return [l, l, l];
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let h = h.rem_euclid(1.0);
    [
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    ]
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Rotation turning an object's local +Z axis toward `target`.
/// Returns identity when `from` and `target` coincide.
pub fn face_toward(from: Vec3, target: Vec3) -> Quat {
    let dir = target - from;
    if dir.length_squared() < 1e-12 {
        return Quat::IDENTITY;
    }
    Quat::from_rotation_arc(Vec3::Z, dir.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_blends() {
        assert_eq!(lerp(0.0, 10.0, 0.2), 2.0);
        assert_eq!(lerp(5.0, 5.0, 0.7), 5.0);
    }

    #[test]
    fn sphere_samples_on_surface() {
        let mut rng = Rng::new(7);
        for _ in 0..100 {
            let p = sample_sphere(&mut rng, 300.0);
            assert!((p.length() - 300.0).abs() < 1e-2);
        }
    }

    #[test]
    fn hex_and_hsl() {
        assert_eq!(hex(0xff0000), [1.0, 0.0, 0.0]);
        let white = hsl(0.3, 0.5, 1.0);
        assert!(white.iter().all(|c| (c - 1.0).abs() < 1e-6));
        let red = hsl(0.0, 1.0, 0.5);
        assert!((red[0] - 1.0).abs() < 1e-6 && red[1].abs() < 1e-6);
    }

    #[test]
    fn face_toward_points_z_at_target() {
        let from = Vec3::new(100.0, 0.0, 0.0);
        let q = face_toward(from, Vec3::ZERO);
        let z = q * Vec3::Z;
        assert!((z - Vec3::NEG_X).length() < 1e-5);
    }
}
