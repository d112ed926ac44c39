//! Motion fusion: navigation activity to a bounded energy/impulse signal.

use glam::Vec3;

use crate::api::types::MotionSignal;
use crate::core::math::lerp;

const VELOCITY_WEIGHT: f32 = 2.0;
const ROTATION_WEIGHT: f32 = 5.0;
const POSITION_WEIGHT: f32 = 0.1;

const ATTACK_BLEND: f32 = 0.2;
const RELEASE_BLEND: f32 = 0.05;

/// Rise in one sample that counts as a sudden change.
const IMPULSE_RISE: f32 = 0.3;
const IMPULSE_ATTACK_BLEND: f32 = 0.5;
const IMPULSE_RELEASE_BLEND: f32 = 0.1;

/// Fast-attack, slow-release envelope over navigation activity.
#[derive(Debug, Clone, Default)]
pub struct MotionEstimator {
    energy: f32,
    impulse: f32,
    last_rotation: (f32, f32),
    last_position: Vec3,
}

impl MotionEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one frame of controller output into the signal.
    /// `rotation` is the smoothed (pitch, yaw); `camera_position` is world space.
    pub fn update(
        &mut self,
        _dt: f32,
        velocity: f32,
        rotation: (f32, f32),
        camera_position: Vec3,
    ) -> MotionSignal {
        let rot_delta = (rotation.0 - self.last_rotation.0).abs()
            + (rotation.1 - self.last_rotation.1).abs();
        let pos_delta = camera_position.distance(self.last_position);

        let raw = velocity * VELOCITY_WEIGHT
            + rot_delta * ROTATION_WEIGHT
            + pos_delta * POSITION_WEIGHT;
        // NaN from a degenerate input collapses to rest rather than poisoning the envelope.
        let target = if raw.is_finite() { raw.clamp(0.0, 1.0) } else { 0.0 };

        let rise = target - self.energy;
        self.impulse = if rise > IMPULSE_RISE {
            lerp(self.impulse, 1.0, IMPULSE_ATTACK_BLEND)
        } else {
            lerp(self.impulse, 0.0, IMPULSE_RELEASE_BLEND)
        };

        let blend = if rise > 0.0 { ATTACK_BLEND } else { RELEASE_BLEND };
        self.energy = lerp(self.energy, target, blend).clamp(0.0, 1.0);
        self.impulse = self.impulse.clamp(0.0, 1.0);

        self.last_rotation = rotation;
        self.last_position = camera_position;
        self.signal()
    }

    /// Set the reference pose the next sample is measured against,
    /// so a camera that starts away from the origin does not read as motion.
    pub fn set_reference(&mut self, rotation: (f32, f32), camera_position: Vec3) {
        self.last_rotation = rotation;
        self.last_position = camera_position;
    }

    pub fn signal(&self) -> MotionSignal {
        MotionSignal {
            energy: self.energy,
            impulse: self.impulse,
        }
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    pub fn impulse(&self) -> f32 {
        self.impulse
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::rng::Rng;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn rest_stays_at_zero() {
        let mut m = MotionEstimator::new();
        for _ in 0..10 {
            m.update(DT, 0.0, (0.0, 0.0), Vec3::ZERO);
        }
        assert_eq!(m.energy(), 0.0);
        assert_eq!(m.impulse(), 0.0);
    }

    #[test]
    fn sudden_activity_fires_impulse() {
        let mut m = MotionEstimator::new();
        m.update(DT, 0.0, (0.0, 0.0), Vec3::ZERO);
        let s = m.update(DT, 1.0, (0.0, 0.0), Vec3::ZERO);
        // raw clamps to 1.0; energy attacks at 0.2, impulse at 0.5
        assert!((s.energy - 0.2).abs() < 1e-6);
        assert!((s.impulse - 0.5).abs() < 1e-6);
    }

    #[test]
    fn release_is_monotone() {
        let mut m = MotionEstimator::new();
        for _ in 0..30 {
            m.update(DT, 1.0, (0.0, 0.0), Vec3::ZERO);
        }
        let mut last = m.energy();
        assert!(last > 0.9);
        for _ in 0..300 {
            let s = m.update(DT, 0.0, (0.0, 0.0), Vec3::ZERO);
            assert!(s.energy <= last);
            last = s.energy;
        }
        assert!(last < 0.01);
    }

    #[test]
    fn rotation_and_travel_contribute() {
        let mut m = MotionEstimator::new();
        m.update(DT, 0.0, (0.0, 0.0), Vec3::ZERO);
        // 0.02 rad of rotation → raw 0.1
        let s = m.update(DT, 0.0, (0.01, -0.01), Vec3::ZERO);
        assert!((s.energy - 0.1 * 0.2).abs() < 1e-6);

        let mut m = MotionEstimator::new();
        // first sample measures distance from the origin: 3 units → raw 0.3
        let s = m.update(DT, 0.0, (0.0, 0.0), Vec3::new(0.0, 0.0, 3.0));
        assert!((s.energy - 0.3 * 0.2).abs() < 1e-6);
    }

    #[test]
    fn reference_pose_suppresses_startup_spike() {
        let mut m = MotionEstimator::new();
        let start = Vec3::new(0.0, 0.0, 100.0);
        m.set_reference((0.0, 0.0), start);
        let s = m.update(DT, 0.0, (0.0, 0.0), start);
        assert_eq!(s.energy, 0.0);
    }

    #[test]
    fn signal_stays_bounded_for_any_input() {
        let mut m = MotionEstimator::new();
        let mut rng = Rng::new(99);
        for _ in 0..2000 {
            let velocity = rng.range(-5.0, 50.0);
            let rotation = (rng.symmetric(10.0), rng.symmetric(10.0));
            let position = Vec3::new(rng.symmetric(1e4), rng.symmetric(1e4), rng.symmetric(1e4));
            let s = m.update(DT, velocity, rotation, position);
            assert!((0.0..=1.0).contains(&s.energy), "energy = {}", s.energy);
            assert!((0.0..=1.0).contains(&s.impulse), "impulse = {}", s.impulse);
        }
        let s = m.update(DT, f32::NAN, (0.0, 0.0), Vec3::ZERO);
        assert!((0.0..=1.0).contains(&s.energy));
    }
}
