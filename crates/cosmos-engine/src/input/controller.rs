//! Navigation controller: raw input to smoothed camera state.
//!
//! Event handlers only ever write the *target* fields (and velocity); the
//! per-frame `update` eases the smoothed fields toward those targets.

use glam::{Vec2, Vec3};

use crate::api::config::{CosmosConfig, WarpStepping};
use crate::api::error::CosmosResult;
use crate::api::types::NavigationMode;
use crate::core::math::lerp;
use crate::input::queue::{InputChannel, InputEvent, InputSource, Subscription};
use crate::renderer::camera::PerspectiveCamera;

const EXPLORE_DRAG_SCALE: f32 = 0.005;
const WARP_DRAG_SCALE: f32 = 0.002;
const DRAG_VELOCITY_SCALE: f32 = 0.01;
const DRAG_VELOCITY_BLEND: f32 = 0.2;

const ZOOM_WHEEL_SCALE: f32 = 0.05;
const MIN_ZOOM: f32 = 20.0;
const MAX_ZOOM: f32 = 2000.0;
const THROTTLE_SCALE: f32 = 0.005;
const THROTTLE_BLEND: f32 = 0.2;

/// Neutral front-to-back tilt of a phone held in the hand, in degrees.
const TILT_REST_BETA: f32 = 45.0;
const TILT_SCALE: f32 = 0.2;
const TILT_ROTATION_SCALE: f32 = 0.005;
const TILT_VELOCITY_SCALE: f32 = 0.5;
const TILT_VELOCITY_BLEND: f32 = 0.1;

const EASE_BLEND: f32 = 0.1;
const WARP_MIN_VELOCITY: f32 = 0.01;
const WARP_DEPTH_SCALE: f32 = 0.5;
const VELOCITY_DECAY_BLEND: f32 = 0.03;

/// Reference frame rate for time-scaled warp stepping.
const REFERENCE_FPS: f32 = 60.0;

pub struct NavigationController {
    pitch: f32,
    yaw: f32,
    target_pitch: f32,
    target_yaw: f32,
    zoom: f32,
    target_zoom: f32,
    velocity: f32,
    world_offset: Vec3,
    mode: NavigationMode,
    stepping: WarpStepping,
    pointer_down: bool,
    last_pointer: Vec2,
    subscriptions: Vec<Subscription>,
    disposed: bool,
}

impl NavigationController {
    /// Subscribe to pointer, wheel and orientation input on `source`.
    /// A refused channel is logged and skipped; the controller still works
    /// with whatever it was granted.
    pub fn new(source: &dyn InputSource, config: &CosmosConfig) -> Self {
        let mut subscriptions = Vec::with_capacity(3);
        for channel in [
            InputChannel::Pointer,
            InputChannel::Wheel,
            InputChannel::Orientation,
        ] {
            match source.subscribe(channel) {
                Ok(sub) => subscriptions.push(sub),
                Err(e) => log::warn!("navigation input disabled: {}", e),
            }
        }

        Self {
            pitch: 0.0,
            yaw: 0.0,
            target_pitch: 0.0,
            target_yaw: 0.0,
            zoom: config.initial_zoom,
            target_zoom: config.initial_zoom,
            velocity: 0.0,
            world_offset: Vec3::ZERO,
            mode: NavigationMode::default(),
            stepping: config.warp_stepping,
            pointer_down: false,
            last_pointer: Vec2::ZERO,
            subscriptions,
            disposed: false,
        }
    }

    // -- Accessors --

    /// Smoothed rotation as (pitch, yaw), radians.
    pub fn rotation(&self) -> (f32, f32) {
        (self.pitch, self.yaw)
    }

    pub fn target_rotation(&self) -> (f32, f32) {
        (self.target_pitch, self.target_yaw)
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn target_zoom(&self) -> f32 {
        self.target_zoom
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Accumulated warp travel.
    pub fn world_offset(&self) -> Vec3 {
        self.world_offset
    }

    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Whether orientation input is currently granted.
    pub fn has_orientation(&self) -> bool {
        self.subscriptions
            .iter()
            .any(|s| s.channel() == InputChannel::Orientation && s.is_active())
    }

    // -- Commands --

    /// Route future input differently. Smoothed state is left alone.
    pub fn set_mode(&mut self, mode: NavigationMode) {
        if self.mode != mode {
            log::debug!("navigation mode {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
    }

    /// Subscribe to orientation input after a late permission grant.
    /// A no-op if tilt input is already live or the controller is disposed.
    pub fn enable_orientation(&mut self, source: &dyn InputSource) -> CosmosResult<()> {
        if self.disposed || self.has_orientation() {
            return Ok(());
        }
        self.drop_revoked();
        let sub = source.subscribe(InputChannel::Orientation)?;
        self.subscriptions.push(sub);
        log::info!("orientation input enabled");
        Ok(())
    }

    fn drop_revoked(&mut self) {
        let before = self.subscriptions.len();
        self.subscriptions
            .retain(|s| s.channel() != InputChannel::Orientation || s.is_active());
        if self.subscriptions.len() != before {
            log::info!("orientation input revoked");
        }
    }

    /// Aim at a point of interest: level the view, zoom to its distance and
    /// cancel warp travel.
    pub fn reset(&mut self, target: Vec3) {
        self.target_pitch = 0.0;
        self.target_yaw = 0.0;
        self.target_zoom = target.length();
        self.world_offset = Vec3::ZERO;
    }

    /// Apply one raw event to the target state.
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown { x, y } => {
                self.pointer_down = true;
                self.last_pointer = Vec2::new(x, y);
            }
            InputEvent::PointerMove { x, y } => {
                if !self.pointer_down {
                    return;
                }
                let pos = Vec2::new(x, y);
                self.drag(pos - self.last_pointer);
                self.last_pointer = pos;
            }
            InputEvent::PointerUp => self.pointer_down = false,
            InputEvent::Wheel { delta_y } => self.wheel(delta_y),
            InputEvent::Orientation(sample) => match sample.angles() {
                Ok((beta, gamma)) => self.tilt(beta, gamma),
                Err(e) => log::trace!("dropped orientation sample: {}", e),
            },
            InputEvent::Resize { .. } => {}
        }
    }

    fn drag(&mut self, delta: Vec2) {
        let scale = match self.mode {
            NavigationMode::Explore => EXPLORE_DRAG_SCALE,
            NavigationMode::Warp => WARP_DRAG_SCALE,
        };
        self.target_yaw += delta.x * scale;
        self.target_pitch += delta.y * scale;

        let speed = delta.length();
        self.velocity = lerp(self.velocity, speed * DRAG_VELOCITY_SCALE, DRAG_VELOCITY_BLEND);
    }

    fn wheel(&mut self, delta_y: f32) {
        match self.mode {
            NavigationMode::Explore => {
                self.target_zoom =
                    (self.target_zoom + delta_y * ZOOM_WHEEL_SCALE).clamp(MIN_ZOOM, MAX_ZOOM);
            }
            NavigationMode::Warp => {
                self.velocity =
                    lerp(self.velocity, delta_y.abs() * THROTTLE_SCALE, THROTTLE_BLEND);
            }
        }
    }

    fn tilt(&mut self, beta: f32, gamma: f32) {
        let tilt_x = (beta - TILT_REST_BETA).to_radians() * TILT_SCALE;
        let tilt_y = gamma.to_radians() * TILT_SCALE;
        self.target_pitch += tilt_x * TILT_ROTATION_SCALE;
        self.target_yaw += tilt_y * TILT_ROTATION_SCALE;
        self.velocity = lerp(
            self.velocity,
            (tilt_x.abs() + tilt_y.abs()) * TILT_VELOCITY_SCALE,
            TILT_VELOCITY_BLEND,
        );
    }

    /// Per-frame step: consume pending input, ease toward targets, advance
    /// warp travel along the camera's view axis, then bleed off velocity.
    pub fn update(&mut self, dt: f32, camera: &PerspectiveCamera) {
        self.drop_revoked();
        let pending: Vec<InputEvent> = self.subscriptions.iter().flat_map(|s| s.drain()).collect();
        for event in pending {
            self.handle_event(event);
        }

        self.pitch = lerp(self.pitch, self.target_pitch, EASE_BLEND);
        self.yaw = lerp(self.yaw, self.target_yaw, EASE_BLEND);
        self.zoom = lerp(self.zoom, self.target_zoom, EASE_BLEND);

        if self.mode == NavigationMode::Warp && self.velocity > WARP_MIN_VELOCITY {
            let mut step = self.velocity * self.zoom * WARP_DEPTH_SCALE;
            if self.stepping == WarpStepping::TimeScaled {
                step *= dt * REFERENCE_FPS;
            }
            self.world_offset += camera.forward() * step;
        }

        self.velocity = lerp(self.velocity, 0.0, VELOCITY_DECAY_BLEND);
    }

    /// Release every input subscription. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.subscriptions.clear();
        self.pointer_down = false;
        self.disposed = true;
    }
}

impl Drop for NavigationController {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::queue::{InputHub, OrientationSample};

    fn controller() -> (InputHub, NavigationController) {
        let hub = InputHub::new();
        let ctrl = NavigationController::new(&hub, &CosmosConfig::default());
        (hub, ctrl)
    }

    fn camera_at_rest() -> PerspectiveCamera {
        let mut cam = PerspectiveCamera::new(70.0, 1.0, 0.1, 10000.0);
        cam.position = Vec3::new(0.0, 0.0, 100.0);
        cam.look_at(Vec3::ZERO);
        cam
    }

    #[test]
    fn explore_drag_turns_target_yaw() {
        let (_hub, mut ctrl) = controller();
        ctrl.handle_event(InputEvent::PointerDown { x: 0.0, y: 0.0 });
        ctrl.handle_event(InputEvent::PointerMove { x: 100.0, y: 0.0 });
        let (pitch, yaw) = ctrl.target_rotation();
        assert!((yaw - 0.5).abs() < 1e-6);
        assert_eq!(pitch, 0.0);
        // velocity eases toward 1.0 at blend 0.2
        assert!((ctrl.velocity() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn move_without_press_is_ignored() {
        let (_hub, mut ctrl) = controller();
        ctrl.handle_event(InputEvent::PointerMove { x: 50.0, y: 50.0 });
        assert_eq!(ctrl.target_rotation(), (0.0, 0.0));
        assert_eq!(ctrl.velocity(), 0.0);
    }

    #[test]
    fn warp_drag_is_less_sensitive() {
        let (_hub, mut ctrl) = controller();
        ctrl.set_mode(NavigationMode::Warp);
        ctrl.handle_event(InputEvent::PointerDown { x: 0.0, y: 0.0 });
        ctrl.handle_event(InputEvent::PointerMove { x: 0.0, y: 100.0 });
        let (pitch, _) = ctrl.target_rotation();
        assert!((pitch - 0.2).abs() < 1e-6);
    }

    #[test]
    fn wheel_zoom_is_clamped() {
        let (_hub, mut ctrl) = controller();
        ctrl.handle_event(InputEvent::Wheel { delta_y: 100.0 });
        assert!((ctrl.target_zoom() - 105.0).abs() < 1e-4);
        ctrl.handle_event(InputEvent::Wheel { delta_y: -100_000.0 });
        assert_eq!(ctrl.target_zoom(), 20.0);
        ctrl.handle_event(InputEvent::Wheel { delta_y: 100_000.0 });
        assert_eq!(ctrl.target_zoom(), 2000.0);
    }

    #[test]
    fn warp_wheel_is_throttle() {
        let (_hub, mut ctrl) = controller();
        ctrl.set_mode(NavigationMode::Warp);
        ctrl.handle_event(InputEvent::Wheel { delta_y: -200.0 });
        assert_eq!(ctrl.target_zoom(), 100.0);
        // |−200| × 0.005 = 1.0, blended at 0.2
        assert!((ctrl.velocity() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn tilt_nudges_rotation() {
        let (_hub, mut ctrl) = controller();
        ctrl.handle_event(InputEvent::Orientation(OrientationSample::new(
            Some(55.0),
            Some(10.0),
        )));
        let (pitch, yaw) = ctrl.target_rotation();
        let expected = 10f32.to_radians() * 0.2 * 0.005;
        assert!((pitch - expected).abs() < 1e-7);
        assert!((yaw - expected).abs() < 1e-7);
        assert!(ctrl.velocity() > 0.0);
    }

    #[test]
    fn partial_orientation_sample_dropped() {
        let (_hub, mut ctrl) = controller();
        ctrl.handle_event(InputEvent::Orientation(OrientationSample::new(None, Some(20.0))));
        assert_eq!(ctrl.target_rotation(), (0.0, 0.0));
        assert_eq!(ctrl.velocity(), 0.0);
    }

    #[test]
    fn update_eases_toward_targets() {
        let (_hub, mut ctrl) = controller();
        let cam = camera_at_rest();
        ctrl.handle_event(InputEvent::PointerDown { x: 0.0, y: 0.0 });
        ctrl.handle_event(InputEvent::PointerMove { x: 100.0, y: 0.0 });
        ctrl.update(1.0 / 60.0, &cam);
        let (_, yaw) = ctrl.rotation();
        assert!((yaw - 0.05).abs() < 1e-6);
        // decayed after the step
        assert!((ctrl.velocity() - 0.2 * 0.97).abs() < 1e-6);
    }

    #[test]
    fn update_pumps_hub_events() {
        let (hub, mut ctrl) = controller();
        let cam = camera_at_rest();
        hub.push(InputEvent::Wheel { delta_y: 200.0 });
        ctrl.update(1.0 / 60.0, &cam);
        assert!((ctrl.target_zoom() - 110.0).abs() < 1e-4);
    }

    #[test]
    fn reset_targets_poi_distance() {
        let (_hub, mut ctrl) = controller();
        let cam = camera_at_rest();
        ctrl.set_mode(NavigationMode::Warp);
        ctrl.handle_event(InputEvent::Wheel { delta_y: 400.0 });
        ctrl.update(1.0 / 60.0, &cam);
        assert!(ctrl.world_offset().length() > 0.0);

        let distance = 17300f32.sqrt();
        ctrl.reset(Vec3::new(-80.0, -30.0, -100.0));
        assert!((ctrl.target_zoom() - distance).abs() < 1e-3);
        assert_eq!(ctrl.world_offset(), Vec3::ZERO);
        assert_eq!(ctrl.target_rotation(), (0.0, 0.0));

        // Smoothed zoom moves toward the new target without jumping.
        let before = ctrl.zoom();
        ctrl.update(1.0 / 60.0, &cam);
        let after = ctrl.zoom();
        assert!(after > before && after < distance);
        assert!((after - (before + (distance - before) * 0.1)).abs() < 1e-3);
    }

    #[test]
    fn warp_advances_along_view_axis() {
        let (_hub, mut ctrl) = controller();
        let cam = camera_at_rest();
        ctrl.set_mode(NavigationMode::Warp);
        ctrl.handle_event(InputEvent::Wheel { delta_y: 200.0 });
        ctrl.update(1.0 / 60.0, &cam);
        let offset = ctrl.world_offset();
        // camera looks down -Z; step = 0.2 × 100 × 0.5
        assert!((offset - Vec3::new(0.0, 0.0, -10.0)).length() < 1e-3, "offset = {offset}");
    }

    #[test]
    fn explore_never_travels() {
        let (_hub, mut ctrl) = controller();
        let cam = camera_at_rest();
        ctrl.handle_event(InputEvent::PointerDown { x: 0.0, y: 0.0 });
        ctrl.handle_event(InputEvent::PointerMove { x: 300.0, y: 0.0 });
        ctrl.update(1.0 / 60.0, &cam);
        assert_eq!(ctrl.world_offset(), Vec3::ZERO);
    }

    #[test]
    fn time_scaled_warp_depends_on_dt() {
        let hub = InputHub::new();
        let config = CosmosConfig {
            warp_stepping: WarpStepping::TimeScaled,
            ..CosmosConfig::default()
        };
        let mut ctrl = NavigationController::new(&hub, &config);
        let cam = camera_at_rest();
        ctrl.set_mode(NavigationMode::Warp);
        ctrl.handle_event(InputEvent::Wheel { delta_y: 200.0 });
        ctrl.update(1.0 / 30.0, &cam);
        // twice the per-update step at 30 fps
        assert!((ctrl.world_offset().z + 20.0).abs() < 1e-3);
    }

    #[test]
    fn mode_switch_keeps_smoothed_state() {
        let (_hub, mut ctrl) = controller();
        let cam = camera_at_rest();
        ctrl.handle_event(InputEvent::PointerDown { x: 0.0, y: 0.0 });
        ctrl.handle_event(InputEvent::PointerMove { x: 80.0, y: 40.0 });
        ctrl.update(1.0 / 60.0, &cam);
        let rotation = ctrl.rotation();
        let zoom = ctrl.zoom();
        let velocity = ctrl.velocity();
        ctrl.set_mode(NavigationMode::Warp);
        assert_eq!(ctrl.rotation(), rotation);
        assert_eq!(ctrl.zoom(), zoom);
        assert_eq!(ctrl.velocity(), velocity);
    }

    #[test]
    fn velocity_decays_without_input() {
        let (_hub, mut ctrl) = controller();
        let cam = camera_at_rest();
        ctrl.handle_event(InputEvent::PointerDown { x: 0.0, y: 0.0 });
        ctrl.handle_event(InputEvent::PointerMove { x: 200.0, y: 0.0 });
        let mut last = ctrl.velocity();
        for _ in 0..200 {
            ctrl.update(1.0 / 60.0, &cam);
            assert!(ctrl.velocity() <= last);
            last = ctrl.velocity();
        }
        assert!(last < 0.01);
    }

    #[test]
    fn dispose_releases_subscriptions_once() {
        let (hub, mut ctrl) = controller();
        assert_eq!(hub.subscriber_count(), 3);
        ctrl.dispose();
        assert_eq!(hub.subscriber_count(), 0);
        assert!(ctrl.is_disposed());
        ctrl.dispose();
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn refused_orientation_is_not_fatal() {
        let hub = InputHub::new();
        hub.set_orientation_permitted(false);
        let mut ctrl = NavigationController::new(&hub, &CosmosConfig::default());
        assert!(!ctrl.has_orientation());
        assert_eq!(hub.subscriber_count(), 2);
        hub.push(InputEvent::Orientation(OrientationSample::new(Some(90.0), Some(30.0))));
        ctrl.update(1.0 / 60.0, &camera_at_rest());
        assert_eq!(ctrl.velocity(), 0.0);
    }

    #[test]
    fn revoked_orientation_stops_tilt() {
        let (hub, mut ctrl) = controller();
        assert!(ctrl.has_orientation());
        hub.push(InputEvent::Orientation(OrientationSample::new(Some(90.0), Some(30.0))));
        hub.set_orientation_permitted(false);
        assert!(!ctrl.has_orientation());
        hub.push(InputEvent::Orientation(OrientationSample::new(Some(90.0), Some(30.0))));
        ctrl.update(1.0 / 60.0, &camera_at_rest());
        assert_eq!(ctrl.target_rotation(), (0.0, 0.0));
        assert_eq!(ctrl.velocity(), 0.0);
        assert_eq!(hub.subscriber_count(), 2);
    }

    #[test]
    fn late_grant_enables_tilt() {
        let hub = InputHub::new();
        hub.set_orientation_permitted(false);
        let mut ctrl = NavigationController::new(&hub, &CosmosConfig::default());
        assert!(ctrl.enable_orientation(&hub).is_err());
        assert!(!ctrl.has_orientation());

        hub.set_orientation_permitted(true);
        ctrl.enable_orientation(&hub).unwrap();
        ctrl.enable_orientation(&hub).unwrap();
        assert!(ctrl.has_orientation());
        assert_eq!(hub.subscriber_count_for(InputChannel::Orientation), 1);

        hub.push(InputEvent::Orientation(OrientationSample::new(Some(55.0), Some(10.0))));
        ctrl.update(1.0 / 60.0, &camera_at_rest());
        let (pitch, yaw) = ctrl.target_rotation();
        assert!(pitch > 0.0 && yaw > 0.0);
    }
}
