//! Scene orchestrator: owns every subsystem and runs the frame loop.

use glam::Vec3;

use crate::api::config::{ConfigSnapshot, CosmosConfig};
use crate::api::error::{CosmosError, CosmosResult};
use crate::api::types::Telemetry;
use crate::assets::profiles::{QualityProfile, FALLBACK_DEVICE_PIXEL_RATIO};
use crate::assets::registry::PoiRegistry;
use crate::core::math::hex;
use crate::core::time::{FpsCounter, FrameClock};
use crate::input::controller::NavigationController;
use crate::input::queue::{InputChannel, InputEvent, InputSource, Subscription};
use crate::renderer::camera::PerspectiveCamera;
use crate::renderer::resources::ResourcePool;
use crate::renderer::traits::{DrawTiming, FrameData, Renderer, SurfaceDesc};
use crate::systems::morph_field::MorphField;
use crate::systems::motion::MotionEstimator;
use crate::systems::render::order_by_blend;
use crate::systems::universe::UniverseGenerator;

const CLEAR_COLOR: u32 = 0x010103;

/// Offset so the morph field does not share the universe's random sequence.
const MORPH_SEED_SALT: u64 = 0x6d6f_7270_6800;

pub struct SceneOrchestrator<R: Renderer> {
    config: CosmosConfig,
    renderer: R,
    surface: SurfaceDesc,
    camera: PerspectiveCamera,
    pool: ResourcePool,
    controller: NavigationController,
    motion: MotionEstimator,
    morph: MorphField,
    universe: UniverseGenerator,
    pois: PoiRegistry,
    resize: Option<Subscription>,
    clock: FrameClock,
    fps: FpsCounter,
    on_fps: Box<dyn FnMut(u32)>,
    snapshot: Option<ConfigSnapshot>,
    telemetry: Telemetry,
    last_timing: DrawTiming,
    disposed: bool,
}

impl<R: Renderer> SceneOrchestrator<R> {
    /// Create the renderer for `surface` and wire up every subsystem.
    ///
    /// Fails with `SurfaceCreationFailure` if the surface has no area or the
    /// renderer cannot be created; the engine never runs without output.
    /// Content is generated by the first `sync_configuration`.
    pub fn new(
        config: CosmosConfig,
        surface: SurfaceDesc,
        create_renderer: impl FnOnce(&SurfaceDesc) -> Option<R>,
        input: &dyn InputSource,
        on_fps: impl FnMut(u32) + 'static,
    ) -> CosmosResult<Self> {
        if !surface.is_renderable() {
            return Err(CosmosError::SurfaceCreationFailure(format!(
                "surface is {}x{}",
                surface.width, surface.height
            )));
        }
        let mut renderer = create_renderer(&surface).ok_or_else(|| {
            CosmosError::SurfaceCreationFailure("renderer could not be created".to_string())
        })?;
        renderer.set_pixel_ratio(surface.device_pixel_ratio.unwrap_or(FALLBACK_DEVICE_PIXEL_RATIO));
        renderer.resize(surface.width, surface.height);

        let mut camera =
            PerspectiveCamera::new(config.fov_deg, surface.aspect(), config.near, config.far);
        camera.position = Vec3::new(0.0, 0.0, config.initial_zoom);
        camera.look_at(Vec3::ZERO);

        let resize = match input.subscribe(InputChannel::Resize) {
            Ok(sub) => Some(sub),
            Err(e) => {
                log::warn!("resize events unavailable: {}", e);
                None
            }
        };

        let controller = NavigationController::new(input, &config);
        let mut motion = MotionEstimator::new();
        motion.set_reference(controller.rotation(), camera.position);

        let pool = ResourcePool::new();
        let morph_seed = config.seed ^ MORPH_SEED_SALT;
        let morph = MorphField::new(&pool, morph_seed, config.morph_particle_count);
        let universe = UniverseGenerator::new(&pool, config.seed);

        log::info!(
            "cosmos orchestrator ready: backend {}, {}x{}",
            renderer.backend(),
            surface.width,
            surface.height
        );

        Ok(Self {
            clock: FrameClock::new(config.max_frame_dt),
            fps: FpsCounter::new(config.fps_window),
            config,
            renderer,
            surface,
            camera,
            pool,
            controller,
            motion,
            morph,
            universe,
            pois: PoiRegistry::builtin(),
            resize,
            on_fps: Box::new(on_fps),
            snapshot: None,
            telemetry: Telemetry::default(),
            last_timing: DrawTiming::default(),
            disposed: false,
        })
    }

    /// Replace the point-of-interest registry.
    pub fn with_pois(mut self, pois: PoiRegistry) -> Self {
        self.pois = pois;
        self
    }

    /// Apply a configuration snapshot, diffing against the previous one.
    pub fn sync_configuration(&mut self, snapshot: ConfigSnapshot) {
        if self.disposed {
            return;
        }
        let prev = self.snapshot.take();

        if snapshot.needs_rebuild(prev.as_ref()) {
            self.universe.generate(snapshot.quality, &snapshot.toggles);
            let profile = QualityProfile::for_level(snapshot.quality);
            self.renderer
                .set_pixel_ratio(profile.pixel_ratio(self.surface.device_pixel_ratio));
        }

        if prev.as_ref().map(|p| p.navigation_mode) != Some(snapshot.navigation_mode) {
            self.controller.set_mode(snapshot.navigation_mode);
        }

        if prev.as_ref().map(|p| p.current_poi.as_str()) != Some(snapshot.current_poi.as_str()) {
            match self.pois.find(&snapshot.current_poi) {
                Some(poi) => {
                    log::debug!("jump to {} at {}", poi.name, poi.position);
                    self.controller.reset(poi.position);
                }
                None => log::warn!("unknown point of interest '{}'", snapshot.current_poi),
            }
        }

        self.morph.set_visible(snapshot.toggles.sensors_enabled);
        self.universe
            .set_constellations_visible(snapshot.toggles.constellations);
        self.snapshot = Some(snapshot);
    }

    /// Run one frame. `raw_dt` is the wall time since the previous call.
    pub fn update(&mut self, raw_dt: f32) -> Telemetry {
        if self.disposed {
            return self.telemetry;
        }
        let dt = self.clock.advance(raw_dt);

        let resizes: Vec<InputEvent> = self.resize.as_ref().map(|s| s.drain()).unwrap_or_default();
        for event in resizes {
            if let InputEvent::Resize { width, height } = event {
                self.resize(width, height);
            }
        }

        self.controller.update(dt, &self.camera);

        let velocity = self.controller.velocity();
        let signal = self
            .motion
            .update(dt, velocity, self.controller.rotation(), self.camera.position);
        self.telemetry.energy = signal.energy;
        self.telemetry.impulse = signal.impulse;

        let (sensors, events) = self
            .snapshot
            .as_ref()
            .map_or((false, false), |s| (s.toggles.sensors_enabled, s.toggles.events));

        if sensors {
            self.morph.update(dt, signal, self.camera.position);
        }

        self.universe
            .update(dt, velocity, self.camera.position, signal.energy, events);
        self.universe.set_offset(self.controller.world_offset());

        let (pitch, yaw) = self.controller.rotation();
        self.camera.position =
            PerspectiveCamera::orbit_position(pitch, yaw, self.controller.zoom());
        self.camera.look_at(Vec3::ZERO);

        self.last_timing = self.render();

        if let Some(fps) = self.fps.tick(self.clock.real_time()) {
            self.telemetry.fps = fps;
            (self.on_fps)(fps);
        }
        self.telemetry
    }

    fn render(&mut self) -> DrawTiming {
        let mut draws = Vec::new();
        self.universe.collect_draws(&mut draws);
        self.morph.collect_draws(&mut draws);
        order_by_blend(&mut draws);

        let frame = FrameData {
            camera: self.camera.uniform(),
            clear_color: hex(CLEAR_COLOR),
            time: self.clock.elapsed(),
            draws,
            released: self.pool.drain_released(),
        };
        self.renderer.draw(&frame)
    }

    /// Output surface changed size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("ignoring resize to {}x{}", width, height);
            return;
        }
        self.surface.width = width;
        self.surface.height = height;
        self.camera.set_viewport(width, height);
        self.renderer.resize(width, height);
        log::debug!("resized to {}x{}", width, height);
    }

    /// Subscribe to orientation input once the host has been granted access.
    pub fn enable_orientation(&mut self, source: &dyn InputSource) -> CosmosResult<()> {
        self.controller.enable_orientation(source)
    }

    /// Release input subscriptions, all generated content and the renderer.
    /// Ids freed here reach the renderer through `Renderer::release` before
    /// it is disposed. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.controller.dispose();
        self.resize = None;
        self.universe.clear();
        self.morph.clear();
        let released = self.pool.drain_released();
        if !released.is_empty() {
            self.renderer.release(&released);
        }
        self.renderer.dispose();
        self.disposed = true;
        log::info!("cosmos orchestrator disposed");
    }

    // -- Accessors --

    pub fn telemetry(&self) -> Telemetry {
        self.telemetry
    }

    pub fn config(&self) -> &CosmosConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Option<&ConfigSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn controller(&self) -> &NavigationController {
        &self.controller
    }

    /// Direct access for hosts that deliver input without a hub.
    pub fn controller_mut(&mut self) -> &mut NavigationController {
        &mut self.controller
    }

    pub fn universe(&self) -> &UniverseGenerator {
        &self.universe
    }

    pub fn morph_field(&self) -> &MorphField {
        &self.morph
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn resources(&self) -> &ResourcePool {
        &self.pool
    }

    pub fn pois(&self) -> &PoiRegistry {
        &self.pois
    }

    pub fn last_timing(&self) -> DrawTiming {
        self.last_timing
    }

    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl<R: Renderer> Drop for SceneOrchestrator<R> {
    fn drop(&mut self) {
        self.dispose();
    }
}
