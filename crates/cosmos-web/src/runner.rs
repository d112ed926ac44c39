use std::collections::HashSet;

use serde::Serialize;

use cosmos_engine::{
    ConfigSnapshot, CosmosConfig, CosmosResult, DrawRecord, DrawTiming, FrameBuffer, FrameData,
    GeometryKind, InputEvent, InputHub, MaterialDesc, Renderer, ResourceId, SceneOrchestrator,
    SurfaceDesc, Telemetry,
};

/// A resource the host has not seen yet. Serialized to JSON for the JS side.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "resource", rename_all = "lowercase")]
pub enum Upload {
    Geometry { id: u32, kind: GeometryKind },
    Material { id: u32, desc: MaterialDesc },
}

/// Renderer that flattens each frame into a `FrameBuffer` the host reads from
/// wasm memory. Geometry and material descriptions cross the boundary once,
/// as JSON, the first frame they are drawn.
pub struct BufferRenderer {
    buffer: FrameBuffer,
    known: HashSet<ResourceId>,
    uploads: Vec<Upload>,
    released: Vec<u32>,
    width: u32,
    height: u32,
    pixel_ratio: f32,
}

impl BufferRenderer {
    pub fn new(surface: &SurfaceDesc) -> Self {
        Self {
            buffer: FrameBuffer::new(),
            known: HashSet::new(),
            uploads: Vec::new(),
            released: Vec::new(),
            width: surface.width,
            height: surface.height,
            pixel_ratio: 1.0,
        }
    }

    /// Take the pending uploads as a JSON array.
    pub fn take_uploads_json(&mut self) -> String {
        let uploads = std::mem::take(&mut self.uploads);
        serde_json::to_string(&uploads).unwrap_or_else(|e| {
            log::error!("failed to encode uploads: {}", e);
            "[]".to_string()
        })
    }

    /// Take the ids released since the last call.
    pub fn take_released(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.released)
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    pub fn pending_uploads(&self) -> usize {
        self.uploads.len()
    }
}

impl Renderer for BufferRenderer {
    fn backend(&self) -> &'static str {
        "buffer"
    }

    fn draw(&mut self, frame: &FrameData) -> DrawTiming {
        self.release(&frame.released);

        self.buffer.begin(&frame.camera, frame.time, frame.clear_color);
        for item in &frame.draws {
            let geometry = item.geometry.id();
            if self.known.insert(geometry) {
                self.uploads.push(Upload::Geometry {
                    id: geometry.0,
                    kind: item.geometry.kind.clone(),
                });
            }
            let material = item.material.id();
            if self.known.insert(material) {
                self.uploads.push(Upload::Material {
                    id: material.0,
                    desc: item.material.desc.clone(),
                });
            }
            self.buffer.push(DrawRecord::from_item(item));
        }
        self.buffer.finish();
        DrawTiming::default()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio;
    }

    fn release(&mut self, ids: &[ResourceId]) {
        for id in ids {
            self.known.remove(id);
            self.released.push(id.0);
        }
    }

    fn dispose(&mut self) {
        self.known.clear();
        self.uploads.clear();
        log::debug!("buffer renderer disposed");
    }
}

/// Wires the engine to the browser: owns the input hub and the orchestrator.
///
/// The wasm exports keep one of these in a `thread_local!`, because
/// wasm-bindgen cannot export generic structs directly.
pub struct CosmosRunner {
    hub: InputHub,
    orchestrator: SceneOrchestrator<BufferRenderer>,
    telemetry: Telemetry,
}

impl CosmosRunner {
    pub fn new(config: CosmosConfig, surface: SurfaceDesc) -> CosmosResult<Self> {
        let hub = InputHub::new();
        let orchestrator = SceneOrchestrator::new(
            config,
            surface,
            |s| Some(BufferRenderer::new(s)),
            &hub,
            |fps| log::debug!("fps {}", fps),
        )?;
        Ok(Self {
            hub,
            orchestrator,
            telemetry: Telemetry::default(),
        })
    }

    /// Push an input event to every subscriber.
    pub fn push_input(&self, event: InputEvent) {
        self.hub.push(event);
    }

    /// Apply the outcome of the host's permission prompt. A refusal stops
    /// tilt input at once; a grant subscribes the controller again.
    pub fn set_orientation_permitted(&mut self, permitted: bool) {
        self.hub.set_orientation_permitted(permitted);
        if permitted {
            if let Err(e) = self.orchestrator.enable_orientation(&self.hub) {
                log::warn!("orientation input unavailable: {}", e);
            }
        }
    }

    /// Parse and apply a configuration snapshot. Malformed JSON is logged and ignored.
    pub fn sync_config(&mut self, json: &str) {
        match ConfigSnapshot::from_json(json) {
            Ok(snapshot) => self.orchestrator.sync_configuration(snapshot),
            Err(e) => log::warn!("ignoring malformed configuration: {}", e),
        }
    }

    /// Run one frame.
    pub fn tick(&mut self, dt: f32) {
        self.telemetry = self.orchestrator.update(dt);
    }

    /// Tear down the engine. Returns every id the host still has to free.
    pub fn dispose(&mut self) -> Vec<u32> {
        self.orchestrator.dispose();
        self.take_released()
    }

    // ---- Accessors read by the JS host ----

    pub fn telemetry(&self) -> Telemetry {
        self.telemetry
    }

    pub fn frame_ptr(&self) -> *const f32 {
        self.orchestrator.renderer().buffer().as_ptr()
    }

    pub fn frame_len(&self) -> u32 {
        self.orchestrator.renderer().buffer().len() as u32
    }

    pub fn record_count(&self) -> u32 {
        self.orchestrator.renderer().buffer().record_count() as u32
    }

    pub fn take_uploads_json(&mut self) -> String {
        self.orchestrator.renderer_mut().take_uploads_json()
    }

    pub fn take_released(&mut self) -> Vec<u32> {
        self.orchestrator.renderer_mut().take_released()
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.orchestrator.renderer().pixel_ratio()
    }

    pub fn orchestrator(&self) -> &SceneOrchestrator<BufferRenderer> {
        &self.orchestrator
    }
}
