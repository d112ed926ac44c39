//! Renderer seam.
//!
//! The engine never talks to a GPU API. Each frame it hands a `FrameData`
//! (camera, visible meshes, resources to free) to whatever implements
//! `Renderer`: the WASM bridge's buffer packer, or a recording double in tests.

use glam::Mat4;

use super::camera::CameraUniform;
use crate::api::types::{NodeId, ResourceId};
use crate::components::mesh::{Geometry, Material};

/// Output surface the renderer is created for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceDesc {
    /// Width in CSS pixels.
    pub width: u32,
    /// Height in CSS pixels.
    pub height: u32,
    /// Device pixel ratio, if the host reports one.
    pub device_pixel_ratio: Option<f32>,
    pub antialias: bool,
}

impl SurfaceDesc {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio: None,
            antialias: true,
        }
    }

    pub fn with_device_pixel_ratio(mut self, ratio: f32) -> Self {
        self.device_pixel_ratio = Some(ratio);
        self
    }

    /// A zero-sized surface cannot be drawn to.
    pub fn is_renderable(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Timing information from a draw call.
#[derive(Debug, Clone, Copy, Default)]
pub struct DrawTiming {
    /// Time spent submitting draw calls (microseconds)
    pub draw_us: u32,
    /// Time spent in GPU rasterization (microseconds, if measurable)
    pub raster_us: u32,
}

/// One visible mesh, resolved to world space.
#[derive(Debug, Clone, Copy)]
pub struct DrawItem<'a> {
    pub node: NodeId,
    pub world: Mat4,
    pub geometry: &'a Geometry,
    pub material: &'a Material,
}

/// Complete frame data for rendering.
#[derive(Debug)]
pub struct FrameData<'a> {
    pub camera: CameraUniform,
    /// Background clear colour.
    pub clear_color: [f32; 3],
    /// Simulated time in seconds.
    pub time: f32,
    /// Visible meshes, back-to-front order not guaranteed.
    pub draws: Vec<DrawItem<'a>>,
    /// Resources dropped since the previous frame. Each id appears once, ever.
    pub released: Vec<ResourceId>,
}

/// Renderer trait for output backends.
pub trait Renderer {
    /// Backend identifier (e.g., "buffer", "webgl", "recording")
    fn backend(&self) -> &'static str;

    /// Draw a complete frame.
    /// Returns timing information for profiling.
    fn draw(&mut self, frame: &FrameData) -> DrawTiming;

    /// Handle output surface resize.
    fn resize(&mut self, width: u32, height: u32);

    /// Backing-store pixels per CSS pixel.
    fn set_pixel_ratio(&mut self, ratio: f32);

    /// Free backend objects for resources dropped outside a frame
    /// (on teardown). Each id arrives here or in `FrameData::released`, never both.
    fn release(&mut self, ids: &[ResourceId]);

    /// Release backend objects. Called once when the orchestrator is disposed.
    fn dispose(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_surface_is_not_renderable() {
        assert!(!SurfaceDesc::new(0, 600).is_renderable());
        assert!(!SurfaceDesc::new(800, 0).is_renderable());
        assert!(SurfaceDesc::new(800, 600).is_renderable());
    }

    #[test]
    fn surface_aspect() {
        let desc = SurfaceDesc::new(1920, 1080).with_device_pixel_ratio(3.0);
        assert!((desc.aspect() - 1920.0 / 1080.0).abs() < 1e-6);
        assert_eq!(desc.device_pixel_ratio, Some(3.0));
        assert_eq!(SurfaceDesc::new(10, 0).aspect(), 1.0);
    }
}
