use bytemuck::{Pod, Zeroable};

use super::camera::CameraUniform;
use super::traits::DrawItem;

/// Per-draw record written to the shared frame buffer for the JavaScript rasterizer.
/// Must match the host protocol: 24 floats = 96 bytes stride.
///
/// Ids are carried as floats; they stay exact below 2^24.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct DrawRecord {
    /// Geometry resource id.
    pub geometry: f32,
    /// Material resource id.
    pub material: f32,
    /// Material opacity this frame.
    pub opacity: f32,
    /// `time` parameter of the material, 0 if it has none.
    pub time: f32,
    /// `energy` parameter of the material, 0 if it has none.
    pub energy: f32,
    pub _pad: [f32; 3],
    /// Column-major model matrix.
    pub model: [f32; 16],
}

impl DrawRecord {
    pub const FLOATS: usize = 24;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    pub fn from_item(item: &DrawItem<'_>) -> Self {
        let uniforms = &item.material.desc.uniforms;
        Self {
            geometry: item.geometry.id().0 as f32,
            material: item.material.id().0 as f32,
            opacity: item.material.desc.opacity,
            time: uniforms.float("time").unwrap_or(0.0),
            energy: uniforms.float("energy").unwrap_or(0.0),
            _pad: [0.0; 3],
            model: item.world.to_cols_array(),
        }
    }
}

/// Frame header: camera matrices, eye position, time and record count.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct FrameHeader {
    pub view: [f32; 16],
    pub projection: [f32; 16],
    pub eye: [f32; 3],
    pub time: f32,
    pub clear_color: [f32; 3],
    pub record_count: f32,
}

impl FrameHeader {
    pub const FLOATS: usize = 40;
}

/// Flat float buffer holding one header followed by the frame's draw records.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    floats: Vec<f32>,
    records: usize,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            floats: Vec::with_capacity(FrameHeader::FLOATS + 64 * DrawRecord::FLOATS),
            records: 0,
        }
    }

    /// Start a new frame. Clears previous contents and writes a header
    /// whose record count is patched by `finish`.
    pub fn begin(&mut self, camera: &CameraUniform, time: f32, clear_color: [f32; 3]) {
        self.floats.clear();
        self.records = 0;
        let header = FrameHeader {
            view: flatten(&camera.view),
            projection: flatten(&camera.projection),
            eye: camera.position,
            time,
            clear_color,
            record_count: 0.0,
        };
        self.floats.extend_from_slice(bytemuck::cast_slice(&[header]));
    }

    pub fn push(&mut self, record: DrawRecord) {
        self.floats.extend_from_slice(bytemuck::cast_slice(&[record]));
        self.records += 1;
    }

    /// Write the final record count into the header.
    pub fn finish(&mut self) {
        if let Some(slot) = self.floats.get_mut(FrameHeader::FLOATS - 1) {
            *slot = self.records as f32;
        }
    }

    pub fn record_count(&self) -> usize {
        self.records
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.floats
    }

    /// Raw pointer for zero-copy reads from the host.
    pub fn as_ptr(&self) -> *const f32 {
        self.floats.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.floats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.floats.is_empty()
    }
}

fn flatten(m: &[[f32; 4]; 4]) -> [f32; 16] {
    let mut out = [0.0; 16];
    for (col, chunk) in m.iter().zip(out.chunks_exact_mut(4)) {
        chunk.copy_from_slice(col);
    }
    out
}
