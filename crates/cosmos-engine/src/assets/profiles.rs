use crate::api::types::QualityLevel;

/// Device pixel ratio assumed when the host does not report one.
pub const FALLBACK_DEVICE_PIXEL_RATIO: f32 = 2.0;

/// Generation-density parameters for one quality level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityProfile {
    /// Maximum renderer pixel ratio. `None` means "use the device ratio".
    pub pixel_ratio_cap: Option<f32>,
    /// Total stars across all star shells.
    pub star_count: usize,
    /// Number of star shells.
    pub star_layers: usize,
    pub nebula_octaves: u32,
    pub nebula_warp: f32,
    pub bloom_strength: f32,
    pub distortion_detail: f32,
    pub use_antialias: bool,
}

const LOW: QualityProfile = QualityProfile {
    pixel_ratio_cap: Some(1.0),
    star_count: 3000,
    star_layers: 1,
    nebula_octaves: 2,
    nebula_warp: 0.1,
    bloom_strength: 0.5,
    distortion_detail: 0.5,
    use_antialias: false,
};

const MEDIUM: QualityProfile = QualityProfile {
    pixel_ratio_cap: Some(1.5),
    star_count: 8000,
    star_layers: 2,
    nebula_octaves: 4,
    nebula_warp: 0.25,
    bloom_strength: 1.0,
    distortion_detail: 1.0,
    use_antialias: true,
};

const HIGH: QualityProfile = QualityProfile {
    pixel_ratio_cap: None,
    star_count: 20000,
    star_layers: 3,
    nebula_octaves: 6,
    nebula_warp: 0.5,
    bloom_strength: 1.5,
    distortion_detail: 2.0,
    use_antialias: true,
};

impl QualityProfile {
    /// Look up the immutable profile for a quality level.
    pub fn for_level(level: QualityLevel) -> &'static QualityProfile {
        match level {
            QualityLevel::Low => &LOW,
            QualityLevel::Medium => &MEDIUM,
            QualityLevel::High => &HIGH,
        }
    }

    /// Pixel ratio to hand the renderer on this device.
    pub fn pixel_ratio(&self, device_ratio: Option<f32>) -> f32 {
        match self.pixel_ratio_cap {
            Some(cap) => cap,
            None => device_ratio.unwrap_or(FALLBACK_DEVICE_PIXEL_RATIO),
        }
    }

    /// Stars per shell (integer division; the remainder is dropped).
    pub fn stars_per_layer(&self) -> usize {
        self.star_count / self.star_layers.max(1)
    }

    /// Number of background galaxy billboards for a quality level.
    pub fn galaxy_count(level: QualityLevel) -> usize {
        if level == QualityLevel::High { 60 } else { 30 }
    }

    /// Number of nebula volumes (3 or 6 depending on octave budget).
    pub fn nebula_count(&self) -> usize {
        if self.nebula_octaves > 4 { 6 } else { 3 }
    }
}
