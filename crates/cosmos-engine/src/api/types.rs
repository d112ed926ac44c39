use serde::{Deserialize, Serialize};

/// Unique identifier for a node inside one `Scene`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Identifier of a geometry or shading resource owned by the engine.
/// The renderer keys its GPU objects by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResourceId(pub u32);

/// Generation density preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QualityLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityLevel {
    pub const ALL: [QualityLevel; 3] = [Self::Low, Self::Medium, Self::High];
}

/// How pointer and wheel input is interpreted by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NavigationMode {
    /// Orbit the origin; wheel zooms.
    #[default]
    Explore,
    /// Steer a heading; wheel acts as throttle.
    Warp,
}

/// Smoothed navigation-activity signal, both components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MotionSignal {
    pub energy: f32,
    pub impulse: f32,
}

/// One-way telemetry produced by the orchestrator for display.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Telemetry {
    pub energy: f32,
    pub impulse: f32,
    /// Last reported frames per second (0 until the first window closes).
    pub fps: u32,
}

impl Telemetry {
    pub fn motion(&self) -> MotionSignal {
        MotionSignal {
            energy: self.energy,
            impulse: self.impulse,
        }
    }
}
