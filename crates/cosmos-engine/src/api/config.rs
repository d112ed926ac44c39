use serde::{Deserialize, Serialize};

use crate::api::types::{NavigationMode, QualityLevel};

/// How the warp-mode world offset advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WarpStepping {
    /// One fixed step per controller update, independent of elapsed time.
    #[default]
    PerUpdate,
    /// Step scaled by `dt * 60`, identical to `PerUpdate` at 60 Hz.
    TimeScaled,
}

/// Engine tunables, fixed for the lifetime of an orchestrator.
#[derive(Debug, Clone)]
pub struct CosmosConfig {
    /// Seed for all procedural generation (default: 42).
    pub seed: u64,
    /// Upper bound on a single frame delta in seconds (default: 0.1).
    pub max_frame_dt: f32,
    /// FPS reporting window in seconds (default: 1.0).
    pub fps_window: f32,
    /// Vertical field of view in degrees (default: 70).
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    /// Starting orbit radius (default: 100).
    pub initial_zoom: f32,
    pub warp_stepping: WarpStepping,
    /// Particle count of the morph field cloud (default: 3000).
    pub morph_particle_count: usize,
}

impl Default for CosmosConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_frame_dt: 0.1,
            fps_window: 1.0,
            fov_deg: 70.0,
            near: 0.1,
            far: 10_000.0,
            initial_zoom: 100.0,
            warp_stepping: WarpStepping::PerUpdate,
            morph_particle_count: 3000,
        }
    }
}

/// Feature toggles carried by the configuration snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Toggles {
    pub constellations: bool,
    pub milky_way: bool,
    pub events: bool,
    pub sensors_enabled: bool,
    pub planet_realism: bool,
}

impl Default for Toggles {
    fn default() -> Self {
        Self {
            constellations: true,
            milky_way: true,
            events: true,
            sensors_enabled: true,
            planet_realism: true,
        }
    }
}

/// Externally owned view configuration, pushed by value whenever it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigSnapshot {
    #[serde(flatten)]
    pub toggles: Toggles,
    pub quality: QualityLevel,
    pub navigation_mode: NavigationMode,
    #[serde(rename = "currentPOI")]
    pub current_poi: String,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            toggles: Toggles::default(),
            quality: QualityLevel::Medium,
            navigation_mode: NavigationMode::Explore,
            current_poi: "Origin".to_string(),
        }
    }
}

impl ConfigSnapshot {
    /// Parse a snapshot from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Whether moving from `prev` to `self` requires a full content rebuild.
    pub fn needs_rebuild(&self, prev: Option<&ConfigSnapshot>) -> bool {
        match prev {
            None => true,
            Some(p) => {
                p.quality != self.quality
                    || p.toggles.planet_realism != self.toggles.planet_realism
                    || p.toggles.milky_way != self.toggles.milky_way
                    || p.toggles.events != self.toggles.events
            }
        }
    }
}
