pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;
pub mod input;
pub mod assets;

// Re-export key types at crate root for convenience
pub use api::config::{ConfigSnapshot, CosmosConfig, Toggles, WarpStepping};
pub use api::error::{CosmosError, CosmosResult};
pub use api::types::{MotionSignal, NavigationMode, NodeId, QualityLevel, ResourceId, Telemetry};
pub use assets::manifest::{PoiDescriptor, PoiManifest};
pub use assets::profiles::QualityProfile;
pub use assets::registry::{PoiRegistry, PointOfInterest};
pub use components::mesh::{
    BlendMode, Geometry, GeometryKind, Material, MaterialDesc, MeshComponent, PointBuffers,
    ShaderProgram, Side, UniformValue, Uniforms,
};
pub use components::node::Node;
pub use crate::core::orchestrator::SceneOrchestrator;
pub use crate::core::scene::Scene;
pub use crate::core::time::{FpsCounter, FrameClock};
pub use input::controller::NavigationController;
pub use input::queue::{
    InputChannel, InputEvent, InputHub, InputQueue, InputSource, OrientationSample, Subscription,
};
pub use renderer::camera::{CameraUniform, PerspectiveCamera};
pub use renderer::instance::{DrawRecord, FrameBuffer, FrameHeader};
pub use renderer::resources::{ResourceHandle, ResourceKind, ResourcePool};
pub use renderer::traits::{DrawItem, DrawTiming, FrameData, Renderer, SurfaceDesc};
pub use systems::morph_field::MorphField;
pub use systems::motion::MotionEstimator;
pub use systems::rng::Rng;
pub use systems::universe::{EpochContent, UniverseGenerator};
