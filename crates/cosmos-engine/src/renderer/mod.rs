pub mod camera;
pub mod instance;
pub mod resources;
pub mod traits;

// Re-export key types for convenient access
pub use camera::{CameraUniform, PerspectiveCamera};
pub use instance::{DrawRecord, FrameBuffer, FrameHeader};
pub use resources::{ResourceHandle, ResourceKind, ResourcePool};
pub use traits::{DrawItem, DrawTiming, FrameData, Renderer, SurfaceDesc};
