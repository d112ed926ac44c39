pub mod math;
pub mod orchestrator;
pub mod scene;
pub mod time;
