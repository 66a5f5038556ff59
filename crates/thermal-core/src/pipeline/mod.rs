pub mod config;
pub mod engine;
pub mod live;
pub mod range;
pub mod snapshot;
pub mod types;

pub use config::EngineConfig;
pub use engine::{DecodedCapture, RenderedFrame, ThermalEngine};
pub use live::{LiveEvent, LivePipeline};
pub use range::DisplayMode;
pub use snapshot::{ConfigSnapshot, SharedConfig};
pub use types::{CancelToken, NoOpReporter, PipelineStage, ProgressReporter};
