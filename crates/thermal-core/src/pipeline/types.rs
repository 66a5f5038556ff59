use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Frame processing stage, used for progress reporting and cancellation points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    DecodingHeader,
    DecodingTemperature,
    Correcting,
    ColorMapping,
    Highlighting,
    Orienting,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DecodingHeader => write!(f, "Decoding header"),
            Self::DecodingTemperature => write!(f, "Decoding temperatures"),
            Self::Correcting => write!(f, "Correcting temperatures"),
            Self::ColorMapping => write!(f, "Mapping colors"),
            Self::Highlighting => write!(f, "Highlighting alarms"),
            Self::Orienting => write!(f, "Orienting"),
        }
    }
}

/// Thread-safe progress reporting for frame processing.
///
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new stage has started. `total_items` is the number of work items in
    /// this stage (e.g. pixel count), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// Work items within the current stage have completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// Reporter that ignores every notification.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// Cooperative cancellation flag shared between a caller and a running decode.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
