pub mod frame_outcome;
pub mod pipeline_orchestrator;

pub use frame_outcome::{FrameOutcome, FrameStatus, SweepReport};
pub use pipeline_orchestrator::{PipelineOrchestrator, PipelineOrchestratorBuilder};
