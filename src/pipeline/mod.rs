pub mod services;
pub mod types;

pub use services::{PipelineOrchestrator, SweepReport};
pub use types::{Frame, RiskAssessment, RunSummary};
