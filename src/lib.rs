pub mod config;
pub mod error;
pub mod pipeline;

pub use config::Settings;
pub use error::AppError;

pub use pipeline::services::{PipelineOrchestrator, PipelineOrchestratorBuilder};
pub use pipeline::types::{EvaluationReport, RunSummary};
