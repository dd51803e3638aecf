pub mod audit_log;
pub mod detection;
pub mod environment;
pub mod evaluator;
pub mod orchestration;
pub mod overlay_mitigator;
pub mod policy_engine;

pub use audit_log::{AuditSink, InMemoryAuditSink, JsonlAuditLogger};
pub use detection::{
    DetectionJob, DetectionService, DetectorFactory, GroundTruthDetector, RiskDetector,
    TimedAssessment,
};
pub use environment::{StressSweep, StressSweepConfig, VirtualHomeOffice};
pub use evaluator::{EvaluationSettings, Evaluator};
pub use orchestration::{
    FrameOutcome, FrameStatus, PipelineOrchestrator, PipelineOrchestratorBuilder, SweepReport,
};
pub use overlay_mitigator::OverlayMitigator;
pub use policy_engine::{PolicyConfig, PolicyEngine};
