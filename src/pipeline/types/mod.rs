mod audit_event;
mod detection;
mod frame;
mod mitigation;
mod report;

pub use audit_event::{AuditEvent, AuditEventBuilder, AuditEventType, RiskLevel};
pub use detection::{Detection, RiskAssessment};
pub use frame::{BoundingBox, Frame, ObjectClass, SceneObject, Stressors};
pub use mitigation::{MitigationMode, MitigationResult, OverlayRegion};
pub use report::{EvaluationReport, RunSummary};
