use crate::pipeline::types::{MitigationResult, RiskAssessment, RunSummary};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStatus {
    /// Detection ran and the frame was settled by the policy.
    Processed,
    /// Policy declined to run detection.
    Skipped,
    /// Detection overran the per-frame deadline; handled like `Skipped`.
    DeadlineExceeded,
}

/// What happened to a single frame during a sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameOutcome {
    pub frame_id: String,
    pub status: FrameStatus,
    pub assessment: Option<RiskAssessment>,
    pub mitigation: Option<MitigationResult>,
    pub latency_ms: Option<f64>,
}

impl FrameOutcome {
    pub fn skipped(frame_id: impl Into<String>, status: FrameStatus) -> Self {
        Self {
            frame_id: frame_id.into(),
            status,
            assessment: None,
            mitigation: None,
            latency_ms: None,
        }
    }

    pub fn mitigated(&self) -> bool {
        self.mitigation.is_some()
    }
}

/// Run summary plus the ordered per-frame outcomes it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepReport {
    pub summary: RunSummary,
    pub outcomes: Vec<FrameOutcome>,
}
