use serde::Serialize;

/// Aggregate accuracy, privacy and performance figures for one sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub precision: f64,
    pub recall: f64,
    pub readable_exposure_rate: f64,
    pub readable_exposure_duration_s: f64,
    pub avg_latency_ms: f64,
    /// Supplied by the caller, not measured.
    pub peak_memory_mb: f64,
    pub battery_impact_score: f64,
    /// 1.0 when every frame has a detection record, else 0.0.
    pub forensic_completeness: f64,
}

/// Summary returned to callers of a sweep and printed by the binary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub frames_processed: usize,
    pub mitigation_rate: f64,
    pub evaluation: EvaluationReport,
    pub audit_log: String,
}
