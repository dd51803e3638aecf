use crate::pipeline::types::{Detection, EvaluationReport, Frame, ObjectClass};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Proxy constants for exposure and battery estimates, plus the peak
/// memory figure reported for the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationSettings {
    pub exposure_seconds_per_item: f64,
    pub latency_reference_ms: f64,
    pub latency_weight: f64,
    pub memory_reference_mb: f64,
    pub memory_weight: f64,
    pub peak_memory_mb: f64,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            exposure_seconds_per_item: 0.06,
            latency_reference_ms: 100.0,
            latency_weight: 0.45,
            memory_reference_mb: 1024.0,
            memory_weight: 0.55,
            peak_memory_mb: 220.0,
        }
    }
}

impl EvaluationSettings {
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("exposure_seconds_per_item", self.exposure_seconds_per_item),
            ("latency_reference_ms", self.latency_reference_ms),
            ("latency_weight", self.latency_weight),
            ("memory_reference_mb", self.memory_reference_mb),
            ("memory_weight", self.memory_weight),
            ("peak_memory_mb", self.peak_memory_mb),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a finite, non-negative number", name));
            }
        }
        if self.latency_reference_ms == 0.0 || self.memory_reference_mb == 0.0 {
            return Err("Reference latency and memory must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    settings: EvaluationSettings,
}

impl Evaluator {
    pub fn new(settings: EvaluationSettings) -> Self {
        Self { settings }
    }

    /// Aggregate a run. Per-frame inputs are index-aligned with `frames`;
    /// `latencies_ms` only holds samples for frames that ran detection.
    pub fn compute(
        &self,
        frames: &[Frame],
        detections_per_frame: &[Vec<Detection>],
        mitigation_applied: &[bool],
        latencies_ms: &[f64],
        peak_memory_mb: f64,
    ) -> EvaluationReport {
        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut fn_ = 0usize;
        let mut exposed = 0usize;
        let mut total_sensitive = 0usize;

        for ((frame, detections), mitigated) in frames
            .iter()
            .zip(detections_per_frame)
            .zip(mitigation_applied)
        {
            let ground_truth: BTreeSet<ObjectClass> =
                frame.sensitive_objects().map(|o| o.class).collect();
            let predicted: BTreeSet<ObjectClass> =
                detections.iter().map(|d| d.class_name).collect();

            tp += ground_truth.intersection(&predicted).count();
            fp += predicted.difference(&ground_truth).count();
            fn_ += ground_truth.difference(&predicted).count();

            total_sensitive += ground_truth.len();
            if !mitigated {
                exposed += ground_truth.len();
            }
        }

        let avg_latency_ms = if latencies_ms.is_empty() {
            0.0
        } else {
            latencies_ms.iter().sum::<f64>() / latencies_ms.len() as f64
        };
        let battery_impact_score = (avg_latency_ms / self.settings.latency_reference_ms
            * self.settings.latency_weight
            + peak_memory_mb / self.settings.memory_reference_mb * self.settings.memory_weight)
            .clamp(0.0, 1.0);

        EvaluationReport {
            precision: ratio(tp, tp + fp),
            recall: ratio(tp, tp + fn_),
            readable_exposure_rate: ratio(exposed, total_sensitive),
            readable_exposure_duration_s: exposed as f64 * self.settings.exposure_seconds_per_item,
            avg_latency_ms,
            peak_memory_mb,
            battery_impact_score,
            forensic_completeness: if frames.len() == detections_per_frame.len() {
                1.0
            } else {
                0.0
            },
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
