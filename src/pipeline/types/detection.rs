use super::frame::{BoundingBox, ObjectClass};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub class_name: ObjectClass,
    pub bbox: BoundingBox,
    pub confidence: f64,
}

/// Risk score in [0, 1] together with the detections it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub risk_score: f64,
    pub detections: Vec<Detection>,
}

impl RiskAssessment {
    pub fn new(risk_score: f64, detections: Vec<Detection>) -> Self {
        Self {
            risk_score,
            detections,
        }
    }

    pub fn empty() -> Self {
        Self::new(0.0, Vec::new())
    }
}
