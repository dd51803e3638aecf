//! Detector that simulates model confidence from scene ground truth.
use super::risk_detector::RiskDetector;
use crate::pipeline::types::{Detection, Frame, ObjectClass, RiskAssessment, Stressors};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use tracing::trace;

/// Detections below this confidence are discarded.
pub const CONFIDENCE_FLOOR: f64 = 0.25;
/// Added to the risk score once anything sensitive is detected at all.
pub const READABLE_BOOST: f64 = 0.15;
pub const MAX_STRESS_PENALTY: f64 = 0.25;

const BASE_CONFIDENCE: f64 = 0.55;
const QUALITY_GAIN: f64 = 0.4;
const NOISE_LOW: f64 = -0.12;
const NOISE_HIGH: f64 = 0.10;

/// Stand-in for model inference: each sensitive object in the frame is
/// "seen" with a confidence driven by scene quality plus bounded noise.
pub struct GroundTruthDetector {
    classes: BTreeSet<ObjectClass>,
    rng: StdRng,
}

impl GroundTruthDetector {
    pub fn new(classes: impl IntoIterator<Item = ObjectClass>, seed: u64) -> Self {
        Self {
            classes: classes.into_iter().collect(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Simulated imaging quality; 1.0 is ideal, floor of roughly 0.06.
    pub fn quality_factor(stressors: &Stressors) -> f64 {
        stressors.lighting.max(0.1)
            * (1.0 - stressors.motion.min(0.8) * 0.35)
            * (1.0 - stressors.clutter.min(0.9) * 0.2)
    }

    fn detect_objects(&mut self, frame: &Frame) -> Vec<Detection> {
        let quality = Self::quality_factor(&frame.stressors);
        let base_confidence = BASE_CONFIDENCE + QUALITY_GAIN * quality;
        let mut detections = Vec::new();

        for object in &frame.objects {
            if !self.classes.contains(&object.class) {
                continue;
            }
            let noise = self.rng.random_range(NOISE_LOW..=NOISE_HIGH);
            let confidence = (base_confidence + noise).clamp(0.05, 0.99);
            if confidence < CONFIDENCE_FLOOR {
                continue;
            }
            detections.push(Detection {
                class_name: object.class,
                bbox: object.bbox,
                confidence,
            });
        }
        detections
    }

    pub fn risk_score(stressors: &Stressors, detections: &[Detection]) -> f64 {
        if detections.is_empty() {
            return 0.0;
        }
        let avg_confidence =
            detections.iter().map(|d| d.confidence).sum::<f64>() / detections.len() as f64;
        let stress_penalty = (stressors.distance * 0.08 + stressors.camera_angle.abs() * 0.003)
            .min(MAX_STRESS_PENALTY);
        (avg_confidence * 0.7 + READABLE_BOOST + stress_penalty).clamp(0.0, 1.0)
    }
}

impl RiskDetector for GroundTruthDetector {
    fn infer(&mut self, frame: &Frame) -> RiskAssessment {
        let detections = self.detect_objects(frame);
        let risk_score = Self::risk_score(&frame.stressors, &detections);
        trace!(
            "{}: {} detections, risk {:.3}",
            frame.frame_id,
            detections.len(),
            risk_score
        );
        RiskAssessment::new(risk_score, detections)
    }

    fn name(&self) -> &'static str {
        "GroundTruthDetector"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::services::environment::{StressSweepConfig, VirtualHomeOffice};
    use crate::pipeline::types::BoundingBox;

    fn detector(seed: u64) -> GroundTruthDetector {
        GroundTruthDetector::new(ObjectClass::SENSITIVE, seed)
    }

    #[test]
    fn test_scores_in_unit_range_across_sweep() {
        let config = StressSweepConfig::default();
        let mut office = VirtualHomeOffice::default();
        let mut detector = detector(11);

        for frame in office.sweep(&config) {
            let assessment = detector.infer(&frame);
            assert!((0.0..=1.0).contains(&assessment.risk_score));
            for detection in &assessment.detections {
                assert!((0.0..=1.0).contains(&detection.confidence));
                assert!(detection.confidence >= CONFIDENCE_FLOOR);
                assert!(detection.class_name.is_sensitive());
            }
        }
    }

    #[test]
    fn test_quality_factor() {
        let ideal = Stressors::new(1.0, 0.0, 0.0, 0.0, 0.0);
        assert!((GroundTruthDetector::quality_factor(&ideal) - 1.0).abs() < 1e-12);

        // Lighting floors at 0.1, motion caps at 0.8, clutter caps at 0.9.
        let harsh = Stressors::new(0.0, 5.0, 0.0, 5.0, 0.0);
        let expected = 0.1 * (1.0 - 0.8 * 0.35) * (1.0 - 0.9 * 0.2);
        assert!((GroundTruthDetector::quality_factor(&harsh) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_risk_score_formula() {
        let stressors = Stressors::new(1.0, 0.1, 1.0, 0.0, 10.0);
        let detections = vec![
            Detection {
                class_name: ObjectClass::Document,
                bbox: BoundingBox::new(0, 0, 10, 10),
                confidence: 0.8,
            },
            Detection {
                class_name: ObjectClass::Envelope,
                bbox: BoundingBox::new(0, 0, 10, 10),
                confidence: 0.6,
            },
        ];
        let expected = 0.7 * 0.7 + 0.15 + (0.08 + 0.03);
        let score = GroundTruthDetector::risk_score(&stressors, &detections);
        assert!((score - expected).abs() < 1e-12);
        assert_eq!(GroundTruthDetector::risk_score(&stressors, &[]), 0.0);
    }

    #[test]
    fn test_stress_penalty_is_capped() {
        let stressors = Stressors::new(1.0, 0.1, 10.0, 0.0, 90.0);
        let detections = vec![Detection {
            class_name: ObjectClass::Notebook,
            bbox: BoundingBox::new(0, 0, 1, 1),
            confidence: 0.5,
        }];
        let score = GroundTruthDetector::risk_score(&stressors, &detections);
        assert!((score - (0.35 + 0.15 + 0.25)).abs() < 1e-12);
    }

    #[test]
    fn test_ignores_unconfigured_classes() {
        let mut office = VirtualHomeOffice::default();
        let frame = office.render_frame("frame_00000", Stressors::new(1.0, 0.1, 0.5, 0.0, 0.0));
        let mut detector = GroundTruthDetector::new([ObjectClass::Whiteboard], 3);

        let assessment = detector.infer(&frame);
        assert_eq!(assessment.detections.len(), 1);
        assert_eq!(assessment.detections[0].class_name, ObjectClass::Whiteboard);
        assert_eq!(assessment.detections[0].bbox, frame.objects[3].bbox);
    }

    #[test]
    fn test_same_seed_reproducible() {
        let config = StressSweepConfig::default();
        let frames: Vec<Frame> = VirtualHomeOffice::default().sweep(&config).take(20).collect();
        let mut a = detector(11);
        let mut b = detector(11);
        for frame in &frames {
            assert_eq!(a.infer(frame), b.infer(frame));
        }
    }
}
