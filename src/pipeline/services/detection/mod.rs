pub mod detection_service;
pub mod ground_truth_detector;
pub mod risk_detector;

pub use detection_service::{DetectionJob, DetectionService, TimedAssessment};
pub use ground_truth_detector::{GroundTruthDetector, CONFIDENCE_FLOOR};
pub use risk_detector::{frame_seed, DetectorFactory, RiskDetector};
