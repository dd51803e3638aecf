use crate::pipeline::types::{Detection, Frame, MitigationMode, MitigationResult, OverlayRegion};

pub const MITIGATION_PROMPT: &str =
    "Sensitive artifacts detected. Please reposition documents or adjust view.";
pub const NO_MITIGATION_PROMPT: &str = "No mitigation required.";

/// Builds blur overlays over detected regions.
#[derive(Debug, Clone, Default)]
pub struct OverlayMitigator;

impl OverlayMitigator {
    pub fn new() -> Self {
        Self
    }

    pub fn apply(&self, frame: &Frame, detections: &[Detection], strength: f64) -> MitigationResult {
        let strength = strength.clamp(0.0, 1.0);
        let overlays: Vec<OverlayRegion> = detections
            .iter()
            .map(|d| OverlayRegion {
                bbox: d.bbox,
                mode: MitigationMode::Blur,
                strength,
            })
            .collect();

        let prompt = if overlays.is_empty() {
            NO_MITIGATION_PROMPT
        } else {
            MITIGATION_PROMPT
        };

        MitigationResult {
            frame_id: frame.frame_id.clone(),
            overlays,
            prompt: prompt.to_string(),
        }
    }
}
