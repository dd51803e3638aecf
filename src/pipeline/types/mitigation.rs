use super::frame::BoundingBox;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MitigationMode {
    Blur,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayRegion {
    pub bbox: BoundingBox,
    pub mode: MitigationMode,
    pub strength: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MitigationResult {
    pub frame_id: String,
    pub overlays: Vec<OverlayRegion>,
    pub prompt: String,
}
