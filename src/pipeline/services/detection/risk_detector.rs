use crate::pipeline::types::{Frame, RiskAssessment};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Strategy pattern for frame risk detection. The ground-truth simulator is
/// one implementation; a learned model plugs in behind the same seam.
pub trait RiskDetector: Send {
    fn infer(&mut self, frame: &Frame) -> RiskAssessment;
    fn name(&self) -> &'static str;
}

/// Builds an independent detector from a seed. Used where each frame needs
/// its own random stream.
pub type DetectorFactory = Arc<dyn Fn(u64) -> Box<dyn RiskDetector> + Send + Sync>;

/// Derive a per-frame seed from a run seed. The run seed picks a key, and
/// the frame index selects a stream under that key.
pub fn frame_seed(base_seed: u64, frame_index: usize) -> u64 {
    let run_key: u64 = StdRng::seed_from_u64(base_seed).random();
    StdRng::seed_from_u64(run_key ^ frame_index as u64).random()
}
