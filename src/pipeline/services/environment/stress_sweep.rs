use super::scene_generator::VirtualHomeOffice;
use crate::pipeline::types::{Frame, Stressors};
use serde::{Deserialize, Serialize};

/// Stressor values to sweep. The cartesian product is enumerated with
/// lighting outermost and camera angle innermost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressSweepConfig {
    pub lighting: Vec<f64>,
    pub clutter: Vec<f64>,
    pub distance: Vec<f64>,
    pub motion: Vec<f64>,
    pub camera_angle: Vec<f64>,
}

impl Default for StressSweepConfig {
    fn default() -> Self {
        Self {
            lighting: vec![0.35, 0.7, 1.0],
            clutter: vec![0.1, 0.5, 0.9],
            distance: vec![0.5, 1.0, 1.5],
            motion: vec![0.0, 0.2, 0.6],
            camera_angle: vec![-20.0, 0.0, 25.0],
        }
    }
}

impl StressSweepConfig {
    /// Number of frames the full sweep produces.
    pub fn combination_count(&self) -> usize {
        self.axes().iter().map(|axis| axis.len()).product()
    }

    fn axes(&self) -> [&[f64]; 5] {
        [
            self.lighting.as_slice(),
            self.clutter.as_slice(),
            self.distance.as_slice(),
            self.motion.as_slice(),
            self.camera_angle.as_slice(),
        ]
    }

    /// Stressors for the combination at `index` in sweep order.
    pub fn stressors_at(&self, index: usize) -> Option<Stressors> {
        if index >= self.combination_count() {
            return None;
        }
        let axes = self.axes();
        let mut values = [0.0; 5];
        let mut remainder = index;
        for (slot, axis) in values.iter_mut().zip(axes.iter()).rev() {
            *slot = axis[remainder % axis.len()];
            remainder /= axis.len();
        }
        Some(Stressors::new(
            values[0], values[1], values[2], values[3], values[4],
        ))
    }
}

pub fn frame_id(index: usize) -> String {
    format!("frame_{:05}", index)
}

/// Lazy, ordered sweep over every stressor combination. Each step renders
/// one frame through the scene generator, so truncating with `take(n)`
/// yields exactly the first `n` frames of the full run.
pub struct StressSweep<'a> {
    config: &'a StressSweepConfig,
    environment: &'a mut VirtualHomeOffice,
    next_index: usize,
    total: usize,
}

impl<'a> StressSweep<'a> {
    pub fn new(config: &'a StressSweepConfig, environment: &'a mut VirtualHomeOffice) -> Self {
        Self {
            total: config.combination_count(),
            config,
            environment,
            next_index: 0,
        }
    }
}

impl Iterator for StressSweep<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        let stressors = self.config.stressors_at(self.next_index)?;
        let frame = self
            .environment
            .render_frame(frame_id(self.next_index), stressors);
        self.next_index += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total.saturating_sub(self.next_index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for StressSweep<'_> {}

impl VirtualHomeOffice {
    pub fn sweep<'a>(&'a mut self, config: &'a StressSweepConfig) -> StressSweep<'a> {
        StressSweep::new(config, self)
    }
}
