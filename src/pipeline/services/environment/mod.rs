pub mod scene_generator;
pub mod stress_sweep;

pub use scene_generator::{VirtualHomeOffice, SCENE_CATALOG};
pub use stress_sweep::{frame_id, StressSweep, StressSweepConfig};
