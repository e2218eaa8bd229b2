use serde::{Deserialize, Serialize};

/// Thresholds for turning the per-frame stream into measurements.
/// Run lengths count sampled frames, not video frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// A zero run longer than this separates two measurements
    pub idle_min_run: usize,

    /// Smallest value accepted as a measurement
    pub min_value: f64,

    /// A value must be held for more than this many samples
    pub min_run: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            idle_min_run: 30,
            min_value: 1.0,
            min_run: 30,
        }
    }
}
