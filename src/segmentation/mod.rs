//! Reduce a video's per-frame readings to validated measurements.
//!
//! Readings are run-length encoded, split into groups at long zero runs,
//! duplicate values inside each group are merged, and each group yields at
//! most one measurement: the qualifying value it held longest.

pub mod config;
pub mod merge;
pub mod runs;

pub use config::SegmentationConfig;
pub use merge::{merge_duplicates, representative};
pub use runs::{run_length_encode, split_at_idle, Run};

use crate::models::{FrameRecord, MeasurementEvent};

/// Groups between idle runs, each with duplicate values merged.
pub fn consolidated_groups(records: &[FrameRecord], config: &SegmentationConfig) -> Vec<Vec<Run>> {
    let runs = run_length_encode(records);
    split_at_idle(runs, config)
        .iter()
        .map(|group| merge_duplicates(group))
        .collect()
}

/// Measurements in stream order, numbered from 1.
pub fn segment(records: &[FrameRecord], config: &SegmentationConfig) -> Vec<MeasurementEvent> {
    consolidated_groups(records, config)
        .iter()
        .filter_map(|group| representative(group, config))
        .enumerate()
        .map(|(i, run)| MeasurementEvent {
            sequence_index: i as u32 + 1,
            value: run.number,
            timestamp: run.last_timestamp.clone(),
        })
        .collect()
}
