#![allow(dead_code, unused_imports)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types for tests
pub use weighlog::segmentation::{consolidated_groups, merge_duplicates, representative};
pub use weighlog::{
    process_video, DriverConfig, MeasurementEvent, MemorySink, SegmentationConfig, SyntheticClock,
};
