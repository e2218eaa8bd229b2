pub mod clock;
pub mod config;
pub mod detection;
pub mod driver;
pub mod error;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod queue;
pub mod segmentation;
pub mod sink;
pub mod video;

pub use clock::SyntheticClock;
pub use config::Settings;
pub use detection::{GlyphDetector, DetectorConfig};
pub use driver::{process_video, process_video_file, DriverConfig, FrameAnalyzer, VideoOptions, VideoReport};
pub use error::Error;
pub use models::{CropRect, FrameRecord, GlyphDetection, MeasurementEvent};
pub use pipeline::{Pipeline, PipelineContext, PipelineStep, FrameData};
pub use segmentation::{segment, SegmentationConfig};
pub use sink::{LogCrateSink, LogSink, MemorySink};
