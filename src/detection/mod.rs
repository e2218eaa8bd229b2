pub mod letterbox;
pub mod engine;
pub mod suppression;
pub mod detector;
pub mod digits;
pub mod steps;

pub use detector::{DetectorConfig, GlyphDetector};
pub use digits::{clamp_reading, decode_digits, frame_reading};
pub use engine::{InferenceEngine, InputTensor, RawOutput, RtenEngine};
pub use letterbox::{Letterbox, LetterboxGeometry};
pub use suppression::non_max_suppression;

use std::sync::Arc;

use crate::models::CropRect;
use crate::pipeline::Pipeline;
use crate::sink::LogSink;

/// Build the standard per-frame pipeline: crop, resize to the working size, detect
pub fn build_frame_pipeline(
    crop: CropRect,
    working_size: (u32, u32),
    detector: GlyphDetector,
    sink: Arc<dyn LogSink>,
) -> Pipeline {
    use crate::detection::steps::*;

    Pipeline::new()
        .with_sink(sink)
        .add_step(Arc::new(CropStep { rect: crop }))
        .add_step(Arc::new(ResizeStep {
            width: working_size.0,
            height: working_size.1,
        }))
        .add_step(Arc::new(DetectStep { detector }))
}
