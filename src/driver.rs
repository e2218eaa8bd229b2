//! Per-video temporal driver.
//!
//! Reads frames in order, keeps the synthesized clock, sends every
//! `sample_interval`-th frame through detection and hands the resulting
//! records to the segmenter.

use anyhow::Result;
use image::{DynamicImage, RgbImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::clock::SyntheticClock;
use crate::config::Settings;
use crate::detection::{build_frame_pipeline, frame_reading, GlyphDetector};
use crate::models::{FrameRecord, GlyphDetection, MeasurementEvent, DETECTION_FAILURE};
use crate::pipeline::Pipeline;
use crate::segmentation::{segment, SegmentationConfig};
use crate::sink::LogSink;
use crate::video::{frames_per_second, open_source, FrameRead, FrameSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// Detect on every n-th successfully read frame
    pub sample_interval: u64,
    /// Consecutive unreadable frames before the video is abandoned
    pub max_consecutive_failures: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            sample_interval: 3,
            max_consecutive_failures: 180,
        }
    }
}

/// Turns one frame into glyph detections
pub trait FrameAnalyzer {
    fn analyze(&self, frame: RgbImage, frame_index: u64) -> Result<Vec<GlyphDetection>>;
}

impl FrameAnalyzer for Pipeline {
    fn analyze(&self, frame: RgbImage, frame_index: u64) -> Result<Vec<GlyphDetection>> {
        Ok(self.run(DynamicImage::ImageRgb8(frame), frame_index)?.detections)
    }
}

/// Everything learned from one video
#[derive(Debug, Clone)]
pub struct VideoReport {
    pub records: Vec<FrameRecord>,
    pub measurements: Vec<MeasurementEvent>,
    /// Frames decoded successfully
    pub frames_read: u64,
    /// Read attempts that failed, in total
    pub read_failures: u64,
    /// Processing hit the consecutive failure limit
    pub stopped_early: bool,
    pub elapsed: Duration,
}

/// Drive `source` to completion and segment the readings.
///
/// Never fails: unreadable frames and detection errors are logged and
/// folded into the record stream.
pub fn process_video<S, A>(
    source: &mut S,
    mut clock: SyntheticClock,
    analyzer: &A,
    driver: &DriverConfig,
    segmentation: &SegmentationConfig,
    sink: &dyn LogSink,
) -> VideoReport
where
    S: FrameSource + ?Sized,
    A: FrameAnalyzer + ?Sized,
{
    let start = Instant::now();
    let fps = frames_per_second(source.fps());
    let sample_interval = driver.sample_interval.max(1);

    let mut records = Vec::new();
    let mut frame_count: u64 = 1;
    let mut last_tick: u64 = 0;
    let mut consecutive_failures: u32 = 0;
    let mut read_failures: u64 = 0;
    let mut frames_read: u64 = 0;
    let mut stopped_early = false;

    loop {
        // One tick per frame position, however many attempts it takes to read
        if frame_count % fps == 0 && last_tick != frame_count {
            clock.increment();
            last_tick = frame_count;
        }

        let frame = match source.read() {
            FrameRead::Frame(frame) => frame,
            FrameRead::EndOfStream => break,
            FrameRead::Failed => {
                consecutive_failures += 1;
                read_failures += 1;
                sink.warn(&format!("time: {}, frame: {}, no frame read", clock, frame_count));

                if consecutive_failures >= driver.max_consecutive_failures {
                    sink.error(&format!(
                        "Failed to read {} frames in a row, stopping video processing",
                        consecutive_failures
                    ));
                    stopped_early = true;
                    break;
                }
                continue;
            }
        };

        consecutive_failures = 0;
        frames_read += 1;

        if frame_count % sample_interval == 0 {
            let number = match analyzer.analyze(frame, frame_count) {
                Ok(detections) => {
                    if detections.is_empty() {
                        sink.warn(&format!("frame {}: no glyphs detected", frame_count));
                    }
                    frame_reading(&detections)
                }
                Err(e) => {
                    sink.error(&format!("frame {}: detection failed: {:#}", frame_count, e));
                    DETECTION_FAILURE
                }
            };

            sink.debug(&format!("frame {}: reading {} at {}", frame_count, number, clock));
            records.push(FrameRecord::new(frame_count, number, clock.to_string()));
        }

        frame_count += 1;
    }

    let measurements = segment(&records, segmentation);
    let elapsed = start.elapsed();
    sink.info(&format!(
        "Video processing completed. Total frames: {}, samples: {}, measurements: {}, processing time: {:.1}s",
        frames_read,
        records.len(),
        measurements.len(),
        elapsed.as_secs_f64()
    ));

    VideoReport {
        records,
        measurements,
        frames_read,
        read_failures,
        stopped_early,
        elapsed,
    }
}

/// Options for processing a video file end to end
#[derive(Clone, Debug, Default)]
pub struct VideoOptions {
    /// Frame rate for image-sequence inputs or to override the container
    pub fps: Option<f64>,
    /// Per-step debug images are written under this directory
    pub debug_dir: Option<PathBuf>,
}

/// Load the model, open `path`, and process it with `settings`.
///
/// Fails before any frame is read when the file name has no timestamp, the
/// model cannot be loaded, or the video cannot be opened.
pub fn process_video_file(
    path: &Path,
    settings: &Settings,
    options: &VideoOptions,
    sink: Arc<dyn LogSink>,
) -> Result<VideoReport> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let clock = SyntheticClock::from_file_name(&file_name)?;

    sink.info(&format!("Processing video: {}", file_name));
    sink.info(&format!("Crop coordinates: {:?}", settings.crop));

    let detector = GlyphDetector::from_model_file(&settings.model_path, settings.detector_config())?;
    let mut source = open_source(path, options.fps)?;

    let mut pipeline = build_frame_pipeline(
        settings.crop,
        (settings.working_size.width, settings.working_size.height),
        detector,
        sink.clone(),
    );
    if let Some(debug_dir) = &options.debug_dir {
        pipeline = pipeline.with_debug(debug_dir.clone())?;
    }

    Ok(process_video(
        &mut source,
        clock,
        &pipeline,
        &settings.driver_config(),
        &settings.segmentation,
        sink.as_ref(),
    ))
}
