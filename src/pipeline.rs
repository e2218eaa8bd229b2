use image::{DynamicImage, Rgb};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::path::PathBuf;
use std::sync::Arc;
use anyhow::Result;

use crate::models::GlyphDetection;
use crate::sink::{LogCrateSink, LogSink};

/// Data that flows through the per-frame pipeline
#[derive(Clone)]
pub struct FrameData {
    /// Current image (full frame, then crop, then working-size crop)
    pub image: DynamicImage,

    /// 1-based index of the frame in the video
    pub frame_index: u64,

    /// Glyphs found by the detect step, in `image` coordinates
    pub detections: Vec<GlyphDetection>,
}

impl FrameData {
    pub fn new(image: DynamicImage, frame_index: u64) -> Self {
        Self {
            image,
            frame_index,
            detections: Vec::new(),
        }
    }

    /// Replace the image, keeping everything else
    pub fn with_image(mut self, image: DynamicImage) -> Self {
        self.image = image;
        self
    }

    /// Image with the detection boxes drawn on it (used for debug output)
    pub fn annotated(&self) -> DynamicImage {
        if self.detections.is_empty() {
            return self.image.clone();
        }
        let mut canvas = self.image.to_rgb8();
        for det in &self.detections {
            let w = det.width.round().max(1.0) as u32;
            let h = det.height.round().max(1.0) as u32;
            let rect = Rect::at(det.left.round() as i32, det.top.round() as i32).of_size(w, h);
            draw_hollow_rect_mut(&mut canvas, rect, Rgb([255u8, 0, 0]));
        }
        DynamicImage::ImageRgb8(canvas)
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
    /// Whether debug mode is enabled
    pub enabled: bool,
}

/// Context available to all pipeline steps
#[derive(Clone)]
pub struct PipelineContext {
    pub sink: Arc<dyn LogSink>,
    pub debug: Option<DebugConfig>,
}

impl PipelineContext {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink, debug: None }
    }

    fn save_debug_output(&self, data: &FrameData, step_index: usize, step_name: &str) -> Result<()> {
        let Some(debug_config) = &self.debug else {
            return Ok(());
        };
        if !debug_config.enabled {
            return Ok(());
        }

        let step_dir_name = format!("{:02}_{}", step_index + 1,
            step_name.to_lowercase().replace(' ', "_"));
        let step_dir = debug_config.output_dir.join(&step_dir_name);
        std::fs::create_dir_all(&step_dir)?;

        let filename = format!("{:06}.png", data.frame_index);
        data.annotated().save(step_dir.join(&filename))
            .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;

        self.sink.debug(&format!("Debug: saved {}/{}", step_dir_name, filename));
        Ok(())
    }
}

impl Default for PipelineContext {
    fn default() -> Self {
        Self::new(Arc::new(LogCrateSink))
    }
}

/// Trait that all frame pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Transform one frame's data
    fn process(&self, data: FrameData, context: &PipelineContext) -> Result<FrameData>;

    /// Human-readable name for this step (used in logs and debug directories)
    fn name(&self) -> &str;
}

/// Composable per-frame pipeline
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline logging to the `log` facade
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            context: PipelineContext::default(),
        }
    }

    /// Route diagnostics to `sink`
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.context.sink = sink;
        self
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig {
            output_dir,
            enabled: true,
        });

        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order on one frame
    pub fn run(&self, frame: DynamicImage, frame_index: u64) -> Result<FrameData> {
        let mut data = FrameData::new(frame, frame_index);

        for (step_idx, step) in self.steps.iter().enumerate() {
            data = step.process(data, &self.context)?;
            self.context.save_debug_output(&data, step_idx, step.name())?;
        }

        Ok(data)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
