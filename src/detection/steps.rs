use crate::pipeline::{FrameData, PipelineStep, PipelineContext};
use crate::detection::detector::GlyphDetector;
use crate::models::CropRect;
use anyhow::Result;
use image::imageops::FilterType;

/// Cut the display region out of the full frame
pub struct CropStep {
    pub rect: CropRect,
}

impl PipelineStep for CropStep {
    fn process(&self, data: FrameData, _context: &PipelineContext) -> Result<FrameData> {
        let (width, height) = (data.image.width(), data.image.height());
        let rect = self.rect.clamp_to(width, height).ok_or_else(|| {
            anyhow::anyhow!(
                "Crop rectangle {:?} lies outside the {}x{} frame",
                self.rect, width, height
            )
        })?;

        let cropped = data.image.crop_imm(rect.x, rect.y, rect.w, rect.h);
        Ok(data.with_image(cropped))
    }

    fn name(&self) -> &str {
        "Crop"
    }
}

/// Normalize the crop to a fixed working resolution (ignores aspect ratio)
pub struct ResizeStep {
    pub width: u32,
    pub height: u32,
}

impl PipelineStep for ResizeStep {
    fn process(&self, data: FrameData, _context: &PipelineContext) -> Result<FrameData> {
        if data.image.width() == self.width && data.image.height() == self.height {
            return Ok(data);
        }
        let resized = data.image.resize_exact(self.width, self.height, FilterType::Triangle);
        Ok(data.with_image(resized))
    }

    fn name(&self) -> &str {
        "Resize"
    }
}

/// Run the glyph detector on the current image
pub struct DetectStep {
    pub detector: GlyphDetector,
}

impl PipelineStep for DetectStep {
    fn process(&self, mut data: FrameData, context: &PipelineContext) -> Result<FrameData> {
        let rgb = data.image.to_rgb8();
        data.detections = self.detector.detect(&rgb)?;

        let glyphs: Vec<String> = data
            .detections
            .iter()
            .map(|d| format!("{}:{:.2}", d.digit, d.confidence))
            .collect();
        context.sink.debug(&format!(
            "frame {}: {} glyph(s) detected [{}]",
            data.frame_index,
            data.detections.len(),
            glyphs.join(" ")
        ));
        Ok(data)
    }

    fn name(&self) -> &str {
        "Glyph Detection"
    }
}
