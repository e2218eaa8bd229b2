use anyhow::Result;
use image::RgbImage;
use std::path::Path;

use crate::detection::engine::{InferenceEngine, RawOutput, RtenEngine};
use crate::detection::letterbox::{to_input_tensor, Letterbox, LetterboxGeometry};
use crate::detection::suppression::non_max_suppression;
use crate::error::Error;
use crate::models::GlyphDetection;

/// Digit classes 0-9
pub const NUM_CLASSES: usize = 10;

/// Values per raw candidate: box (4), objectness (1), class scores
pub const ROW_STRIDE: usize = 5 + NUM_CLASSES;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    pub confidence_threshold: f32,
    pub nms_threshold: f32,
    /// Side of the square model input
    pub input_size: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            nms_threshold: 0.5,
            input_size: 320,
        }
    }
}

/// Runs the glyph model over a cropped display image
pub struct GlyphDetector {
    engine: Box<dyn InferenceEngine>,
    letterbox: Letterbox,
    config: DetectorConfig,
}

impl GlyphDetector {
    pub fn new(engine: Box<dyn InferenceEngine>, config: DetectorConfig) -> Self {
        Self {
            engine,
            letterbox: Letterbox::new(config.input_size),
            config,
        }
    }

    /// Load the model at `path` into an rten engine
    pub fn from_model_file(path: &Path, config: DetectorConfig) -> Result<Self, Error> {
        let engine = RtenEngine::load(path)?;
        Ok(Self::new(Box::new(engine), config))
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect digit glyphs in `image`. Boxes are in `image` coordinates.
    pub fn detect(&self, image: &RgbImage) -> Result<Vec<GlyphDetection>> {
        let (padded, geometry) = self.letterbox.apply(image);
        let input = to_input_tensor(&padded);
        let raw = self.engine.infer(&input)?;

        let candidates = decode_candidates(
            &raw,
            &geometry,
            image.width(),
            image.height(),
            self.config.confidence_threshold,
        )?;

        Ok(non_max_suppression(
            candidates,
            self.config.confidence_threshold,
            self.config.nms_threshold,
        ))
    }
}

/// Turn raw model rows into thresholded boxes in source coordinates
pub fn decode_candidates(
    raw: &RawOutput,
    geometry: &LetterboxGeometry,
    source_width: u32,
    source_height: u32,
    confidence_threshold: f32,
) -> Result<Vec<GlyphDetection>> {
    if raw.data.is_empty() {
        return Ok(Vec::new());
    }
    if raw.stride != ROW_STRIDE || raw.data.len() % raw.stride != 0 {
        return Err(Error::UnexpectedOutputShape(vec![raw.len(), raw.stride]).into());
    }

    let mut detections = Vec::new();
    for row in raw.rows() {
        let objectness = row[4];
        if objectness <= confidence_threshold {
            continue;
        }

        let scores = &row[5..];
        let (class_id, best) = scores
            .iter()
            .enumerate()
            .fold((0usize, f32::MIN), |(bi, bs), (i, &s)| if s > bs { (i, s) } else { (bi, bs) });
        let confidence = best * objectness;
        if confidence <= confidence_threshold {
            continue;
        }

        let (center_x, center_y, width, height) =
            geometry.to_source(row[0], row[1], row[2], row[3], source_width, source_height);

        detections.push(GlyphDetection {
            left: center_x - width * 0.5,
            top: center_y - height * 0.5,
            width,
            height,
            confidence,
            digit: class_id as u8,
        });
    }

    Ok(detections)
}
