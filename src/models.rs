use serde::{Deserialize, Serialize};

/// Reading recorded when a frame produced no glyph detections at all.
pub const DETECTION_FAILURE: f64 = -1.0;

/// Reading recorded when the display shows nothing meaningful (scale at rest).
pub const NO_READING: f64 = 0.0;

/// Crop rectangle in source-frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Clamp the rectangle to a frame of the given size.
    /// Returns `None` when nothing of the rectangle lies inside the frame.
    pub fn clamp_to(&self, frame_width: u32, frame_height: u32) -> Option<CropRect> {
        if self.x >= frame_width || self.y >= frame_height {
            return None;
        }
        let w = self.w.min(frame_width - self.x);
        let h = self.h.min(frame_height - self.y);
        if w == 0 || h == 0 {
            return None;
        }
        Some(CropRect::new(self.x, self.y, w, h))
    }
}

impl Default for CropRect {
    fn default() -> Self {
        Self::new(880, 240, 120, 60)
    }
}

impl std::str::FromStr for CropRect {
    type Err = anyhow::Error;

    /// Parses `X,Y,W,H`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<u32> = s
            .split(',')
            .map(|p| p.trim().parse::<u32>())
            .collect::<Result<_, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid crop rectangle '{}': {}", s, e))?;
        match parts.as_slice() {
            [x, y, w, h] => Ok(CropRect::new(*x, *y, *w, *h)),
            _ => anyhow::bail!("Crop rectangle must be X,Y,W,H, got '{}'", s),
        }
    }
}

/// A single digit glyph found by the detector, in crop-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphDetection {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    pub digit: u8,
}

impl GlyphDetection {
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Intersection over union with another box.
    pub fn iou(&self, other: &GlyphDetection) -> f32 {
        let ix1 = self.left.max(other.left);
        let iy1 = self.top.max(other.top);
        let ix2 = self.right().min(other.right());
        let iy2 = self.bottom().min(other.bottom());
        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        if inter == 0.0 {
            return 0.0;
        }
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            return 0.0;
        }
        inter / union
    }
}

/// One sampled frame's decoded reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameRecord {
    pub frame_index: u64,
    /// Non-negative reading, [`NO_READING`], or [`DETECTION_FAILURE`].
    pub number: f64,
    pub timestamp: String,
}

impl FrameRecord {
    pub fn new(frame_index: u64, number: f64, timestamp: impl Into<String>) -> Self {
        Self {
            frame_index,
            number,
            timestamp: timestamp.into(),
        }
    }
}

/// A validated, de-noised weight reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementEvent {
    pub sequence_index: u32,
    pub value: f64,
    /// Timestamp of the last frame contributing to the winning run.
    pub timestamp: String,
}
