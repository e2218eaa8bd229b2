use image::RgbImage;
use opencv::{
    core::Mat,
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};
use std::path::Path;

use crate::error::Error;
use crate::video::{FrameRead, FrameSource};

/// Video file decoded through OpenCV
pub struct OpenCvSource {
    capture: VideoCapture,
    fps: f64,
    /// Frame count reported by the container, 0 when unknown
    frame_count: u64,
    reads: u64,
}

impl OpenCvSource {
    /// Open `path`. `fps_override` replaces the container's frame rate.
    pub fn open(path: &Path, fps_override: Option<f64>) -> Result<Self, Error> {
        let open_error = |reason: String| Error::VideoOpen {
            path: path.to_path_buf(),
            reason,
        };

        let capture = VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)
            .map_err(|e| open_error(e.to_string()))?;
        if !capture.is_opened().map_err(|e| open_error(e.to_string()))? {
            return Err(open_error("capture did not open".to_string()));
        }

        let fps = match fps_override {
            Some(fps) => fps,
            None => capture.get(videoio::CAP_PROP_FPS).unwrap_or(0.0),
        };
        let frame_count = capture
            .get(videoio::CAP_PROP_FRAME_COUNT)
            .map(|n| if n.is_finite() && n > 0.0 { n as u64 } else { 0 })
            .unwrap_or(0);

        Ok(Self {
            capture,
            fps,
            frame_count,
            reads: 0,
        })
    }

    fn capture_frame(&mut self) -> opencv::Result<Option<RgbImage>> {
        let mut mat_frame = Mat::default();
        if !self.capture.read(&mut mat_frame)? || mat_frame.empty() {
            return Ok(None);
        }

        let mut rgb_mat = Mat::default();
        imgproc::cvt_color(
            &mat_frame,
            &mut rgb_mat,
            imgproc::COLOR_BGR2RGB,
            0,
            opencv::core::AlgorithmHint::ALGO_HINT_DEFAULT,
        )?;

        let width = rgb_mat.cols() as u32;
        let height = rgb_mat.rows() as u32;
        let data = rgb_mat.data_bytes()?.to_vec();
        Ok(RgbImage::from_vec(width, height, data))
    }
}

impl FrameSource for OpenCvSource {
    fn fps(&self) -> f64 {
        self.fps
    }

    fn read(&mut self) -> FrameRead {
        self.reads += 1;
        match self.capture_frame() {
            Ok(Some(frame)) => FrameRead::Frame(frame),
            // Past the last frame the container told us about: stream is done
            _ if self.frame_count > 0 && self.reads > self.frame_count => FrameRead::EndOfStream,
            _ => FrameRead::Failed,
        }
    }
}
