//! Frame sources the temporal driver can read from.

pub mod sequence;
#[cfg(feature = "opencv")]
pub mod capture;

pub use sequence::ImageSequenceSource;

use image::RgbImage;
use std::path::Path;

use crate::error::Error;

/// Outcome of one read attempt
#[derive(Debug)]
pub enum FrameRead {
    Frame(RgbImage),
    /// This frame could not be decoded; later reads may still succeed
    Failed,
    EndOfStream,
}

pub trait FrameSource {
    /// Frames per second as reported by the container
    fn fps(&self) -> f64;

    fn read(&mut self) -> FrameRead;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn fps(&self) -> f64 {
        (**self).fps()
    }

    fn read(&mut self) -> FrameRead {
        (**self).read()
    }
}

/// Whole frames per clock tick, never below 1. Fractional rates are
/// truncated, so 29.97 ticks every 29 frames.
pub fn frames_per_second(fps: f64) -> u64 {
    if fps.is_finite() && fps >= 1.0 {
        fps as u64
    } else {
        1
    }
}

/// Open `path` with the matching backend.
///
/// Directories are read as image sequences at `fps` (default 30). Files need
/// the `opencv` feature.
pub fn open_source(path: &Path, fps: Option<f64>) -> Result<Box<dyn FrameSource + Send>, Error> {
    if path.is_dir() {
        let source = ImageSequenceSource::open(path, fps.unwrap_or(30.0))?;
        return Ok(Box::new(source));
    }

    #[cfg(feature = "opencv")]
    {
        let source = capture::OpenCvSource::open(path, fps)?;
        Ok(Box::new(source))
    }

    #[cfg(not(feature = "opencv"))]
    {
        Err(Error::VideoOpen {
            path: path.to_path_buf(),
            reason: "video files need the `opencv` feature; pass a directory of frames instead".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_per_second_truncates() {
        assert_eq!(frames_per_second(29.97), 29);
        assert_eq!(frames_per_second(30.0), 30);
        assert_eq!(frames_per_second(59.94), 59);
        assert_eq!(frames_per_second(25.0), 25);
        assert_eq!(frames_per_second(0.0), 1);
        assert_eq!(frames_per_second(f64::NAN), 1);
    }
}
