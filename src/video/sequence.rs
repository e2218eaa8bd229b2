use image::ImageReader;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::video::{FrameRead, FrameSource};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// A directory of still frames, played back in file-name order
pub struct ImageSequenceSource {
    frames: Vec<PathBuf>,
    next: usize,
    fps: f64,
}

impl ImageSequenceSource {
    pub fn open(dir: &Path, fps: f64) -> Result<Self, Error> {
        let entries = std::fs::read_dir(dir).map_err(|e| Error::VideoOpen {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut frames: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        frames.sort();

        if frames.is_empty() {
            return Err(Error::VideoOpen {
                path: dir.to_path_buf(),
                reason: "no image frames found".to_string(),
            });
        }

        Ok(Self { frames, next: 0, fps })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for ImageSequenceSource {
    fn fps(&self) -> f64 {
        self.fps
    }

    fn read(&mut self) -> FrameRead {
        let Some(path) = self.frames.get(self.next) else {
            return FrameRead::EndOfStream;
        };
        self.next += 1;

        match ImageReader::open(path).and_then(|r| r.with_guessed_format()) {
            Ok(reader) => match reader.decode() {
                Ok(img) => FrameRead::Frame(img.to_rgb8()),
                Err(_) => FrameRead::Failed,
            },
            Err(_) => FrameRead::Failed,
        }
    }
}
