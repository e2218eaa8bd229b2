//! Typed errors for the conditions callers need to tell apart.
//!
//! Everything else travels as `anyhow::Error` with context attached.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The detection model could not be loaded. Fatal for the video.
    #[error("failed to load detection model {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    /// No `YYYYMMDDHHMMSS` token in the video file name
    #[error("no 14-digit timestamp found in file name '{0}'")]
    MissingTimestamp(String),

    #[error("timestamp token '{0}' is out of range")]
    InvalidTimestamp(String),

    #[error("failed to open video {path}: {reason}")]
    VideoOpen { path: PathBuf, reason: String },

    /// Model output is not `[1, N, 5 + classes]`
    #[error("unexpected model output shape {0:?}")]
    UnexpectedOutputShape(Vec<usize>),
}
