//! Settings file.
//!
//! Loaded from `settings.json` at startup. Holds the display crop, the model
//! and its thresholds, and the sampling and segmentation parameters. A
//! missing file is created with defaults; missing fields take defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::detection::DetectorConfig;
use crate::driver::DriverConfig;
use crate::models::CropRect;
use crate::segmentation::SegmentationConfig;

pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Display region in source-frame pixels
    pub crop: CropRect,
    /// Detection model (.onnx or .rten)
    pub model_path: PathBuf,
    /// Minimum objectness and class confidence (0.0-1.0)
    pub confidence_threshold: f32,
    /// IoU above which the weaker of two boxes is dropped (0.0-1.0)
    pub nms_threshold: f32,
    /// Side of the square model input
    pub input_size: u32,
    /// Every crop is resized to this before letterboxing
    pub working_size: FrameSize,
    pub sample_interval: u64,
    pub max_consecutive_failures: u32,
    pub segmentation: SegmentationConfig,
}

/// Per-run replacements from the command line
#[derive(Clone, Debug, Default)]
pub struct SettingsOverrides {
    /// Also written back to the settings file
    pub crop: Option<CropRect>,
    pub model_path: Option<PathBuf>,
    pub confidence_threshold: Option<f32>,
    pub nms_threshold: Option<f32>,
}

impl Default for Settings {
    fn default() -> Self {
        let detector = DetectorConfig::default();
        let driver = DriverConfig::default();
        Self {
            crop: CropRect::default(),
            model_path: PathBuf::from("onnx_model/yolov6s.onnx"),
            confidence_threshold: detector.confidence_threshold,
            nms_threshold: detector.nms_threshold,
            input_size: detector.input_size,
            working_size: FrameSize { width: 240, height: 120 },
            sample_interval: driver.sample_interval,
            max_consecutive_failures: driver.max_consecutive_failures,
            segmentation: SegmentationConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, writing defaults there if the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let settings = Settings::default();
            settings.save(path)?;
            return Ok(settings);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write settings file {}", path.display()))?;
        Ok(())
    }

    /// Apply `overrides`, then validate. A new crop is saved to `path` only
    /// when the overridden settings are valid; on error nothing changes.
    pub fn apply_overrides(&mut self, overrides: SettingsOverrides, path: &Path) -> Result<()> {
        let mut updated = self.clone();
        if let Some(crop) = overrides.crop {
            updated.crop = crop;
        }
        if let Some(model_path) = overrides.model_path {
            updated.model_path = model_path;
        }
        if let Some(conf) = overrides.confidence_threshold {
            updated.confidence_threshold = conf;
        }
        if let Some(nms) = overrides.nms_threshold {
            updated.nms_threshold = nms;
        }
        updated.validate()?;

        if let Some(crop) = overrides.crop {
            let mut persisted = self.clone();
            persisted.crop = crop;
            persisted.save(path)?;
        }

        *self = updated;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("confidence_threshold", self.confidence_threshold),
            ("nms_threshold", self.nms_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("{} must be within [0, 1], got {}", name, value);
            }
        }
        if self.crop.w == 0 || self.crop.h == 0 {
            anyhow::bail!("crop rectangle must have a non-zero size: {:?}", self.crop);
        }
        if self.input_size == 0 || self.working_size.width == 0 || self.working_size.height == 0 {
            anyhow::bail!("input_size and working_size must be non-zero");
        }
        if self.sample_interval == 0 || self.max_consecutive_failures == 0 {
            anyhow::bail!("sample_interval and max_consecutive_failures must be non-zero");
        }
        Ok(())
    }

    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            confidence_threshold: self.confidence_threshold,
            nms_threshold: self.nms_threshold,
            input_size: self.input_size,
        }
    }

    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            sample_interval: self.sample_interval,
            max_consecutive_failures: self.max_consecutive_failures,
        }
    }
}
