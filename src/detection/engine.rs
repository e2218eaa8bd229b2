use anyhow::Result;
use rten::Model;
use rten_tensor::prelude::*;
use rten_tensor::{NdTensor, NdTensorView};
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Planar `[1, 3, height, width]` float input
#[derive(Debug, Clone)]
pub struct InputTensor {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

/// Raw detector output: `rows` candidates of `stride` values each,
/// laid out as `[cx, cy, w, h, objectness, class scores...]`
#[derive(Debug, Clone)]
pub struct RawOutput {
    pub stride: usize,
    pub data: Vec<f32>,
}

impl RawOutput {
    pub fn new(stride: usize, data: Vec<f32>) -> Self {
        Self { stride, data }
    }

    /// Build from per-candidate rows (all rows must have the same length)
    pub fn from_rows(rows: &[Vec<f32>]) -> Self {
        let stride = rows.first().map(|r| r.len()).unwrap_or(0);
        Self {
            stride,
            data: rows.iter().flatten().copied().collect(),
        }
    }

    pub fn len(&self) -> usize {
        if self.stride == 0 { 0 } else { self.data.len() / self.stride }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.stride.max(1))
    }
}

/// Something that can run the glyph model once
pub trait InferenceEngine: Send + Sync {
    fn infer(&self, input: &InputTensor) -> Result<RawOutput>;
}

/// Inference engine backed by an rten model
pub struct RtenEngine {
    model: Model,
    path: PathBuf,
}

impl RtenEngine {
    pub fn load(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Err(Error::ModelLoad {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }
        let model = Model::load_file(path).map_err(|e| Error::ModelLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            model,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl InferenceEngine for RtenEngine {
    fn infer(&self, input: &InputTensor) -> Result<RawOutput> {
        let tensor = NdTensorView::from_data([1, 3, input.height, input.width], input.data.as_slice());

        let output = self
            .model
            .run_one(tensor.into(), None)
            .map_err(|e| anyhow::anyhow!("Inference failed for {}: {}", self.path.display(), e))?;
        let output: NdTensor<f32, 3> = output
            .try_into()
            .map_err(|e| anyhow::anyhow!("Model output is not a 3-d float tensor: {:?}", e))?;

        let [batch, _rows, stride] = output.shape();
        if batch != 1 {
            return Err(Error::UnexpectedOutputShape(output.shape().to_vec()).into());
        }

        Ok(RawOutput::new(stride, output.to_vec()))
    }
}
