use anyhow::Result;
use image::{Rgb, RgbImage};
use std::cell::Cell;

use weighlog::detection::{InferenceEngine, InputTensor, RawOutput};
use weighlog::video::{FrameRead, FrameSource};
use weighlog::{FrameAnalyzer, FrameRecord, GlyphDetection, SyntheticClock};

/// One scripted read outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Frame,
    Fail,
}

/// Frame source that plays back a fixed script of reads.
///
/// After the script runs out it either repeats `tail` forever or reports
/// end of stream.
pub struct ScriptedSource {
    fps: f64,
    steps: Vec<Step>,
    tail: Option<Step>,
    /// Total read attempts so far
    pub reads: usize,
}

impl ScriptedSource {
    pub fn new(fps: f64, steps: Vec<Step>) -> Self {
        Self { fps, steps, tail: None, reads: 0 }
    }

    /// `count` readable frames, then end of stream
    pub fn frames(fps: f64, count: usize) -> Self {
        Self::new(fps, vec![Step::Frame; count])
    }

    pub fn then_forever(mut self, step: Step) -> Self {
        self.tail = Some(step);
        self
    }
}

impl FrameSource for ScriptedSource {
    fn fps(&self) -> f64 {
        self.fps
    }

    fn read(&mut self) -> FrameRead {
        let index = self.reads;
        self.reads += 1;
        match self.steps.get(index).copied().or(self.tail) {
            Some(Step::Frame) => FrameRead::Frame(blank_frame(8, 8)),
            Some(Step::Fail) => FrameRead::Failed,
            None => FrameRead::EndOfStream,
        }
    }
}

pub fn blank_frame(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([20, 20, 20]))
}

/// Glyphs laid out left to right, one per digit
pub fn glyphs(digits: &[u8]) -> Vec<GlyphDetection> {
    digits
        .iter()
        .enumerate()
        .map(|(i, &digit)| GlyphDetection {
            left: i as f32 * 12.0,
            top: 4.0,
            width: 10.0,
            height: 20.0,
            confidence: 0.9,
            digit,
        })
        .collect()
}

/// Analyzer that reports the digits `script` gives for each frame index,
/// and remembers which frames it saw.
pub struct ScriptedAnalyzer<F: Fn(u64) -> Vec<u8>> {
    script: F,
    seen: std::cell::RefCell<Vec<u64>>,
}

impl<F: Fn(u64) -> Vec<u8>> ScriptedAnalyzer<F> {
    pub fn new(script: F) -> Self {
        Self { script, seen: Default::default() }
    }

    pub fn seen(&self) -> Vec<u64> {
        self.seen.borrow().clone()
    }
}

impl<F: Fn(u64) -> Vec<u8>> FrameAnalyzer for ScriptedAnalyzer<F> {
    fn analyze(&self, _frame: RgbImage, frame_index: u64) -> Result<Vec<GlyphDetection>> {
        self.seen.borrow_mut().push(frame_index);
        Ok(glyphs(&(self.script)(frame_index)))
    }
}

/// Analyzer whose every call fails
#[derive(Default)]
pub struct FailingAnalyzer {
    pub calls: Cell<usize>,
}

impl FrameAnalyzer for FailingAnalyzer {
    fn analyze(&self, _frame: RgbImage, frame_index: u64) -> Result<Vec<GlyphDetection>> {
        self.calls.set(self.calls.get() + 1);
        anyhow::bail!("inference failed on frame {}", frame_index)
    }
}

/// Engine returning the same raw rows for every input
pub struct FixedEngine {
    pub rows: Vec<Vec<f32>>,
}

impl InferenceEngine for FixedEngine {
    fn infer(&self, _input: &InputTensor) -> Result<RawOutput> {
        Ok(RawOutput::from_rows(&self.rows))
    }
}

/// A raw candidate row in detector-input space with one confident class
pub fn candidate(center_x: f32, center_y: f32, width: f32, height: f32, objectness: f32, digit: usize) -> Vec<f32> {
    let mut row = vec![center_x, center_y, width, height, objectness];
    let mut scores = vec![0.01; 10];
    scores[digit] = 0.95;
    row.extend(scores);
    row
}

pub fn start_clock() -> SyntheticClock {
    SyntheticClock::new(2024, 3, 15, 8, 30, 0)
}

/// Per-frame records from `(number, run length)` pairs, one second apart
pub fn records_from_runs(runs: &[(f64, usize)]) -> Vec<FrameRecord> {
    let mut clock = start_clock();
    let mut records = Vec::new();
    let mut frame_index = 0;
    for &(number, length) in runs {
        for _ in 0..length {
            frame_index += 1;
            records.push(FrameRecord::new(frame_index, number, clock.to_string()));
            clock.increment();
        }
    }
    records
}
