//! CSV export of measurement tables.
//!
//! Files start with a UTF-8 byte order mark so spreadsheet tools pick the
//! right encoding.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::models::{FrameRecord, MeasurementEvent};

const BOM: &[u8] = b"\xEF\xBB\xBF";

const MEASUREMENT_HEADER: &str = "measurement,value,timestamp";
const FRAME_HEADER: &str = "frame,number,timestamp";

/// `<video file name>_result.csv`
pub fn result_file_name(video: &Path) -> String {
    let name = video
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string());
    format!("{}_result.csv", name)
}

/// Where the result table for `video` goes inside `out_dir`
pub fn result_path(out_dir: &Path, video: &Path) -> PathBuf {
    out_dir.join(result_file_name(video))
}

pub fn write_measurements(path: &Path, events: &[MeasurementEvent]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file {}", path.display()))?;
    let mut out = BufWriter::new(file);

    out.write_all(BOM).context("Failed to write CSV header")?;
    writeln!(out, "{}", MEASUREMENT_HEADER).context("Failed to write CSV header")?;
    for event in events {
        writeln!(out, "{},{:.1},{}", event.sequence_index, event.value, event.timestamp)
            .context("Failed to write CSV row")?;
    }
    out.flush().context("Failed to flush CSV file")?;
    Ok(())
}

/// Raw per-frame readings, for checking what the segmenter saw
pub fn write_frame_records(path: &Path, records: &[FrameRecord]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file {}", path.display()))?;
    let mut out = BufWriter::new(file);

    out.write_all(BOM).context("Failed to write CSV header")?;
    writeln!(out, "{}", FRAME_HEADER).context("Failed to write CSV header")?;
    for record in records {
        writeln!(out, "{},{:.1},{}", record.frame_index, record.number, record.timestamp)
            .context("Failed to write CSV row")?;
    }
    out.flush().context("Failed to flush CSV file")?;
    Ok(())
}
