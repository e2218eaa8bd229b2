use crate::models::{FrameRecord, NO_READING};
use crate::segmentation::config::SegmentationConfig;

/// A stretch of samples sharing one value.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub number: f64,
    pub length: usize,
    /// Timestamp of the last sample in the run
    pub last_timestamp: String,
}

impl Run {
    pub fn new(number: f64, length: usize, last_timestamp: impl Into<String>) -> Self {
        Self {
            number,
            length,
            last_timestamp: last_timestamp.into(),
        }
    }

    /// Long enough return-to-zero to end a measurement
    pub fn is_idle(&self, config: &SegmentationConfig) -> bool {
        self.number == NO_READING && self.length > config.idle_min_run
    }
}

/// Collapse consecutive records with identical numbers.
pub fn run_length_encode(records: &[FrameRecord]) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for record in records {
        match runs.last_mut() {
            Some(run) if run.number == record.number => {
                run.length += 1;
                run.last_timestamp.clone_from(&record.timestamp);
            }
            _ => runs.push(Run::new(record.number, 1, record.timestamp.clone())),
        }
    }
    runs
}

/// Split runs at idle runs and drop groups holding nothing but zeros.
/// Idle runs themselves belong to no group.
pub fn split_at_idle(runs: Vec<Run>, config: &SegmentationConfig) -> Vec<Vec<Run>> {
    let mut groups: Vec<Vec<Run>> = Vec::new();
    let mut current: Vec<Run> = Vec::new();

    for run in runs {
        if run.is_idle(config) {
            groups.push(std::mem::take(&mut current));
        } else {
            current.push(run);
        }
    }
    groups.push(current);

    groups
        .into_iter()
        .filter(|group| group.iter().any(|run| run.number != NO_READING))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(values: &[(f64, usize)]) -> Vec<FrameRecord> {
        let mut out = Vec::new();
        for &(number, count) in values {
            for _ in 0..count {
                let index = out.len() as u64 + 1;
                out.push(FrameRecord::new(index, number, format!("t{:04}", index)));
            }
        }
        out
    }

    #[test]
    fn test_run_length_encode() {
        let runs = run_length_encode(&records(&[(0.0, 2), (5.5, 3), (0.0, 1)]));
        assert_eq!(
            runs,
            vec![
                Run::new(0.0, 2, "t0002"),
                Run::new(5.5, 3, "t0005"),
                Run::new(0.0, 1, "t0006"),
            ]
        );
    }

    #[test]
    fn test_run_length_encode_empty() {
        assert!(run_length_encode(&[]).is_empty());
    }

    #[test]
    fn test_idle_requires_zero_and_length() {
        let config = SegmentationConfig::default();
        assert!(Run::new(0.0, 31, "t").is_idle(&config));
        assert!(!Run::new(0.0, 30, "t").is_idle(&config));
        assert!(!Run::new(-1.0, 100, "t").is_idle(&config));
        assert!(!Run::new(3.0, 100, "t").is_idle(&config));
    }

    #[test]
    fn test_split_drops_zero_only_groups() {
        let config = SegmentationConfig::default();
        let runs = vec![
            Run::new(0.0, 5, "a"),
            Run::new(0.0, 40, "b"),
            Run::new(7.0, 35, "c"),
            Run::new(0.0, 3, "d"),
            Run::new(7.0, 2, "e"),
            Run::new(0.0, 31, "f"),
            Run::new(0.0, 50, "g"),
        ];
        let groups = split_at_idle(runs, &config);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 3);
        assert_eq!(groups[0][0].last_timestamp, "c");
    }

    #[test]
    fn test_short_zero_runs_do_not_split() {
        let config = SegmentationConfig::default();
        let runs = vec![
            Run::new(4.0, 40, "a"),
            Run::new(0.0, 30, "b"),
            Run::new(6.0, 40, "c"),
        ];
        let groups = split_at_idle(runs, &config);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 3);
    }
}
