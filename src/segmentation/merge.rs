use std::collections::HashMap;

use crate::segmentation::config::SegmentationConfig;
use crate::segmentation::runs::Run;

/// Merge runs sharing a value: lengths add up, the latest timestamp wins.
/// Output keeps the order in which each value first appeared.
pub fn merge_duplicates(group: &[Run]) -> Vec<Run> {
    let mut merged: Vec<Run> = Vec::new();
    let mut index_of: HashMap<u64, usize> = HashMap::new();

    for run in group {
        match index_of.get(&run.number.to_bits()) {
            Some(&idx) => {
                let entry = &mut merged[idx];
                entry.length += run.length;
                if run.last_timestamp > entry.last_timestamp {
                    entry.last_timestamp.clone_from(&run.last_timestamp);
                }
            }
            None => {
                index_of.insert(run.number.to_bits(), merged.len());
                merged.push(run.clone());
            }
        }
    }

    merged
}

/// The value held longest in a consolidated group, if any value qualifies.
/// Ties go to the value seen first.
pub fn representative<'a>(consolidated: &'a [Run], config: &SegmentationConfig) -> Option<&'a Run> {
    consolidated
        .iter()
        .filter(|run| run.number >= config.min_value && run.length > config.min_run)
        .fold(None, |best: Option<&Run>, run| match best {
            Some(b) if b.length >= run.length => Some(b),
            _ => Some(run),
        })
}
