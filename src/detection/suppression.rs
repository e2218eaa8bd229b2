use crate::models::GlyphDetection;

/// Class-agnostic greedy non-maximum suppression.
///
/// Boxes at or below `score_threshold` are dropped first. The rest are
/// visited in descending confidence order and a box is suppressed when its
/// IoU with an already kept box exceeds `iou_threshold`.
pub fn non_max_suppression(
    boxes: Vec<GlyphDetection>,
    score_threshold: f32,
    iou_threshold: f32,
) -> Vec<GlyphDetection> {
    let mut candidates: Vec<GlyphDetection> = boxes
        .into_iter()
        .filter(|b| b.confidence > score_threshold)
        .collect();
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<GlyphDetection> = Vec::with_capacity(candidates.len());
    'outer: for candidate in candidates {
        for k in &kept {
            if k.iou(&candidate) > iou_threshold {
                continue 'outer;
            }
        }
        kept.push(candidate);
    }
    kept
}
