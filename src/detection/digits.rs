use crate::models::{GlyphDetection, DETECTION_FAILURE, NO_READING};

/// Compose glyphs into a number, reading left to right.
///
/// The rightmost glyph is always the tenths place, so `1 2 3` reads `12.3`.
/// Returns `None` for an empty list.
pub fn decode_digits(detections: &[GlyphDetection]) -> Option<f64> {
    if detections.is_empty() {
        return None;
    }

    let mut ordered: Vec<&GlyphDetection> = detections.iter().collect();
    ordered.sort_by(|a, b| a.left.total_cmp(&b.left));

    let digits = ordered
        .iter()
        .fold(0.0f64, |acc, det| acc * 10.0 + f64::from(det.digit));
    Some(digits / 10.0)
}

/// Readings of 1.0 or less mean the scale is at rest.
pub fn clamp_reading(value: f64) -> f64 {
    if value <= 1.0 { NO_READING } else { value }
}

/// The value recorded for one sampled frame.
pub fn frame_reading(detections: &[GlyphDetection]) -> f64 {
    match decode_digits(detections) {
        Some(value) => clamp_reading(value),
        None => DETECTION_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(left: f32, digit: u8) -> GlyphDetection {
        GlyphDetection { left, top: 0.0, width: 5.0, height: 10.0, confidence: 0.9, digit }
    }

    #[test]
    fn test_decode_reads_left_to_right() {
        let dets = [glyph(0.0, 1), glyph(5.0, 2), glyph(10.0, 3)];
        assert_eq!(decode_digits(&dets), Some(12.3));
    }

    #[test]
    fn test_decode_sorts_by_left_edge() {
        let dets = [glyph(10.0, 3), glyph(0.0, 1), glyph(5.0, 2)];
        assert_eq!(decode_digits(&dets), Some(12.3));
    }

    #[test]
    fn test_single_digit_is_tenths() {
        assert_eq!(decode_digits(&[glyph(42.0, 7)]), Some(0.7));
        assert_eq!(decode_digits(&[glyph(-3.0, 7)]), Some(0.7));
    }

    #[test]
    fn test_empty_is_none() {
        assert_eq!(decode_digits(&[]), None);
        assert_eq!(frame_reading(&[]), DETECTION_FAILURE);
    }

    #[test]
    fn test_clamp_rule() {
        assert_eq!(clamp_reading(0.0), 0.0);
        assert_eq!(clamp_reading(0.7), 0.0);
        assert_eq!(clamp_reading(1.0), 0.0);
        assert_eq!(clamp_reading(1.1), 1.1);
        assert_eq!(clamp_reading(12.5), 12.5);
    }

    #[test]
    fn test_frame_reading_clamps_small_values() {
        assert_eq!(frame_reading(&[glyph(0.0, 1), glyph(5.0, 0)]), 0.0);
        assert_eq!(frame_reading(&[glyph(0.0, 2), glyph(5.0, 5)]), 2.5);
    }
}
