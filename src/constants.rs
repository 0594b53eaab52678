//! Fixed pipeline constants.
//!
//! The blend weights and heuristic anchors are product constants, not
//! configuration: every deployment scores the same way.

/// Reference answer used when `VIVA_REFERENCE_ANSWER` is not set.
pub const DEFAULT_REFERENCE_ANSWER: &str =
    "Machine learning is a subset of artificial intelligence that enables systems to learn from data.";

/// Weight of the answer-similarity score in the final blend.
pub const ANSWER_WEIGHT: f32 = 0.7;

/// Weight of the confidence signal in the final blend.
pub const CONFIDENCE_WEIGHT: f32 = 0.3;

/// Word count at which the length-based confidence heuristic saturates.
pub const LENGTH_SATURATION_WORDS: usize = 25;

/// Confidence assigned when a webcam frame accompanies the answer.
pub const FRAME_PRESENT_CONFIDENCE: f32 = 0.8;

/// Confidence assigned when no frame was submitted.
pub const FRAME_ABSENT_CONFIDENCE: f32 = 0.4;

/// Confidence for emotion labels outside the known table.
pub const UNKNOWN_EMOTION_CONFIDENCE: f32 = 0.5;

/// Sample rate Whisper expects.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Side length of the square grayscale crop fed to the emotion classifier.
pub const EMOTION_INPUT_SIZE: u32 = 48;

/// Number of emotion classes the classifier emits.
pub const EMOTION_CLASS_COUNT: usize = 7;

/// Response header reporting which scoring strategies produced the result.
pub const VIVA_POLICY_HEADER: &str = "x-viva-policy";

/// Rounds to two decimal places, the precision of every reported score.
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_rounds_to_nearest_hundredth() {
        assert_eq!(round2(0.666), 0.67);
        assert_eq!(round2(0.664), 0.66);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(1.0), 1.0);
    }

    #[test]
    fn weights_sum_to_one() {
        assert!((ANSWER_WEIGHT + CONFIDENCE_WEIGHT - 1.0).abs() < f32::EPSILON);
    }
}
