use tracing::debug;

use crate::config::ConfidenceKind;
use crate::constants::{
    FRAME_ABSENT_CONFIDENCE, FRAME_PRESENT_CONFIDENCE, LENGTH_SATURATION_WORDS, round2,
};
use crate::vision::{Emotion, emotion_confidence};

/// What the gateway learned about the submitted frame, if any.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameSignal {
    /// A frame accompanied the answer.
    pub present: bool,
    /// Classifier label, when the emotion policy ran on the frame.
    pub emotion: Option<Emotion>,
}

impl FrameSignal {
    /// No frame was submitted.
    pub fn absent() -> Self {
        Self::default()
    }

    /// A frame was submitted but never classified.
    pub fn present() -> Self {
        Self {
            present: true,
            emotion: None,
        }
    }

    /// A classified frame.
    pub fn classified(emotion: Option<Emotion>) -> Self {
        Self {
            present: true,
            emotion,
        }
    }
}

/// Confidence proxy from transcript length: saturates at
/// [`LENGTH_SATURATION_WORDS`] words.
pub fn confidence_from_speech(transcript: &str) -> f32 {
    let words = transcript.split_whitespace().count();
    round2((words as f32 / LENGTH_SATURATION_WORDS as f32).min(1.0))
}

/// Confidence proxy from frame presence alone.
pub fn confidence_from_presence(frame_present: bool) -> f32 {
    if frame_present {
        FRAME_PRESENT_CONFIDENCE
    } else {
        FRAME_ABSENT_CONFIDENCE
    }
}

/// Confidence estimator with a configuration-selected policy.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceEstimator {
    policy: ConfidenceKind,
}

impl ConfidenceEstimator {
    pub fn new(policy: ConfidenceKind) -> Self {
        Self { policy }
    }

    /// The active policy.
    pub fn policy(&self) -> ConfidenceKind {
        self.policy
    }

    /// Estimates confidence in [0,1] from the transcript and frame signal.
    pub fn estimate(&self, transcript: &str, frame: FrameSignal) -> f32 {
        let confidence = match self.policy {
            ConfidenceKind::Length => confidence_from_speech(transcript),
            ConfidenceKind::Presence => confidence_from_presence(frame.present),
            ConfidenceKind::Emotion => emotion_confidence(frame.emotion),
            ConfidenceKind::Blended => {
                let speech = confidence_from_speech(transcript);
                let face = confidence_from_presence(frame.present);
                round2((speech + face) / 2.0)
            }
        };

        debug!(policy = self.policy.as_str(), confidence, "Confidence estimated");
        confidence
    }
}
