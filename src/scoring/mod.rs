//! Answer scoring, confidence estimation, and the final blend.
//!
//! Every number leaving this module is rounded to two decimals and lies in
//! [0,1]. The strategies mirror the configuration enums in
//! [`crate::config`]: the gateway builds one [`AnswerScorer`] and one
//! [`ConfidenceEstimator`] at startup and reuses them per request.

mod answer;
mod confidence;
pub mod error;


pub use answer::{AnswerScorer, lexical_overlap};
pub use confidence::{
    ConfidenceEstimator, FrameSignal, confidence_from_presence, confidence_from_speech,
};
pub use error::ScoringError;

use crate::constants::{ANSWER_WEIGHT, CONFIDENCE_WEIGHT, round2};

/// Blends answer and confidence scores: 70% answer, 30% confidence,
/// rounded to two decimals.
pub fn combine_scores(answer_score: f32, confidence_score: f32) -> f32 {
    round2(answer_score * ANSWER_WEIGHT + confidence_score * CONFIDENCE_WEIGHT)
}
