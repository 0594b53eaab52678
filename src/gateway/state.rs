use std::sync::Arc;

use crate::scoring::{AnswerScorer, ConfidenceEstimator};
use crate::transcribe::SpeechTranscriber;
use crate::vision::EmotionClassifier;

/// Shared per-process state behind the evaluate handler.
///
/// Model handles load once at startup and are read-only afterwards; every
/// request clones the `Arc`s.
pub struct HandlerState<T, E>
where
    T: SpeechTranscriber + 'static,
    E: EmotionClassifier + 'static,
{
    pub transcriber: Arc<T>,

    pub classifier: Arc<E>,

    pub scorer: Arc<AnswerScorer>,

    pub estimator: ConfidenceEstimator,

    pub reference_answer: Arc<String>,
}

impl<T, E> Clone for HandlerState<T, E>
where
    T: SpeechTranscriber + 'static,
    E: EmotionClassifier + 'static,
{
    fn clone(&self) -> Self {
        Self {
            transcriber: self.transcriber.clone(),
            classifier: self.classifier.clone(),
            scorer: self.scorer.clone(),
            estimator: self.estimator,
            reference_answer: self.reference_answer.clone(),
        }
    }
}

impl<T, E> HandlerState<T, E>
where
    T: SpeechTranscriber + 'static,
    E: EmotionClassifier + 'static,
{
    pub fn new(
        transcriber: Arc<T>,
        classifier: Arc<E>,
        scorer: Arc<AnswerScorer>,
        estimator: ConfidenceEstimator,
        reference_answer: String,
    ) -> Self {
        Self {
            transcriber,
            classifier,
            scorer,
            estimator,
            reference_answer: Arc::new(reference_answer),
        }
    }

    /// `"{scorer}+{confidence}"`, reported in the policy response header.
    pub fn policy_header_value(&self) -> String {
        format!(
            "{}+{}",
            self.scorer.kind().as_str(),
            self.estimator.policy().as_str()
        )
    }
}
