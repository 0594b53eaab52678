//! Viva library crate (used by the server binary and integration tests).
//!
//! Viva scores spoken interview answers. A submission (audio plus an
//! optional webcam frame) flows through a fixed pipeline:
//!
//! 1. [`audio`] decodes the WAV upload into mono 16 kHz samples.
//! 2. [`transcribe`] turns the samples into a transcript (Whisper).
//! 3. [`scoring`] compares the transcript to the reference answer and
//!    estimates a confidence proxy from the transcript and frame.
//! 4. [`gateway`] exposes the pipeline over HTTP and blends the two
//!    scores into the final result.
//!
//! [`vision`] classifies the frame's facial emotion when the configured
//! confidence policy reads it, and [`embedding`] backs the semantic answer
//! scorer. Every model wrapper supports a stub mode so the service runs
//! without model files.
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod audio;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod gateway;
pub mod scoring;
pub mod transcribe;
pub mod vision;

pub use audio::{AudioError, decode_wav};
pub use config::{Config, ConfidenceKind, ConfigError, ScorerKind};
pub use constants::{
    ANSWER_WEIGHT, CONFIDENCE_WEIGHT, DEFAULT_REFERENCE_ANSWER, VIVA_POLICY_HEADER, round2,
};
pub use embedding::{
    EMBED_MAX_SEQ_LEN, EmbedderConfig, EmbeddingError, STUB_EMBEDDING_DIM, SentenceEmbedder,
    cosine_similarity,
};
pub use gateway::{EvaluateResponse, GatewayError, HandlerState, create_router_with_state};
pub use scoring::{
    AnswerScorer, ConfidenceEstimator, FrameSignal, ScoringError, combine_scores,
    confidence_from_presence, confidence_from_speech, lexical_overlap,
};
pub use transcribe::{SpeechTranscriber, TranscribeError, TranscriberConfig, WhisperTranscriber};
pub use vision::{
    ClassifierConfig, Emotion, EmotionClassifier, FerClassifier, VisionError, decode_data_url,
    emotion_confidence,
};

#[cfg(any(test, feature = "mock"))]
pub use transcribe::MockTranscriber;
#[cfg(any(test, feature = "mock"))]
pub use vision::MockEmotionClassifier;
