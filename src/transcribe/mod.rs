//! Speech transcription (Whisper).
//!
//! The transcriber is the first pipeline stage and the only one whose
//! failures are absorbed rather than surfaced: the gateway substitutes an
//! empty transcript and keeps scoring. Use [`TranscriberConfig::stub`] for
//! tests/deployments without model files.

mod error;

pub use error::TranscribeError;

use std::path::PathBuf;

use tracing::{debug, info, warn};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Converts audio samples into transcript text.
pub trait SpeechTranscriber: Send + Sync {
    /// Transcribes mono 16 kHz samples.
    fn transcribe(&self, samples: &[f32]) -> Result<String, TranscribeError>;

    /// Returns `true` if a real model backs this transcriber.
    fn is_model_loaded(&self) -> bool;
}

/// Whisper transcriber configuration.
#[derive(Debug, Clone)]
pub struct TranscriberConfig {
    /// Path to the GGML model file. `None` selects stub mode.
    pub model_path: Option<PathBuf>,

    /// Spoken language passed to Whisper. Default: `en`.
    pub language: String,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            language: "en".to_string(),
        }
    }
}

impl TranscriberConfig {
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: Some(model_path.into()),
            ..Self::default()
        }
    }

    /// Stub configuration: every transcription yields an empty transcript.
    pub fn stub() -> Self {
        Self::default()
    }
}

enum TranscriberBackend {
    Model { ctx: WhisperContext },
    Stub,
}

/// Whisper-backed transcriber (supports stub mode).
pub struct WhisperTranscriber {
    backend: TranscriberBackend,
    config: TranscriberConfig,
}

impl std::fmt::Debug for WhisperTranscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperTranscriber")
            .field(
                "backend",
                &match &self.backend {
                    TranscriberBackend::Model { .. } => "Model",
                    TranscriberBackend::Stub => "Stub",
                },
            )
            .field("language", &self.config.language)
            .finish()
    }
}

impl WhisperTranscriber {
    /// Loads the transcriber from a config (stub mode is supported).
    pub fn load(config: TranscriberConfig) -> Result<Self, TranscribeError> {
        let Some(path) = config.model_path.clone() else {
            warn!("Whisper running in STUB mode, transcripts will be empty");
            return Ok(Self {
                backend: TranscriberBackend::Stub,
                config,
            });
        };

        if !path.is_file() {
            return Err(TranscribeError::ModelNotFound { path });
        }

        let path_str = path.to_string_lossy();
        let ctx = WhisperContext::new_with_params(&path_str, WhisperContextParameters::default())
            .map_err(|e| TranscribeError::ModelLoadFailed {
                reason: e.to_string(),
            })?;

        info!(
            model_path = %path.display(),
            language = %config.language,
            "Whisper model loaded"
        );

        Ok(Self {
            backend: TranscriberBackend::Model { ctx },
            config,
        })
    }

    fn transcribe_with_model(
        &self,
        ctx: &WhisperContext,
        samples: &[f32],
    ) -> Result<String, TranscribeError> {
        let mut state = ctx
            .create_state()
            .map_err(|e| TranscribeError::InferenceFailed {
                reason: format!("failed to create whisper state: {e}"),
            })?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(&self.config.language));
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state
            .full(params, samples)
            .map_err(|e| TranscribeError::InferenceFailed {
                reason: e.to_string(),
            })?;

        let num_segments = state.full_n_segments();
        let mut pieces = Vec::new();
        for i in 0..num_segments {
            let Some(segment) = state.get_segment(i) else {
                continue;
            };
            match segment.to_str() {
                Ok(text) => pieces.push(text.trim().to_string()),
                Err(_) => continue,
            }
        }

        let transcript = pieces.join(" ").trim().to_string();

        debug!(
            segments = num_segments,
            transcript_len = transcript.len(),
            "Whisper transcription complete"
        );

        Ok(transcript)
    }
}

impl SpeechTranscriber for WhisperTranscriber {
    fn transcribe(&self, samples: &[f32]) -> Result<String, TranscribeError> {
        match &self.backend {
            TranscriberBackend::Model { ctx } => self.transcribe_with_model(ctx, samples),
            TranscriberBackend::Stub => {
                debug!(samples = samples.len(), "Stub transcription");
                Ok(String::new())
            }
        }
    }

    fn is_model_loaded(&self) -> bool {
        matches!(self.backend, TranscriberBackend::Model { .. })
    }
}

/// Fixed-output transcriber for tests.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    text: String,
    fail: bool,
}

#[cfg(any(test, feature = "mock"))]
impl MockTranscriber {
    /// Returns `text` for every transcription.
    pub fn returning(text: &str) -> Self {
        Self {
            text: text.to_string(),
            fail: false,
        }
    }

    /// Fails every transcription (exercises the empty-transcript fallback).
    pub fn failing() -> Self {
        Self {
            text: String::new(),
            fail: true,
        }
    }
}

#[cfg(any(test, feature = "mock"))]
impl SpeechTranscriber for MockTranscriber {
    fn transcribe(&self, _samples: &[f32]) -> Result<String, TranscribeError> {
        if self.fail {
            return Err(TranscribeError::InferenceFailed {
                reason: "mock transcriber configured to fail".to_string(),
            });
        }
        Ok(self.text.clone())
    }

    fn is_model_loaded(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_transcriber_yields_empty_transcript() {
        let transcriber = WhisperTranscriber::load(TranscriberConfig::stub()).unwrap();
        assert!(!transcriber.is_model_loaded());
        let text = transcriber.transcribe(&[0.0; 1600]).unwrap();
        assert!(text.is_empty());
    }

    #[test]
    fn load_rejects_missing_model_file() {
        let config = TranscriberConfig::new("/nonexistent/ggml-base.bin");
        let err = WhisperTranscriber::load(config).unwrap_err();
        assert!(matches!(err, TranscribeError::ModelNotFound { .. }));
    }

    #[test]
    fn mock_transcriber_returns_configured_text() {
        let mock = MockTranscriber::returning("machine learning helps");
        assert_eq!(mock.transcribe(&[]).unwrap(), "machine learning helps");
    }

    #[test]
    fn mock_transcriber_can_fail() {
        let mock = MockTranscriber::failing();
        assert!(mock.transcribe(&[]).is_err());
    }
}
