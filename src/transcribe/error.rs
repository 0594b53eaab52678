use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("whisper model not found at path: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("failed to load whisper model: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("transcription failed: {reason}")]
    InferenceFailed { reason: String },
}
