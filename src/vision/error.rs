use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("emotion model not found at path: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("failed to load emotion model: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("emotion inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("invalid image data: {reason}")]
    InvalidImage { reason: String },

    #[error("invalid data URL: {reason}")]
    InvalidDataUrl { reason: String },
}

impl From<ort::Error> for VisionError {
    fn from(err: ort::Error) -> Self {
        VisionError::InferenceFailed {
            reason: err.to_string(),
        }
    }
}

impl From<image::ImageError> for VisionError {
    fn from(err: image::ImageError) -> Self {
        VisionError::InvalidImage {
            reason: err.to_string(),
        }
    }
}
