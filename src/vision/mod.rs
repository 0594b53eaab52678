//! Webcam frame handling and emotion classification.
//!
//! The classifier is a FER-style ONNX model: 48x48 grayscale in, 7-class
//! softmax out. Use [`ClassifierConfig::stub`] for tests/deployments
//! without model files; the stub labels every frame `neutral`.

mod error;

pub use error::VisionError;

use std::path::PathBuf;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::imageops::FilterType;
use ort::session::{Session, builder::GraphOptimizationLevel};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::constants::{EMOTION_CLASS_COUNT, EMOTION_INPUT_SIZE, UNKNOWN_EMOTION_CONFIDENCE};

/// Facial emotion label, in the classifier's class order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emotion {
    Angry,
    Disgust,
    Fear,
    Happy,
    Sad,
    Surprise,
    Neutral,
}

impl Emotion {
    /// Label string reported in the API response.
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Angry => "angry",
            Emotion::Disgust => "disgust",
            Emotion::Fear => "fear",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Surprise => "surprise",
            Emotion::Neutral => "neutral",
        }
    }

    /// Parses a label; `None` for anything outside the known table.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "angry" => Some(Emotion::Angry),
            "disgust" => Some(Emotion::Disgust),
            "fear" => Some(Emotion::Fear),
            "happy" => Some(Emotion::Happy),
            "sad" => Some(Emotion::Sad),
            "surprise" => Some(Emotion::Surprise),
            "neutral" => Some(Emotion::Neutral),
            _ => None,
        }
    }

    /// Maps the classifier's class index (FER ordering) to a label.
    pub fn from_class_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Emotion::Angry),
            1 => Some(Emotion::Disgust),
            2 => Some(Emotion::Fear),
            3 => Some(Emotion::Happy),
            4 => Some(Emotion::Sad),
            5 => Some(Emotion::Surprise),
            6 => Some(Emotion::Neutral),
            _ => None,
        }
    }

    /// Confidence proxy assigned to this emotion.
    pub fn confidence(&self) -> f32 {
        match self {
            Emotion::Happy => 0.9,
            Emotion::Surprise => 0.8,
            Emotion::Neutral => 0.7,
            Emotion::Sad => 0.4,
            Emotion::Fear => 0.3,
            Emotion::Angry => 0.2,
            Emotion::Disgust => 0.2,
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence for an optional label: table value, or the unknown default.
pub fn emotion_confidence(emotion: Option<Emotion>) -> f32 {
    emotion.map_or(UNKNOWN_EMOTION_CONFIDENCE, |e| e.confidence())
}

/// Extracts raw image bytes from a `data:image/...;base64,...` URL.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, VisionError> {
    let (_, payload) = data_url
        .split_once(',')
        .ok_or_else(|| VisionError::InvalidDataUrl {
            reason: "missing ',' separator".to_string(),
        })?;

    BASE64
        .decode(payload.trim())
        .map_err(|e| VisionError::InvalidDataUrl {
            reason: e.to_string(),
        })
}

/// Classifies the dominant facial emotion in a frame.
pub trait EmotionClassifier: Send + Sync {
    /// Classifies an encoded image (PNG/JPEG bytes).
    fn classify(&self, image_bytes: &[u8]) -> Result<Emotion, VisionError>;

    /// Returns `true` if a real model backs this classifier.
    fn is_model_loaded(&self) -> bool;
}

/// Classifier configuration.
#[derive(Debug, Clone, Default)]
pub struct ClassifierConfig {
    /// Path to the ONNX model. `None` selects stub mode.
    pub model_path: Option<PathBuf>,
}

impl ClassifierConfig {
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: Some(model_path.into()),
        }
    }

    /// Stub configuration: every frame classifies as `neutral`.
    pub fn stub() -> Self {
        Self::default()
    }
}

enum ClassifierBackend {
    Model { session: Mutex<Session> },
    Stub,
}

/// FER ONNX classifier (supports stub mode).
pub struct FerClassifier {
    backend: ClassifierBackend,
}

impl std::fmt::Debug for FerClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FerClassifier")
            .field(
                "backend",
                &match &self.backend {
                    ClassifierBackend::Model { .. } => "Model",
                    ClassifierBackend::Stub => "Stub",
                },
            )
            .finish()
    }
}

impl FerClassifier {
    /// Loads the classifier from a config (stub mode is supported).
    pub fn load(config: ClassifierConfig) -> Result<Self, VisionError> {
        let Some(path) = config.model_path else {
            warn!("Emotion classifier running in STUB mode, every frame is neutral");
            return Ok(Self {
                backend: ClassifierBackend::Stub,
            });
        };

        if !path.is_file() {
            return Err(VisionError::ModelNotFound { path });
        }

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(2)?
            .commit_from_file(&path)
            .map_err(|e| VisionError::ModelLoadFailed {
                reason: e.to_string(),
            })?;

        info!(model_path = %path.display(), "Emotion model loaded");

        Ok(Self {
            backend: ClassifierBackend::Model {
                session: Mutex::new(session),
            },
        })
    }

    /// Decodes and scales a frame into the model's input layout.
    fn preprocess(image_bytes: &[u8]) -> Result<Vec<f32>, VisionError> {
        let img = image::load_from_memory(image_bytes)?;
        let gray = image::imageops::resize(
            &img.to_luma8(),
            EMOTION_INPUT_SIZE,
            EMOTION_INPUT_SIZE,
            FilterType::Triangle,
        );

        Ok(gray.pixels().map(|p| p.0[0] as f32 / 255.0).collect())
    }

    fn classify_with_model(
        &self,
        session: &Mutex<Session>,
        image_bytes: &[u8],
    ) -> Result<Emotion, VisionError> {
        let pixels = Self::preprocess(image_bytes)?;

        let side = EMOTION_INPUT_SIZE as i64;
        let input_tensor = ort::value::Tensor::from_array(([1_i64, 1, side, side], pixels))?;

        let (best_index, best_score) = {
            let mut session = session.lock();
            let outputs = session.run(ort::inputs!["input" => input_tensor])?;

            let (_, scores) = outputs
                .get("output")
                .ok_or_else(|| VisionError::InferenceFailed {
                    reason: "model has no 'output' tensor".to_string(),
                })?
                .try_extract_tensor::<f32>()?;

            if scores.len() < EMOTION_CLASS_COUNT {
                return Err(VisionError::InferenceFailed {
                    reason: format!("expected {EMOTION_CLASS_COUNT} class scores, got {}", scores.len()),
                });
            }

            let mut best = (0usize, f32::NEG_INFINITY);
            for (i, &score) in scores.iter().take(EMOTION_CLASS_COUNT).enumerate() {
                if score > best.1 {
                    best = (i, score);
                }
            }
            best
        };

        let emotion =
            Emotion::from_class_index(best_index).ok_or_else(|| VisionError::InferenceFailed {
                reason: format!("class index {best_index} out of range"),
            })?;

        debug!(%emotion, score = best_score, "Frame classified");

        Ok(emotion)
    }
}

impl EmotionClassifier for FerClassifier {
    fn classify(&self, image_bytes: &[u8]) -> Result<Emotion, VisionError> {
        match &self.backend {
            ClassifierBackend::Model { session } => self.classify_with_model(session, image_bytes),
            ClassifierBackend::Stub => {
                // Validate the frame even in stub mode so bad uploads still 400.
                Self::preprocess(image_bytes)?;
                Ok(Emotion::Neutral)
            }
        }
    }

    fn is_model_loaded(&self) -> bool {
        matches!(self.backend, ClassifierBackend::Model { .. })
    }
}

/// Fixed-output classifier for tests.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Clone)]
pub struct MockEmotionClassifier {
    emotion: Option<Emotion>,
}

#[cfg(any(test, feature = "mock"))]
impl MockEmotionClassifier {
    /// Returns `emotion` for every frame.
    pub fn returning(emotion: Emotion) -> Self {
        Self {
            emotion: Some(emotion),
        }
    }

    /// Fails every classification.
    pub fn failing() -> Self {
        Self { emotion: None }
    }
}

#[cfg(any(test, feature = "mock"))]
impl EmotionClassifier for MockEmotionClassifier {
    fn classify(&self, _image_bytes: &[u8]) -> Result<Emotion, VisionError> {
        self.emotion.ok_or_else(|| VisionError::InferenceFailed {
            reason: "mock classifier configured to fail".to_string(),
        })
    }

    fn is_model_loaded(&self) -> bool {
        false
    }
}
