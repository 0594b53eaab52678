use serde::{Deserialize, Serialize};

/// JSON body returned by `POST /evaluate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateResponse {
    /// Transcript of the submitted audio (empty when transcription failed).
    pub transcript: String,

    /// Similarity to the reference answer, in [0,1].
    pub answer_score: f32,

    /// Confidence proxy, in [0,1].
    pub confidence_score: f32,

    /// `answer_score * 0.7 + confidence_score * 0.3`, rounded to 2 decimals.
    pub final_score: f32,

    /// Detected facial emotion, when the emotion policy classified a frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
}
