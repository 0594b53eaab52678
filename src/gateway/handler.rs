use axum::{
    Json,
    extract::{Multipart, State},
    response::{IntoResponse, Response},
};
use tracing::{debug, info, instrument, warn};

use crate::audio;
use crate::config::ConfidenceKind;
use crate::constants::VIVA_POLICY_HEADER;
use crate::scoring::{FrameSignal, combine_scores};
use crate::transcribe::SpeechTranscriber;
use crate::vision::{self, EmotionClassifier};

use super::error::GatewayError;
use super::payload::EvaluateResponse;
use super::state::HandlerState;

/// `POST /evaluate`
///
/// Multipart form with a required `audio` part (WAV bytes) and an optional
/// `image` part holding either raw image bytes or a base64 data URL. Runs
/// the full pipeline and returns the blended score.
#[instrument(skip_all)]
pub async fn evaluate_handler<T, E>(
    State(state): State<HandlerState<T, E>>,
    mut multipart: Multipart,
) -> Result<Response, GatewayError>
where
    T: SpeechTranscriber + 'static,
    E: EmotionClassifier + 'static,
{
    let mut audio_bytes: Option<Vec<u8>> = None;
    let mut frame_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| GatewayError::InvalidRequest(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("audio") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| GatewayError::InvalidRequest(format!("audio field: {e}")))?;
                audio_bytes = Some(data.to_vec());
            }
            Some("image") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| GatewayError::InvalidRequest(format!("image field: {e}")))?;
                frame_bytes = Some(extract_frame(&data)?);
            }
            other => {
                debug!(field = ?other, "ignoring unknown multipart field");
            }
        }
    }

    let audio_bytes = audio_bytes.ok_or(GatewayError::MissingField("audio"))?;

    let samples = audio::decode_wav(&audio_bytes)
        .map_err(|e| GatewayError::InvalidAudio(e.to_string()))?;
    debug!(samples = samples.len(), "decoded audio");

    // Whisper inference is CPU-bound; keep it off the async workers.
    let transcriber = state.transcriber.clone();
    let transcript = tokio::task::spawn_blocking(move || transcriber.transcribe(&samples))
        .await
        .map_err(|e| GatewayError::InternalError(format!("transcription task: {e}")))?
        .unwrap_or_else(|e| {
            warn!(error = %e, "transcription failed, continuing with empty transcript");
            String::new()
        });

    let frame = build_frame_signal(&state, frame_bytes).await?;
    let emotion = frame.emotion.map(|e| e.as_str().to_string());

    let answer_score = state.scorer.score(&transcript, &state.reference_answer)?;
    let confidence_score = state.estimator.estimate(&transcript, frame);
    let final_score = combine_scores(answer_score, confidence_score);

    info!(
        answer_score,
        confidence_score,
        final_score,
        transcript_chars = transcript.len(),
        "evaluated submission"
    );

    let body = EvaluateResponse {
        transcript,
        answer_score,
        confidence_score,
        final_score,
        emotion,
    };

    Ok((
        [(VIVA_POLICY_HEADER, state.policy_header_value())],
        Json(body),
    )
        .into_response())
}

/// Accepts either raw image bytes or a `data:image/...;base64,` URL sent as
/// the field body.
fn extract_frame(data: &[u8]) -> Result<Vec<u8>, GatewayError> {
    if data.starts_with(b"data:") {
        let text = std::str::from_utf8(data)
            .map_err(|_| GatewayError::InvalidImage("data URL is not valid UTF-8".into()))?;
        vision::decode_data_url(text).map_err(|e| GatewayError::InvalidImage(e.to_string()))
    } else {
        Ok(data.to_vec())
    }
}

/// Classifies the frame only when the confidence policy reads the emotion
/// label; presence-based policies just need to know a frame arrived.
async fn build_frame_signal<T, E>(
    state: &HandlerState<T, E>,
    frame_bytes: Option<Vec<u8>>,
) -> Result<FrameSignal, GatewayError>
where
    T: SpeechTranscriber + 'static,
    E: EmotionClassifier + 'static,
{
    let Some(bytes) = frame_bytes else {
        return Ok(FrameSignal::absent());
    };

    if state.estimator.policy() != ConfidenceKind::Emotion {
        return Ok(FrameSignal::present());
    }

    let classifier = state.classifier.clone();
    let outcome = tokio::task::spawn_blocking(move || classifier.classify(&bytes))
        .await
        .map_err(|e| GatewayError::InternalError(format!("classification task: {e}")))?;

    match outcome {
        Ok(emotion) => Ok(FrameSignal::classified(Some(emotion))),
        Err(e) => {
            warn!(error = %e, "emotion classification failed, using neutral fallback");
            Ok(FrameSignal::classified(None))
        }
    }
}
