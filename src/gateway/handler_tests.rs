use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::config::ConfidenceKind;
use crate::constants::{DEFAULT_REFERENCE_ANSWER, VIVA_POLICY_HEADER};
use crate::embedding::{EmbedderConfig, SentenceEmbedder};
use crate::scoring::{AnswerScorer, ConfidenceEstimator};
use crate::transcribe::MockTranscriber;
use crate::vision::{Emotion, MockEmotionClassifier};

use super::payload::EvaluateResponse;
use super::state::HandlerState;

const BOUNDARY: &str = "viva-test-boundary";

fn test_router(
    transcriber: MockTranscriber,
    classifier: MockEmotionClassifier,
    scorer: AnswerScorer,
    policy: ConfidenceKind,
) -> Router {
    let state = HandlerState::new(
        Arc::new(transcriber),
        Arc::new(classifier),
        Arc::new(scorer),
        ConfidenceEstimator::new(policy),
        DEFAULT_REFERENCE_ANSWER.to_string(),
    );
    super::create_router_with_state(state)
}

fn wav_bytes() -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..1600i32 {
            writer.write_sample(((i % 100) * 50) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([200, 180, 160]));
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .unwrap();
    bytes
}

fn multipart_body(parts: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, content_type, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"{name}\"\r\n")
                .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn evaluate_request(parts: &[(&str, &str, &[u8])]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/evaluate")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

async fn response_json<D: serde::de::DeserializeOwned>(
    response: axum::response::Response,
) -> D {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn healthz_returns_ok() {
    let router = test_router(
        MockTranscriber::returning(""),
        MockEmotionClassifier::returning(Emotion::Neutral),
        AnswerScorer::Lexical,
        ConfidenceKind::Blended,
    );

    let response = router
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: super::HealthResponse = response_json(response).await;
    assert_eq!(body.status, "ok");
}

#[tokio::test]
async fn ready_reports_component_modes() {
    let router = test_router(
        MockTranscriber::returning(""),
        MockEmotionClassifier::returning(Emotion::Neutral),
        AnswerScorer::Lexical,
        ConfidenceKind::Emotion,
    );

    let response = router
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: super::ReadyResponse = response_json(response).await;
    assert_eq!(body.status, "ready");
    assert_eq!(body.components.transcriber, "stub");
    assert_eq!(body.components.classifier, "stub");
    assert_eq!(body.components.scorer, "lexical");
    assert_eq!(body.components.confidence, "emotion");
}

#[tokio::test]
async fn evaluate_scores_transcript_against_reference() {
    let router = test_router(
        MockTranscriber::returning("Machine learning helps systems learn from data"),
        MockEmotionClassifier::returning(Emotion::Neutral),
        AnswerScorer::Lexical,
        ConfidenceKind::Blended,
    );

    let response = router
        .oneshot(evaluate_request(&[("audio", "audio/wav", &wav_bytes())]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(VIVA_POLICY_HEADER).unwrap(),
        "lexical+blended"
    );

    let body: EvaluateResponse = response_json(response).await;
    assert_eq!(
        body.transcript,
        "Machine learning helps systems learn from data"
    );
    // 5 of the reference's 15 unique tokens match ("data" misses "data.").
    assert_eq!(body.answer_score, 0.33);
    // 7 words (0.28) blended with no frame (0.4) -> 0.34.
    assert_eq!(body.confidence_score, 0.34);
    assert_eq!(body.final_score, 0.33);
    assert_eq!(body.emotion, None);
}

#[tokio::test]
async fn evaluate_requires_audio_field() {
    let router = test_router(
        MockTranscriber::returning(""),
        MockEmotionClassifier::returning(Emotion::Neutral),
        AnswerScorer::Lexical,
        ConfidenceKind::Blended,
    );

    let response = router
        .oneshot(evaluate_request(&[("image", "image/png", &png_bytes())]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response_json(response).await;
    assert_eq!(body["code"], 400);
    assert!(body["error"].as_str().unwrap().contains("audio"));
}

#[tokio::test]
async fn evaluate_rejects_undecodable_audio() {
    let router = test_router(
        MockTranscriber::returning(""),
        MockEmotionClassifier::returning(Emotion::Neutral),
        AnswerScorer::Lexical,
        ConfidenceKind::Blended,
    );

    let response = router
        .oneshot(evaluate_request(&[("audio", "audio/wav", b"not a wav")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn evaluate_absorbs_transcription_failure() {
    let router = test_router(
        MockTranscriber::failing(),
        MockEmotionClassifier::returning(Emotion::Neutral),
        AnswerScorer::Lexical,
        ConfidenceKind::Blended,
    );

    let response = router
        .oneshot(evaluate_request(&[("audio", "audio/wav", &wav_bytes())]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: EvaluateResponse = response_json(response).await;
    assert!(body.transcript.is_empty());
    assert_eq!(body.answer_score, 0.0);
    // Empty transcript (0.0) blended with no frame (0.4) -> 0.2.
    assert_eq!(body.confidence_score, 0.2);
    assert_eq!(body.final_score, 0.06);
}

#[tokio::test]
async fn presence_policy_counts_frame_without_classifying() {
    let router = test_router(
        MockTranscriber::returning(""),
        // A failing classifier proves the presence policy never invokes it.
        MockEmotionClassifier::failing(),
        AnswerScorer::Lexical,
        ConfidenceKind::Presence,
    );

    let response = router
        .oneshot(evaluate_request(&[
            ("audio", "audio/wav", &wav_bytes()),
            ("image", "image/png", &png_bytes()),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: EvaluateResponse = response_json(response).await;
    assert_eq!(body.confidence_score, 0.8);
    assert_eq!(body.emotion, None);
}

#[tokio::test]
async fn emotion_policy_reports_label_and_table_confidence() {
    let router = test_router(
        MockTranscriber::returning(""),
        MockEmotionClassifier::returning(Emotion::Happy),
        AnswerScorer::Lexical,
        ConfidenceKind::Emotion,
    );

    let response = router
        .oneshot(evaluate_request(&[
            ("audio", "audio/wav", &wav_bytes()),
            ("image", "image/png", &png_bytes()),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: EvaluateResponse = response_json(response).await;
    assert_eq!(body.confidence_score, 0.9);
    assert_eq!(body.emotion.as_deref(), Some("happy"));
}

#[tokio::test]
async fn emotion_policy_falls_back_when_classification_fails() {
    let router = test_router(
        MockTranscriber::returning(""),
        MockEmotionClassifier::failing(),
        AnswerScorer::Lexical,
        ConfidenceKind::Emotion,
    );

    let response = router
        .oneshot(evaluate_request(&[
            ("audio", "audio/wav", &wav_bytes()),
            ("image", "image/png", &png_bytes()),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: EvaluateResponse = response_json(response).await;
    assert_eq!(body.confidence_score, 0.5);
    assert_eq!(body.emotion, None);
}

#[tokio::test]
async fn evaluate_accepts_data_url_frames() {
    let router = test_router(
        MockTranscriber::returning(""),
        MockEmotionClassifier::returning(Emotion::Surprise),
        AnswerScorer::Lexical,
        ConfidenceKind::Emotion,
    );

    let data_url = format!("data:image/png;base64,{}", BASE64.encode(png_bytes()));
    let response = router
        .oneshot(evaluate_request(&[
            ("audio", "audio/wav", &wav_bytes()),
            ("image", "text/plain", data_url.as_bytes()),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: EvaluateResponse = response_json(response).await;
    assert_eq!(body.confidence_score, 0.8);
    assert_eq!(body.emotion.as_deref(), Some("surprise"));
}

#[tokio::test]
async fn evaluate_rejects_malformed_data_url() {
    let router = test_router(
        MockTranscriber::returning(""),
        MockEmotionClassifier::returning(Emotion::Neutral),
        AnswerScorer::Lexical,
        ConfidenceKind::Emotion,
    );

    let response = router
        .oneshot(evaluate_request(&[
            ("audio", "audio/wav", &wav_bytes()),
            ("image", "text/plain", b"data:image/png;base64,@@not-base64@@"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn policy_header_follows_configured_strategies() {
    let embedder = Arc::new(SentenceEmbedder::load(EmbedderConfig::stub()).unwrap());
    let router = test_router(
        MockTranscriber::returning("some answer"),
        MockEmotionClassifier::returning(Emotion::Neutral),
        AnswerScorer::Semantic(embedder),
        ConfidenceKind::Length,
    );

    let response = router
        .oneshot(evaluate_request(&[("audio", "audio/wav", &wav_bytes())]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(VIVA_POLICY_HEADER).unwrap(),
        "semantic+length"
    );
}
