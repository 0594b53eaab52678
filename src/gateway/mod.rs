//! HTTP surface: routing, request handling, and wire payloads.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;

#[cfg(test)]
mod handler_tests;

pub use error::{ErrorResponse, GatewayError};
pub use handler::evaluate_handler;
pub use payload::EvaluateResponse;
pub use state::HandlerState;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::transcribe::SpeechTranscriber;
use crate::vision::EmotionClassifier;

/// Uploaded audio plus an optional frame; 32 MiB covers several minutes
/// of 16 kHz WAV.
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Per-component readiness as reported by `GET /ready`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub transcriber: String,
    pub classifier: String,
    pub scorer: String,
    pub confidence: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    pub components: ComponentStatus,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Reports which backends loaded real models and which fell back to
/// stubs. Stub mode still serves traffic, so this always returns 200.
async fn ready_handler<T, E>(State(state): State<HandlerState<T, E>>) -> Json<ReadyResponse>
where
    T: SpeechTranscriber + 'static,
    E: EmotionClassifier + 'static,
{
    let mode = |loaded: bool| if loaded { "real" } else { "stub" }.to_string();

    Json(ReadyResponse {
        status: "ready".to_string(),
        components: ComponentStatus {
            transcriber: mode(state.transcriber.is_model_loaded()),
            classifier: mode(state.classifier.is_model_loaded()),
            scorer: state.scorer.kind().as_str().to_string(),
            confidence: state.estimator.policy().as_str().to_string(),
        },
    })
}

/// Builds the router over an injected state, so tests can swap in mocks.
pub fn create_router_with_state<T, E>(state: HandlerState<T, E>) -> Router
where
    T: SpeechTranscriber + 'static,
    E: EmotionClassifier + 'static,
{
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler::<T, E>))
        .route("/evaluate", post(evaluate_handler::<T, E>))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
