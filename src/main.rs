//! Viva HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use viva::config::{Config, ScorerKind};
use viva::embedding::{EmbedderConfig, SentenceEmbedder};
use viva::gateway::{HandlerState, create_router_with_state};
use viva::scoring::{AnswerScorer, ConfidenceEstimator};
use viva::transcribe::{TranscriberConfig, WhisperTranscriber};
use viva::vision::{ClassifierConfig, FerClassifier};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!(
        r#"
██╗   ██╗██╗██╗   ██╗ █████╗
██║   ██║██║██║   ██║██╔══██╗
██║   ██║██║██║   ██║███████║
╚██╗ ██╔╝██║╚██╗ ██╔╝██╔══██║
 ╚████╔╝ ██║ ╚████╔╝ ██║  ██║
  ╚═══╝  ╚═╝  ╚═══╝  ╚═╝  ╚═╝

        LISTEN. WATCH. SCORE.
"#
    );

    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        scorer = config.answer_scorer.as_str(),
        confidence = config.confidence_policy.as_str(),
        "Viva starting"
    );

    let transcriber_config = match &config.whisper_model_path {
        Some(path) => TranscriberConfig::new(path.clone()),
        None => TranscriberConfig::stub(),
    };
    let transcriber = Arc::new(WhisperTranscriber::load(transcriber_config)?);

    let classifier_config = match &config.emotion_model_path {
        Some(path) => ClassifierConfig::new(path.clone()),
        None => ClassifierConfig::stub(),
    };
    let classifier = Arc::new(FerClassifier::load(classifier_config)?);

    let scorer = match config.answer_scorer {
        ScorerKind::Lexical => AnswerScorer::Lexical,
        ScorerKind::Semantic => {
            let embedder_config = match &config.embed_model_path {
                Some(path) => EmbedderConfig::new(path.clone()),
                None => EmbedderConfig::stub(),
            };
            let embedder = SentenceEmbedder::load(embedder_config)?;
            AnswerScorer::Semantic(Arc::new(embedder))
        }
    };

    let state = HandlerState::new(
        transcriber,
        classifier,
        Arc::new(scorer),
        ConfidenceEstimator::new(config.confidence_policy),
        config.reference_answer.clone(),
    );

    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Viva shutdown complete");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var("VIVA_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime");

    rt.block_on(async {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
            .expect("failed to build client");

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
