//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `VIVA_*` environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

/// Answer-scoring strategy (spelled `lexical` / `semantic` in the env).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorerKind {
    /// Word-set overlap against the reference answer.
    Lexical,
    /// Sentence-embedding cosine similarity.
    Semantic,
}

impl ScorerKind {
    /// Name used in the env var and the policy response header.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScorerKind::Lexical => "lexical",
            ScorerKind::Semantic => "semantic",
        }
    }

    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lexical" => Ok(ScorerKind::Lexical),
            "semantic" => Ok(ScorerKind::Semantic),
            _ => Err(ConfigError::UnknownStrategy {
                setting: "answer scorer",
                value: value.to_string(),
            }),
        }
    }
}

/// Confidence-estimation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceKind {
    /// Transcript length, saturating at 25 words.
    Length,
    /// Frame present or not.
    Presence,
    /// Emotion classifier over the frame.
    Emotion,
    /// Average of length and presence.
    Blended,
}

impl ConfidenceKind {
    /// Name used in the env var and the policy response header.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceKind::Length => "length",
            ConfidenceKind::Presence => "presence",
            ConfidenceKind::Emotion => "emotion",
            ConfidenceKind::Blended => "blended",
        }
    }

    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "length" => Ok(ConfidenceKind::Length),
            "presence" => Ok(ConfidenceKind::Presence),
            "emotion" => Ok(ConfidenceKind::Emotion),
            "blended" => Ok(ConfidenceKind::Blended),
            _ => Err(ConfigError::UnknownStrategy {
                setting: "confidence",
                value: value.to_string(),
            }),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `VIVA_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Path to the Whisper model file (GGML). Unset runs the transcriber in stub mode.
    pub whisper_model_path: Option<PathBuf>,

    /// Path to the sentence-embedding model directory (safetensors + tokenizer).
    pub embed_model_path: Option<PathBuf>,

    /// Path to the emotion classifier model file (ONNX).
    pub emotion_model_path: Option<PathBuf>,

    /// Reference answer transcripts are scored against.
    pub reference_answer: String,

    /// Active answer-scoring strategy. Default: lexical.
    pub answer_scorer: ScorerKind,

    /// Active confidence strategy. Default: blended.
    pub confidence_policy: ConfidenceKind,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            whisper_model_path: None,
            embed_model_path: None,
            emotion_model_path: None,
            reference_answer: crate::constants::DEFAULT_REFERENCE_ANSWER.to_string(),
            answer_scorer: ScorerKind::Lexical,
            confidence_policy: ConfidenceKind::Blended,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "VIVA_PORT";
    const ENV_BIND_ADDR: &'static str = "VIVA_BIND_ADDR";
    const ENV_WHISPER_MODEL_PATH: &'static str = "VIVA_WHISPER_MODEL_PATH";
    const ENV_EMBED_MODEL_PATH: &'static str = "VIVA_EMBED_MODEL_PATH";
    const ENV_EMOTION_MODEL_PATH: &'static str = "VIVA_EMOTION_MODEL_PATH";
    const ENV_REFERENCE_ANSWER: &'static str = "VIVA_REFERENCE_ANSWER";
    const ENV_ANSWER_SCORER: &'static str = "VIVA_ANSWER_SCORER";
    const ENV_CONFIDENCE_POLICY: &'static str = "VIVA_CONFIDENCE_POLICY";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let whisper_model_path = Self::parse_optional_path_from_env(Self::ENV_WHISPER_MODEL_PATH);
        let embed_model_path = Self::parse_optional_path_from_env(Self::ENV_EMBED_MODEL_PATH);
        let emotion_model_path = Self::parse_optional_path_from_env(Self::ENV_EMOTION_MODEL_PATH);
        let reference_answer =
            Self::parse_string_from_env(Self::ENV_REFERENCE_ANSWER, defaults.reference_answer);

        let answer_scorer = match env::var(Self::ENV_ANSWER_SCORER) {
            Ok(value) => ScorerKind::parse(&value)?,
            Err(_) => defaults.answer_scorer,
        };

        let confidence_policy = match env::var(Self::ENV_CONFIDENCE_POLICY) {
            Ok(value) => ConfidenceKind::parse(&value)?,
            Err(_) => defaults.confidence_policy,
        };

        Ok(Self {
            port,
            bind_addr,
            whisper_model_path,
            embed_model_path,
            emotion_model_path,
            reference_answer,
            answer_scorer,
            confidence_policy,
        })
    }

    /// Validates paths and basic invariants (does not touch the models).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reference_answer.split_whitespace().next().is_none() {
            return Err(ConfigError::EmptyReferenceAnswer);
        }

        if self.answer_scorer == ScorerKind::Semantic && self.embed_model_path.is_none() {
            return Err(ConfigError::MissingModelForStrategy {
                var: Self::ENV_EMBED_MODEL_PATH,
            });
        }

        if let Some(ref path) = self.whisper_model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }

        if let Some(ref path) = self.embed_model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        if let Some(ref path) = self.emotion_model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }
}
