use super::*;

#[test]
fn default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.port, 8080);
    assert_eq!(config.answer_scorer, ScorerKind::Lexical);
    assert_eq!(config.confidence_policy, ConfidenceKind::Blended);
    assert_eq!(
        config.reference_answer,
        crate::constants::DEFAULT_REFERENCE_ANSWER
    );
}

#[test]
fn socket_addr_formats_bind_and_port() {
    let config = Config::default();
    assert_eq!(config.socket_addr(), "127.0.0.1:8080");
}

#[test]
fn scorer_kind_parses_known_names() {
    assert_eq!(ScorerKind::parse("lexical").unwrap(), ScorerKind::Lexical);
    assert_eq!(ScorerKind::parse("semantic").unwrap(), ScorerKind::Semantic);
    assert_eq!(ScorerKind::parse(" Semantic ").unwrap(), ScorerKind::Semantic);
}

#[test]
fn scorer_kind_rejects_unknown_names() {
    let err = ScorerKind::parse("fuzzy").unwrap_err();
    assert!(matches!(err, ConfigError::UnknownStrategy { .. }));
}

#[test]
fn confidence_kind_parses_known_names() {
    assert_eq!(
        ConfidenceKind::parse("length").unwrap(),
        ConfidenceKind::Length
    );
    assert_eq!(
        ConfidenceKind::parse("presence").unwrap(),
        ConfidenceKind::Presence
    );
    assert_eq!(
        ConfidenceKind::parse("emotion").unwrap(),
        ConfidenceKind::Emotion
    );
    assert_eq!(
        ConfidenceKind::parse("BLENDED").unwrap(),
        ConfidenceKind::Blended
    );
}

#[test]
fn confidence_kind_rejects_unknown_names() {
    let err = ConfidenceKind::parse("vibes").unwrap_err();
    assert!(matches!(err, ConfigError::UnknownStrategy { .. }));
}

#[test]
fn semantic_scorer_requires_embed_model_path() {
    let config = Config {
        answer_scorer: ScorerKind::Semantic,
        ..Config::default()
    };
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::MissingModelForStrategy { .. }));
}

#[test]
fn empty_reference_answer_is_rejected() {
    let config = Config {
        reference_answer: "   ".to_string(),
        ..Config::default()
    };
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::EmptyReferenceAnswer));
}

#[test]
fn missing_whisper_model_path_is_rejected() {
    let config = Config {
        whisper_model_path: Some(std::path::PathBuf::from("/nonexistent/model.bin")),
        ..Config::default()
    };
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::PathNotFound { .. }));
}

#[test]
fn whisper_model_path_must_be_a_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = Config {
        whisper_model_path: Some(dir.path().to_path_buf()),
        ..Config::default()
    };
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::NotAFile { .. }));
}

#[test]
fn embed_model_path_must_be_a_directory() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let config = Config {
        embed_model_path: Some(file.path().to_path_buf()),
        ..Config::default()
    };
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::NotADirectory { .. }));
}
