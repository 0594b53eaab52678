use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::config::ScorerKind;
use crate::constants::round2;
use crate::embedding::{SentenceEmbedder, cosine_similarity};

use super::error::ScoringError;

/// Similarity between a transcript and the reference answer, in [0,1].
///
/// The strategy is fixed at startup from configuration. Both strategies
/// round to two decimals; the semantic strategy clamps the raw cosine so a
/// dissimilar answer can never push the blended score negative.
pub enum AnswerScorer {
    /// Word-set overlap.
    Lexical,
    /// Embedding cosine similarity.
    Semantic(Arc<SentenceEmbedder>),
}

impl std::fmt::Debug for AnswerScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnswerScorer::Lexical => f.write_str("AnswerScorer::Lexical"),
            AnswerScorer::Semantic(embedder) => f
                .debug_tuple("AnswerScorer::Semantic")
                .field(embedder)
                .finish(),
        }
    }
}

impl AnswerScorer {
    /// The strategy this scorer implements.
    pub fn kind(&self) -> ScorerKind {
        match self {
            AnswerScorer::Lexical => ScorerKind::Lexical,
            AnswerScorer::Semantic(_) => ScorerKind::Semantic,
        }
    }

    /// Scores `user_text` against `reference_text`.
    pub fn score(&self, user_text: &str, reference_text: &str) -> Result<f32, ScoringError> {
        match self {
            AnswerScorer::Lexical => lexical_overlap(user_text, reference_text),
            AnswerScorer::Semantic(embedder) => {
                let user = embedder.embed(user_text)?;
                let reference = embedder.embed(reference_text)?;
                let raw = cosine_similarity(&user, &reference);
                let score = round2(raw.clamp(0.0, 1.0));

                debug!(raw, score, "Semantic answer score");
                Ok(score)
            }
        }
    }
}

/// Fraction of reference words present in the user's answer.
///
/// Case-insensitive, whitespace-tokenized word sets:
/// `|user ∩ reference| / |reference|`, rounded to two decimals.
pub fn lexical_overlap(user_text: &str, reference_text: &str) -> Result<f32, ScoringError> {
    let reference_words: HashSet<String> = word_set(reference_text);
    if reference_words.is_empty() {
        return Err(ScoringError::InvalidInput {
            reason: "reference answer has no words".to_string(),
        });
    }

    let user_words: HashSet<String> = word_set(user_text);
    let common = user_words.intersection(&reference_words).count();

    Ok(round2(common as f32 / reference_words.len() as f32))
}

fn word_set(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect()
}
