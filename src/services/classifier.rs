//! Batched word-class and article assignment.
//!
//! Candidates are sent to the language model in fixed-size chunks. A failed
//! chunk degrades to one request per candidate; a failed single request
//! degrades to a safe default. Whatever happens, the output list has exactly
//! the input's length and order.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::services::llm_provider::{extract_json, LLMError, LLMProvider};
use crate::services::noise_filter;

pub const DEFAULT_BATCH_SIZE: usize = 30;

const CLASSIFY_TEMPERATURE: f32 = 0.1;

const SYSTEM_PROMPT: &str = "You are a German grammar expert. \
For every German word or phrase you are given, determine its word class \
and, for nouns only, the definite article. \
word_type must be exactly one of: noun, verb, adjective, adverb, phrase, other. \
article must be der, die or das for nouns and null for everything else; \
never assign an article to a non-noun. \
Return only valid JSON, no explanation.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordType {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Phrase,
    Other,
}

impl WordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Noun => "noun",
            Self::Verb => "verb",
            Self::Adjective => "adjective",
            Self::Adverb => "adverb",
            Self::Phrase => "phrase",
            Self::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "noun" => Some(Self::Noun),
            "verb" => Some(Self::Verb),
            "adjective" => Some(Self::Adjective),
            "adverb" => Some(Self::Adverb),
            "phrase" => Some(Self::Phrase),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Article {
    Der,
    Die,
    Das,
}

impl Article {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Der => "der",
            Self::Die => "die",
            Self::Das => "das",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "der" => Some(Self::Der),
            "die" => Some(Self::Die),
            "das" => Some(Self::Das),
            _ => None,
        }
    }
}

/// Final per-candidate classification. The article is present only for
/// nouns; this is enforced locally, never trusted from the service.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub word: String,
    pub word_type: WordType,
    pub article: Option<Article>,
    pub full_form: String,
}

/// One item of the raw service response, before local reconciliation. The
/// fields are deliberately loose; anything malformed degrades to a default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawClassification {
    #[serde(default)]
    pub word: Option<String>,
    #[serde(default)]
    pub word_type: Option<String>,
    #[serde(default)]
    pub article: Option<String>,
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("llm request failed: {0}")]
    Llm(#[from] LLMError),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("expected {expected} results, got {got}")]
    Cardinality { expected: usize, got: usize },
}

/// Boundary to the classification service. The production implementation
/// wraps [`LLMProvider`]; tests substitute mocks to exercise the
/// degradation tiers.
#[allow(async_fn_in_trait)]
pub trait ClassificationBackend {
    async fn classify_chunk(
        &self,
        words: &[String],
    ) -> Result<Vec<RawClassification>, ClassifyError>;

    async fn classify_single(&self, word: &str) -> Result<RawClassification, ClassifyError>;
}

/// Classifies every candidate, preserving input order and count.
///
/// Chunks are issued sequentially to keep external rate limits predictable.
pub async fn classify_batch<B: ClassificationBackend>(
    backend: &B,
    candidates: &[String],
    batch_size: usize,
) -> Vec<Classification> {
    let mut results = Vec::with_capacity(candidates.len());
    for chunk in candidates.chunks(batch_size.max(1)) {
        match backend.classify_chunk(chunk).await {
            Ok(raw) if raw.len() == chunk.len() => {
                for (candidate, item) in chunk.iter().zip(raw) {
                    results.push(reconcile(candidate, Some(item)));
                }
            }
            Ok(raw) => {
                warn!(
                    expected = chunk.len(),
                    got = raw.len(),
                    "chunk cardinality mismatch, falling back to single requests"
                );
                classify_chunk_singly(backend, chunk, &mut results).await;
            }
            Err(err) => {
                warn!(error = %err, size = chunk.len(), "chunk classification failed, falling back to single requests");
                classify_chunk_singly(backend, chunk, &mut results).await;
            }
        }
    }

    debug_assert_eq!(results.len(), candidates.len());
    results
}

async fn classify_chunk_singly<B: ClassificationBackend>(
    backend: &B,
    chunk: &[String],
    results: &mut Vec<Classification>,
) {
    for candidate in chunk {
        match backend.classify_single(candidate).await {
            Ok(raw) => results.push(reconcile(candidate, Some(raw))),
            Err(err) => {
                warn!(%candidate, error = %err, "single classification failed, using default");
                results.push(reconcile(candidate, None));
            }
        }
    }
}

/// Merges the service answer with what the raw candidate text already tells
/// us. Precedence: a determiner present in the input wins over the service,
/// then local phrase detection, then the service answer with non-noun
/// articles suppressed. `None` for the raw answer yields the safe default.
pub fn reconcile(candidate: &str, raw: Option<RawClassification>) -> Classification {
    let candidate = candidate.trim();

    if let Some((article, remainder)) = split_leading_article(candidate) {
        return Classification {
            word: remainder.to_string(),
            word_type: WordType::Noun,
            article: Some(article),
            full_form: format!("{} {}", article.as_str(), remainder),
        };
    }

    if noise_filter::is_phrase(candidate) {
        return Classification {
            word: candidate.to_string(),
            word_type: WordType::Phrase,
            article: None,
            full_form: candidate.to_string(),
        };
    }

    let Some(raw) = raw else {
        return Classification {
            word: candidate.to_string(),
            word_type: WordType::Other,
            article: None,
            full_form: candidate.to_string(),
        };
    };

    let word_type = raw
        .word_type
        .as_deref()
        .and_then(WordType::parse)
        .unwrap_or(WordType::Other);
    let article = if word_type == WordType::Noun {
        raw.article.as_deref().and_then(Article::parse)
    } else {
        None
    };
    let full_form = match article {
        Some(a) => format!("{} {}", a.as_str(), candidate),
        None => candidate.to_string(),
    };

    Classification {
        word: candidate.to_string(),
        word_type,
        article,
        full_form,
    }
}

/// Splits a leading `der`/`die`/`das` off the candidate, if present.
pub fn split_leading_article(text: &str) -> Option<(Article, &str)> {
    let mut parts = text.splitn(2, char::is_whitespace);
    let first = parts.next()?;
    let rest = parts.next()?.trim_start();
    if rest.is_empty() {
        return None;
    }
    Article::parse(first).map(|article| (article, rest))
}

/// Production backend over the chat-completions provider.
#[derive(Clone)]
pub struct LlmClassifier {
    provider: LLMProvider,
}

impl LlmClassifier {
    pub fn new(provider: LLMProvider) -> Self {
        Self { provider }
    }
}

impl ClassificationBackend for LlmClassifier {
    async fn classify_chunk(
        &self,
        words: &[String],
    ) -> Result<Vec<RawClassification>, ClassifyError> {
        let listing = words
            .iter()
            .enumerate()
            .map(|(i, w)| format!("{}. {}", i + 1, w))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            "Classify the following {count} German words or phrases.\n\
             Return a JSON object of the form\n\
             {{\"results\": [{{\"word\": \"...\", \"word_type\": \"...\", \"article\": \"der|die|das|null\"}}]}}\n\
             with exactly {count} entries, in the same order as the input:\n\n{listing}",
            count = words.len(),
        );

        let content = self
            .provider
            .complete_json(SYSTEM_PROMPT, &prompt, CLASSIFY_TEMPERATURE)
            .await?;
        let raw = parse_response(&content)?;
        if raw.len() != words.len() {
            return Err(ClassifyError::Cardinality {
                expected: words.len(),
                got: raw.len(),
            });
        }
        debug!(count = raw.len(), "chunk classified");
        Ok(raw)
    }

    async fn classify_single(&self, word: &str) -> Result<RawClassification, ClassifyError> {
        let prompt = format!(
            "Classify the German word or phrase \"{word}\".\n\
             Return a single JSON object of the form\n\
             {{\"word\": \"{word}\", \"word_type\": \"...\", \"article\": \"der|die|das|null\"}}"
        );

        let content = self
            .provider
            .complete_json(SYSTEM_PROMPT, &prompt, CLASSIFY_TEMPERATURE)
            .await?;
        let json = extract_json(&content);
        serde_json::from_str(&json).map_err(|e| ClassifyError::Malformed(e.to_string()))
    }
}

/// Normalizes the two accepted response shapes, a bare array or an object
/// wrapping the array under `results`, into one internal list. Anything
/// else is malformed.
fn parse_response(content: &str) -> Result<Vec<RawClassification>, ClassifyError> {
    let json = extract_json(content);
    let value: serde_json::Value =
        serde_json::from_str(&json).map_err(|e| ClassifyError::Malformed(e.to_string()))?;

    let items = match value {
        serde_json::Value::Array(items) => serde_json::Value::Array(items),
        serde_json::Value::Object(mut map) => match map.remove("results") {
            Some(results @ serde_json::Value::Array(_)) => results,
            _ => {
                return Err(ClassifyError::Malformed(
                    "response object has no results array".to_string(),
                ))
            }
        },
        _ => {
            return Err(ClassifyError::Malformed(
                "response is neither an array nor an object".to_string(),
            ))
        }
    };

    serde_json::from_value(items).map_err(|e| ClassifyError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_array_response() {
        let content = r#"[{"word": "Hund", "word_type": "noun", "article": "der"}]"#;
        let raw = parse_response(content).unwrap();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].word_type.as_deref(), Some("noun"));
    }

    #[test]
    fn parses_enveloped_response() {
        let content = r#"{"results": [{"word": "laufen", "word_type": "verb", "article": null}]}"#;
        let raw = parse_response(content).unwrap();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].article, None);
    }

    #[test]
    fn rejects_envelope_without_results() {
        let content = r#"{"items": []}"#;
        assert!(matches!(
            parse_response(content),
            Err(ClassifyError::Malformed(_))
        ));
    }

    #[test]
    fn detected_determiner_beats_service_answer() {
        let raw = RawClassification {
            word: Some("Eigentümer".into()),
            word_type: Some("noun".into()),
            article: Some("das".into()),
        };
        let result = reconcile("der Eigentümer", Some(raw));
        assert_eq!(result.article, Some(Article::Der));
        assert_eq!(result.word, "Eigentümer");
        assert_eq!(result.full_form, "der Eigentümer");
        assert_eq!(result.word_type, WordType::Noun);
    }

    #[test]
    fn non_noun_never_keeps_an_article() {
        let raw = RawClassification {
            word: Some("schnell".into()),
            word_type: Some("adjective".into()),
            article: Some("die".into()),
        };
        let result = reconcile("schnell", Some(raw));
        assert_eq!(result.word_type, WordType::Adjective);
        assert_eq!(result.article, None);
        assert_eq!(result.full_form, "schnell");
    }

    #[test]
    fn multi_word_candidate_becomes_phrase() {
        let raw = RawClassification {
            word: Some("entwickeln".into()),
            word_type: Some("verb".into()),
            article: None,
        };
        let result = reconcile("sich entwickeln", Some(raw));
        assert_eq!(result.word_type, WordType::Phrase);
        assert_eq!(result.article, None);
        assert_eq!(result.word, "sich entwickeln");
    }

    #[test]
    fn missing_answer_degrades_to_default() {
        let result = reconcile("Fernweh", None);
        assert_eq!(result.word_type, WordType::Other);
        assert_eq!(result.article, None);
        assert_eq!(result.word, "Fernweh");
        assert_eq!(result.full_form, "Fernweh");
    }

    #[test]
    fn unknown_word_type_maps_to_other() {
        let raw = RawClassification {
            word: None,
            word_type: Some("interjection".into()),
            article: None,
        };
        let result = reconcile("ach", Some(raw));
        assert_eq!(result.word_type, WordType::Other);
    }

    #[test]
    fn leading_article_split_handles_case_and_umlauts() {
        let (article, rest) = split_leading_article("Die Übung").unwrap();
        assert_eq!(article, Article::Die);
        assert_eq!(rest, "Übung");
        assert!(split_leading_article("Hund").is_none());
        assert!(split_leading_article("der").is_none());
    }
}
