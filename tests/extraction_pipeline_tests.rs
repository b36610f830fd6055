use std::sync::Mutex;

use wortschatz_backend::services::classifier::{
    classify_batch, Article, ClassificationBackend, ClassifyError, RawClassification, WordType,
};
use wortschatz_backend::services::vocabulary;

fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Canned grammar answers standing in for the language service.
fn canned_answer(word: &str) -> RawClassification {
    let (word_type, article) = match word {
        "Hund" => ("noun", Some("der")),
        "Katze" => ("noun", Some("die")),
        "schnell" => ("adjective", Some("die")), // bogus article on purpose
        "laufen" => ("verb", None),
        _ => ("other", None),
    };
    RawClassification {
        word: Some(word.to_string()),
        word_type: Some(word_type.to_string()),
        article: article.map(String::from),
    }
}

/// Every tier fails: chunk requests and single requests alike.
struct UnreachableBackend;

impl ClassificationBackend for UnreachableBackend {
    async fn classify_chunk(
        &self,
        _words: &[String],
    ) -> Result<Vec<RawClassification>, ClassifyError> {
        Err(ClassifyError::Malformed("service unreachable".into()))
    }

    async fn classify_single(&self, _word: &str) -> Result<RawClassification, ClassifyError> {
        Err(ClassifyError::Malformed("service unreachable".into()))
    }
}

/// Chunk requests fail; single requests answer from the canned table.
struct ChunkFailingBackend;

impl ClassificationBackend for ChunkFailingBackend {
    async fn classify_chunk(
        &self,
        _words: &[String],
    ) -> Result<Vec<RawClassification>, ClassifyError> {
        Err(ClassifyError::Malformed("chunk timed out".into()))
    }

    async fn classify_single(&self, word: &str) -> Result<RawClassification, ClassifyError> {
        Ok(canned_answer(word))
    }
}

/// Healthy backend that records the chunk sizes it was asked for.
struct RecordingBackend {
    chunk_sizes: Mutex<Vec<usize>>,
}

impl RecordingBackend {
    fn new() -> Self {
        Self {
            chunk_sizes: Mutex::new(Vec::new()),
        }
    }
}

impl ClassificationBackend for RecordingBackend {
    async fn classify_chunk(
        &self,
        words: &[String],
    ) -> Result<Vec<RawClassification>, ClassifyError> {
        self.chunk_sizes.lock().unwrap().push(words.len());
        Ok(words.iter().map(|w| canned_answer(w)).collect())
    }

    async fn classify_single(&self, word: &str) -> Result<RawClassification, ClassifyError> {
        Ok(canned_answer(word))
    }
}

/// Returns one answer too few, which must count as a chunk failure.
struct TruncatingBackend;

impl ClassificationBackend for TruncatingBackend {
    async fn classify_chunk(
        &self,
        words: &[String],
    ) -> Result<Vec<RawClassification>, ClassifyError> {
        Ok(words
            .iter()
            .skip(1)
            .map(|w| canned_answer(w))
            .collect())
    }

    async fn classify_single(&self, word: &str) -> Result<RawClassification, ClassifyError> {
        Ok(canned_answer(word))
    }
}

#[tokio::test]
async fn total_outage_still_yields_one_result_per_input() {
    let candidates = words(&["Hund", "schnell", "laufen", "Katze", "Fernweh"]);
    let results = classify_batch(&UnreachableBackend, &candidates, 30).await;

    assert_eq!(results.len(), candidates.len());
    for (candidate, result) in candidates.iter().zip(&results) {
        assert_eq!(&result.word, candidate);
        assert_eq!(result.word_type, WordType::Other);
        assert_eq!(result.article, None);
    }
}

#[tokio::test]
async fn chunk_failure_degrades_to_single_requests() {
    let candidates = words(&["Hund", "schnell", "laufen"]);
    let results = classify_batch(&ChunkFailingBackend, &candidates, 30).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].word_type, WordType::Noun);
    assert_eq!(results[0].article, Some(Article::Der));
    assert_eq!(results[1].word_type, WordType::Adjective);
    assert_eq!(results[1].article, None, "bogus article must be suppressed");
    assert_eq!(results[2].word_type, WordType::Verb);
    assert_eq!(results[2].article, None);
}

#[tokio::test]
async fn cardinality_mismatch_is_treated_as_chunk_failure() {
    let candidates = words(&["Hund", "Katze", "laufen"]);
    let results = classify_batch(&TruncatingBackend, &candidates, 30).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].article, Some(Article::Der));
    assert_eq!(results[1].article, Some(Article::Die));
    assert_eq!(results[2].word_type, WordType::Verb);
}

#[tokio::test]
async fn candidates_are_chunked_sequentially_by_batch_size() {
    let candidates = words(&["Hund", "Katze", "laufen", "schnell", "Haus", "Baum", "Tür"]);
    let backend = RecordingBackend::new();
    let results = classify_batch(&backend, &candidates, 3).await;

    assert_eq!(results.len(), 7);
    assert_eq!(*backend.chunk_sizes.lock().unwrap(), vec![3, 3, 1]);
}

#[tokio::test]
async fn determiner_in_input_wins_over_service_answer() {
    let candidates = words(&["der Eigentümer"]);
    // Single answer claims "das"; the determiner in the raw text is truth.
    struct WrongArticleBackend;
    impl ClassificationBackend for WrongArticleBackend {
        async fn classify_chunk(
            &self,
            words: &[String],
        ) -> Result<Vec<RawClassification>, ClassifyError> {
            Ok(words
                .iter()
                .map(|w| RawClassification {
                    word: Some(w.clone()),
                    word_type: Some("noun".into()),
                    article: Some("das".into()),
                })
                .collect())
        }
        async fn classify_single(
            &self,
            _word: &str,
        ) -> Result<RawClassification, ClassifyError> {
            unreachable!("chunk path succeeds")
        }
    }

    let results = classify_batch(&WrongArticleBackend, &candidates, 30).await;
    assert_eq!(results[0].article, Some(Article::Der));
    assert_eq!(results[0].word, "Eigentümer");
    assert_eq!(results[0].full_form, "der Eigentümer");
}

#[tokio::test]
async fn noise_words_are_filtered_before_classification() {
    let candidates = words(&["Hund", "schnell", "der", "laufen"]);
    let extraction = vocabulary::classify_candidates(&ChunkFailingBackend, candidates, 30).await;

    assert_eq!(extraction.filtered, vec!["der"]);
    let classified: Vec<(&str, WordType)> = extraction
        .candidates
        .iter()
        .map(|c| (c.word.as_str(), c.word_type))
        .collect();
    assert_eq!(
        classified,
        vec![
            ("Hund", WordType::Noun),
            ("schnell", WordType::Adjective),
            ("laufen", WordType::Verb),
        ]
    );
}

#[tokio::test]
async fn function_word_only_input_leaves_nothing_to_review() {
    let extraction = vocabulary::extract_from_text(&UnreachableBackend, "der\ndie", 30).await;

    assert!(extraction.candidates.is_empty());
    assert_eq!(extraction.filtered, vec!["der", "die"]);
}

#[tokio::test]
async fn bulk_text_pipeline_end_to_end() {
    let text = "der Eigentümer,-= der Besitzer,/ владелец\n\
                anfangen fing an angefangen начинаться\n\
                sich entwickeln развиваться\n\
                der\n\
                DER EIGENTÜMER";

    let extraction =
        vocabulary::extract_from_text(&UnreachableBackend, text, 30).await;

    // "der" alone is noise; the repeated owner line is a case-insensitive
    // duplicate and never reaches the classifier.
    assert_eq!(extraction.filtered, vec!["der"]);
    let extracted: Vec<&str> = extraction
        .candidates
        .iter()
        .map(|c| c.full_form.as_str())
        .collect();
    assert_eq!(
        extracted,
        vec!["der Eigentümer", "anfangen", "sich entwickeln"]
    );
    // The determiner survives even with the classifier down.
    assert_eq!(extraction.candidates[0].article, Some(Article::Der));
    assert_eq!(extraction.candidates[1].word_type, WordType::Other);
    assert_eq!(extraction.candidates[2].word_type, WordType::Phrase);
}
