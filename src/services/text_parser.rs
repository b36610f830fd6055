//! Heuristic extraction of German vocabulary from bulk pasted text.
//!
//! Input lines are noisy: Cyrillic translation columns, grammar annotations,
//! verb paradigms, stray abbreviations. Each line goes through an ordered
//! sequence of named stages so every stage stays independently testable.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

/// Articles, the reflexive pronoun and common prepositions that are kept
/// attached to the word they modify ("sich entwickeln", "an teilnehmen").
const PARTICLES: &[&str] = &[
    "der", "die", "das", "sich", "an", "bei", "über", "um", "von", "auf", "für", "mit", "zu",
];

/// Common English function words; a line whose first word is one of these is
/// assumed to be a translation column, not German content.
const ENGLISH_STOPLIST: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "should", "could", "may", "might", "can", "to", "of",
    "in", "on", "at", "by",
];

const PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '"', '\'', '(', ')', '[', ']', '{', '}',
];

static CYRILLIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[а-яА-ЯёЁ]+").unwrap());
static COLUMN_DELIMITER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\t{2,}| {3,}|=").unwrap());
static GENDER_PLURAL_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r",[-/][a-z]*").unwrap());
static CASE_ABBREVIATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[ADG]\b").unwrap());
static UMLAUT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[äöüÄÖÜß]").unwrap());
static GERMAN_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-ZäöüÄÖÜß]").unwrap());
static CAPITALIZED_NOUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)[A-ZÄÖÜ][a-zäöüß]+").unwrap());

/// Extracts German words and phrases from bulk pasted text, one candidate per
/// line, deduplicated case-insensitively in first-seen order.
pub fn parse_bulk_text(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.trim().lines().collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut extracted = Vec::new();

    for (line_num, line) in lines.iter().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match extract_from_line(line) {
            Some(candidate) => {
                if seen.insert(candidate.to_lowercase()) {
                    debug!(line = line_num + 1, %candidate, "extracted");
                    extracted.push(candidate);
                } else {
                    debug!(line = line_num + 1, %candidate, "duplicate, skipped");
                }
            }
            None => debug!(line = line_num + 1, raw = %line, "no match, skipped"),
        }
    }

    info!(
        candidates = extracted.len(),
        lines = lines.len(),
        "bulk text parsed"
    );
    extracted
}

/// Extracts the German word or phrase from a single line, or nothing when the
/// line does not survive the plausibility checks.
pub fn extract_from_line(line: &str) -> Option<String> {
    let line = strip_foreign_script(line);
    if line.is_empty() {
        return None;
    }

    let segment = split_translation_columns(&line);
    let candidate = retain_plausible_tokens(&collapse_conjugation(&strip_grammar_annotations(
        segment,
    )));

    if !candidate.is_empty() && is_likely_german(&candidate) {
        Some(candidate)
    } else {
        None
    }
}

/// Stage 1: Cyrillic runs are translation noise, never a classification
/// signal, and get removed wholesale.
fn strip_foreign_script(line: &str) -> String {
    CYRILLIC.replace_all(line, "").trim().to_string()
}

/// Stage 2: split on strong column delimiters (double tab, three or more
/// spaces, equals sign) and keep the first segment; German content precedes
/// translations and annotations.
fn split_translation_columns(line: &str) -> &str {
    COLUMN_DELIMITER
        .split(line)
        .next()
        .unwrap_or(line)
        .trim()
}

/// Stage 3: strip `,-` / `,/e` gender and plural markers and stray
/// single-letter case abbreviations.
fn strip_grammar_annotations(segment: &str) -> String {
    let without_markers = GENDER_PLURAL_MARKER.replace_all(segment, "");
    CASE_ABBREVIATION
        .replace_all(&without_markers, "")
        .to_string()
}

/// Stage 4: collapse "anfangen fing an angefangen" shapes to the infinitive.
///
/// Pattern-based, not morphological: a second token that is lowercase, not a
/// particle and longer than 2 chars marks an inflected paradigm when the
/// first token carries an infinitive suffix. Irregular forms matching the
/// same shape are collapsed too; that is a known limitation.
fn collapse_conjugation(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() < 3 {
        return text.to_string();
    }

    let first = trim_punctuation(words[0]);
    let second = trim_punctuation(words[1]);

    let second_is_inflected = !PARTICLES.contains(&second.to_lowercase().as_str())
        && second.chars().next().is_some_and(|c| !c.is_uppercase())
        && second.chars().count() > 2;
    let first_is_infinitive = ["en", "eln", "ern", "n"]
        .iter()
        .any(|suffix| first.ends_with(suffix));

    if second_is_inflected && first_is_infinitive {
        first.to_string()
    } else {
        text.to_string()
    }
}

/// Stage 5: keep particles, capitalized tokens, tokens with verb or
/// diminutive suffixes, and anything longer than 3 chars; everything else
/// (stray fragments, abbreviations) is dropped.
fn retain_plausible_tokens(text: &str) -> String {
    let kept: Vec<&str> = text
        .split_whitespace()
        .map(trim_punctuation)
        .filter(|word| !word.is_empty())
        .filter(|word| {
            PARTICLES.contains(&word.to_lowercase().as_str())
                || word.chars().next().is_some_and(char::is_uppercase)
                || ["en", "eln", "ern", "n"].iter().any(|s| word.ends_with(s))
                || word.chars().count() > 3
        })
        .collect();

    kept.join(" ")
}

/// Stage 6: final plausibility gate.
fn is_likely_german(text: &str) -> bool {
    if text.chars().count() < 2 {
        return false;
    }
    if !GERMAN_LETTER.is_match(text) {
        return false;
    }
    if !text.chars().next().is_some_and(char::is_alphabetic) {
        return false;
    }

    let first_word = text
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();
    if ENGLISH_STOPLIST.contains(&first_word.as_str()) {
        return false;
    }

    let lower = text.to_lowercase();
    UMLAUT.is_match(text)
        || CAPITALIZED_NOUN.is_match(text)
        || ["en", "eln", "ern", "chen", "lein"]
            .iter()
            .any(|suffix| text.ends_with(suffix))
        || ["sich", "der", "die", "das"]
            .iter()
            .any(|particle| lower.contains(particle))
}

fn trim_punctuation(word: &str) -> &str {
    word.trim_matches(|c: char| PUNCTUATION.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_cyrillic_translation_and_second_clause() {
        let line = "der Eigentümer,-= der Besitzer,/ владелец";
        assert_eq!(extract_from_line(line).as_deref(), Some("der Eigentümer"));
    }

    #[test]
    fn collapses_verb_paradigm_to_infinitive() {
        let line = "anfangen fing an angefangen начинаться";
        assert_eq!(extract_from_line(line).as_deref(), Some("anfangen"));
    }

    #[test]
    fn keeps_reflexive_particle() {
        let line = "sich entwickeln развиваться";
        assert_eq!(extract_from_line(line).as_deref(), Some("sich entwickeln"));
    }

    #[test]
    fn keeps_pure_german_phrase() {
        assert_eq!(
            extract_from_line("Anfang Oktober").as_deref(),
            Some("Anfang Oktober")
        );
    }

    #[test]
    fn splits_on_triple_space_column() {
        assert_eq!(
            extract_from_line("die Katze   the cat").as_deref(),
            Some("die Katze")
        );
    }

    #[test]
    fn rejects_english_translation_line() {
        assert_eq!(extract_from_line("the owner"), None);
    }

    #[test]
    fn rejects_pure_noise() {
        assert_eq!(extract_from_line("측정 123"), None);
        assert_eq!(extract_from_line("---"), None);
    }

    #[test]
    fn does_not_collapse_without_infinitive_suffix() {
        // Three tokens, but the first is no infinitive, so nothing collapses.
        assert_eq!(
            extract_from_line("sich anmelden bei").as_deref(),
            Some("sich anmelden bei")
        );
    }

    #[test]
    fn deduplicates_case_insensitively_keeping_first() {
        let text = "der Hund\nDER HUND\nlaufen";
        assert_eq!(parse_bulk_text(text), vec!["der Hund", "laufen"]);
    }

    #[test]
    fn skips_empty_lines() {
        let text = "\n\nlaufen\n\n";
        assert_eq!(parse_bulk_text(text), vec!["laufen"]);
    }
}
