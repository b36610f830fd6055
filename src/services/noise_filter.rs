use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Definite and indefinite articles, including declined forms.
pub const ARTICLES: &[&str] = &[
    "der", "die", "das", "den", "dem", "des", "ein", "eine", "einer", "einen", "einem", "eines",
];

/// Personal, possessive, demonstrative, interrogative and reflexive pronouns.
const PRONOUNS: &[&str] = &[
    "ich", "du", "er", "sie", "es", "wir", "ihr",
    "mein", "meine", "meiner", "meinen", "meinem", "meines",
    "dein", "deine", "deiner", "deinen", "deinem", "deines",
    "sein", "seine", "seiner", "seinen", "seinem", "seines",
    "ihre", "ihrer", "ihren", "ihrem", "ihres",
    "unser", "unsere", "unserer", "unseren", "unserem", "unseres",
    "euer", "eure", "eurer", "euren", "eurem", "eures",
    "dieser", "diese", "dieses", "diesen", "diesem",
    "jener", "jene", "jenes", "jenen", "jenem",
    "wer", "was", "welcher", "welche", "welches",
    "mich", "mir", "dich", "dir", "sich", "uns", "euch",
];

const PREPOSITIONS: &[&str] = &[
    "an", "auf", "aus", "bei", "durch", "für", "gegen", "hinter", "in", "mit", "nach", "neben",
    "ohne", "über", "um", "unter", "von", "vor", "zu", "zwischen",
];

const CONJUNCTIONS: &[&str] = &[
    "und", "oder", "aber", "denn", "sondern", "dass", "weil", "wenn", "als", "wie", "ob", "bis",
    "seit", "während", "bevor", "nachdem",
];

static FILTERED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ARTICLES
        .iter()
        .chain(PRONOUNS)
        .chain(PREPOSITIONS)
        .chain(CONJUNCTIONS)
        .copied()
        .collect()
});

/// True if the word is a German function word that should never become a
/// vocabulary entry on its own. Matching is case-insensitive.
pub fn should_filter(word: &str) -> bool {
    FILTERED_WORDS.contains(word.trim().to_lowercase().as_str())
}

/// True if the text still has two or more content words once articles are
/// dropped. Such entries are treated as phrases rather than single words.
pub fn is_phrase(text: &str) -> bool {
    text.split_whitespace()
        .filter(|word| {
            let lower = word.to_lowercase();
            !ARTICLES.contains(&lower.as_str())
        })
        .count()
        >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_articles_case_insensitively() {
        assert!(should_filter("der"));
        assert!(should_filter("Der"));
        assert!(should_filter("EINE"));
        assert!(!should_filter("Hund"));
    }

    #[test]
    fn filters_pronouns_prepositions_conjunctions() {
        assert!(should_filter("sich"));
        assert!(should_filter("zwischen"));
        assert!(should_filter("während"));
        assert!(!should_filter("laufen"));
        assert!(!should_filter("schnell"));
    }

    #[test]
    fn single_word_with_article_is_not_a_phrase() {
        assert!(!is_phrase("der Hund"));
        assert!(!is_phrase("Hund"));
    }

    #[test]
    fn multiple_content_words_form_a_phrase() {
        assert!(is_phrase("sich entwickeln"));
        assert!(is_phrase("der rote Faden"));
        assert!(is_phrase("Anfang Oktober"));
    }
}
