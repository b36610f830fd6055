//! Translation validation for quiz answers. The same language service that
//! classifies words judges whether a user's English translation is close
//! enough, and supplies the reference translation that fills a pending entry
//! on the first attempt.

use serde::Deserialize;
use tracing::warn;

use crate::services::llm_provider::{extract_json, LLMProvider};

const VALIDATE_TEMPERATURE: f32 = 0.3;

const SYSTEM_PROMPT: &str = "You are a helpful German vocabulary tutor for English speakers. \
Check whether the user's English translation of the German word is correct; \
accept synonyms and close matches. Keep feedback encouraging and to one or \
two sentences. Return a JSON object with the fields \
\"is_correct\" (boolean), \"feedback\" (string) and \
\"correct_translation\" (the reference English translation).";

/// Verdict on a quiz answer. `correct_translation` is present only when the
/// service call succeeded, which gates the one-time fill of a pending entry.
#[derive(Debug, Clone)]
pub struct TranslationCheck {
    pub is_correct: bool,
    pub feedback: String,
    pub correct_translation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ValidationResponse {
    #[serde(default)]
    is_correct: bool,
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    correct_translation: Option<String>,
}

/// Validates a translation. Service failures degrade to a neutral "could not
/// check" verdict instead of an error; the pending translation then stays
/// pending for a later attempt.
pub async fn validate_translation(
    provider: &LLMProvider,
    full_form: &str,
    answer: &str,
) -> TranslationCheck {
    let prompt = format!(
        "German word: {full_form}\nUser's translation: {answer}\n\n\
         Validate the translation and provide feedback."
    );

    let content = match provider
        .complete_json(SYSTEM_PROMPT, &prompt, VALIDATE_TEMPERATURE)
        .await
    {
        Ok(content) => content,
        Err(err) => {
            warn!(word = %full_form, error = %err, "translation validation failed");
            return unavailable();
        }
    };

    match serde_json::from_str::<ValidationResponse>(&extract_json(&content)) {
        Ok(parsed) => TranslationCheck {
            is_correct: parsed.is_correct,
            feedback: if parsed.feedback.is_empty() {
                "Checked.".to_string()
            } else {
                parsed.feedback
            },
            correct_translation: parsed
                .correct_translation
                .filter(|t| !t.trim().is_empty()),
        },
        Err(err) => {
            warn!(word = %full_form, error = %err, "malformed validation response");
            unavailable()
        }
    }
}

fn unavailable() -> TranslationCheck {
    TranslationCheck {
        is_correct: false,
        feedback: "Sorry, I couldn't check the translation right now. Please try again."
            .to_string(),
        correct_translation: None,
    }
}
