use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db;
use crate::db::words;
use crate::response::AppError;
use crate::services::validator;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QuizQuery {
    telegram_id: i64,
}

#[derive(Serialize)]
pub struct QuizQuestionResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    word_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    full_form: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

/// Picks a random active word for the user to translate.
pub async fn next_question(
    State(state): State<AppState>,
    Query(query): Query<QuizQuery>,
) -> Result<Json<QuizQuestionResponse>, AppError> {
    let db = state
        .db()
        .ok_or_else(|| AppError::service_unavailable("database not available"))?;
    let user = db::users::get_or_create(db.pool(), query.telegram_id, None, None, None)
        .await
        .map_err(|e| AppError::internal(e.to_string()))?;

    let Some(word) = words::random_word(db.pool(), user.id)
        .await
        .map_err(|e| AppError::internal(e.to_string()))?
    else {
        return Ok(Json(QuizQuestionResponse {
            success: true,
            word_id: None,
            full_form: None,
            message: Some("No words yet. Add some vocabulary first."),
        }));
    };

    Ok(Json(QuizQuestionResponse {
        success: true,
        word_id: Some(word.id),
        full_form: Some(word.full_form()),
        message: None,
    }))
}

#[derive(Debug, Deserialize)]
pub struct QuizAnswerRequest {
    word_id: i64,
    answer: String,
}

#[derive(Serialize)]
pub struct QuizAnswerResponse {
    success: bool,
    is_correct: bool,
    feedback: String,
    full_form: String,
    translation: String,
    correct_count: i32,
    incorrect_count: i32,
    total_reviews: i32,
}

/// Checks a quiz answer against the language service. The first successful
/// check of a pending word stores the reference translation; every check
/// afterwards only updates the review counters.
pub async fn answer(
    State(state): State<AppState>,
    Json(request): Json<QuizAnswerRequest>,
) -> Result<Json<QuizAnswerResponse>, AppError> {
    if request.answer.trim().is_empty() {
        return Err(AppError::validation("answer must not be empty"));
    }

    let db = state
        .db()
        .ok_or_else(|| AppError::service_unavailable("database not available"))?;
    let word = words::get_by_id(db.pool(), request.word_id)
        .await
        .map_err(|e| AppError::internal(e.to_string()))?
        .ok_or_else(|| AppError::not_found("word not found"))?;

    let check =
        validator::validate_translation(state.llm().as_ref(), &word.full_form(), &request.answer)
            .await;

    if word.is_pending() {
        if let Some(translation) = check.correct_translation.as_deref() {
            words::resolve_translation(db.pool(), word.id, translation)
                .await
                .map_err(|e| AppError::internal(e.to_string()))?;
        }
    }

    words::update_review_stats(db.pool(), word.id, check.is_correct)
        .await
        .map_err(|e| AppError::internal(e.to_string()))?;

    let refreshed = words::get_by_id(db.pool(), word.id)
        .await
        .map_err(|e| AppError::internal(e.to_string()))?
        .unwrap_or(word);

    Ok(Json(QuizAnswerResponse {
        success: true,
        is_correct: check.is_correct,
        feedback: check.feedback,
        full_form: refreshed.full_form(),
        translation: refreshed.translation.clone(),
        correct_count: refreshed.correct_count,
        incorrect_count: refreshed.incorrect_count,
        total_reviews: refreshed.total_reviews,
    }))
}
