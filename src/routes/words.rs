use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db;
use crate::db::words;
use crate::response::AppError;
use crate::services::classifier;
use crate::services::validator;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    telegram_id: i64,
    limit: Option<i64>,
    search: Option<String>,
}

#[derive(Serialize)]
pub struct WordListResponse {
    success: bool,
    total: i64,
    words: Vec<WordView>,
}

#[derive(Serialize)]
struct WordView {
    id: i64,
    word: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    article: Option<String>,
    word_type: String,
    full_form: String,
    translation: String,
    pending: bool,
    correct_count: i32,
    incorrect_count: i32,
    total_reviews: i32,
}

impl From<words::Word> for WordView {
    fn from(word: words::Word) -> Self {
        Self {
            id: word.id,
            full_form: word.full_form(),
            pending: word.is_pending(),
            word: word.word,
            article: word.article,
            word_type: word.word_type,
            translation: word.translation,
            correct_count: word.correct_count,
            incorrect_count: word.incorrect_count,
            total_reviews: word.total_reviews,
        }
    }
}

pub async fn list_words(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<WordListResponse>, AppError> {
    let db = state
        .db()
        .ok_or_else(|| AppError::service_unavailable("database not available"))?;
    let user = db::users::get_or_create(db.pool(), query.telegram_id, None, None, None)
        .await
        .map_err(|e| AppError::internal(e.to_string()))?;

    let listed = match query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(term) => words::search_words(db.pool(), user.id, term.trim()).await,
        None => words::list_words(db.pool(), user.id, query.limit).await,
    }
    .map_err(|e| AppError::internal(e.to_string()))?;

    let total = words::count_words(db.pool(), user.id)
        .await
        .map_err(|e| AppError::internal(e.to_string()))?;

    Ok(Json(WordListResponse {
        success: true,
        total,
        words: listed.into_iter().map(WordView::from).collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct AddWordRequest {
    telegram_id: i64,
    /// With or without a leading article; a missing article is looked up.
    word: String,
    translation: String,
}

#[derive(Serialize)]
pub struct AddWordResponse {
    success: bool,
    is_correct: bool,
    feedback: String,
    word: WordView,
    total_words: i64,
}

/// Manually adds one word. The word gets an article check, the supplied
/// translation is validated, and the entry is stored either way; the verdict
/// travels back as feedback rather than blocking the save.
pub async fn add_word(
    State(state): State<AppState>,
    Json(request): Json<AddWordRequest>,
) -> Result<Json<AddWordResponse>, AppError> {
    let word_text = request.word.trim();
    if word_text.is_empty() {
        return Err(AppError::validation("word must not be empty"));
    }
    let translation = request.translation.trim();
    if translation.is_empty() {
        return Err(AppError::validation("translation must not be empty"));
    }

    let db = state
        .db()
        .ok_or_else(|| AppError::service_unavailable("database not available"))?;
    let user = db::users::get_or_create(db.pool(), request.telegram_id, None, None, None)
        .await
        .map_err(|e| AppError::internal(e.to_string()))?;

    let mut classified = classifier::classify_batch(
        state.classifier().as_ref(),
        &[word_text.to_string()],
        1,
    )
    .await;
    let candidate = classified
        .pop()
        .unwrap_or_else(|| classifier::reconcile(word_text, None));

    let check =
        validator::validate_translation(state.llm().as_ref(), &candidate.full_form, translation)
            .await;

    let word = words::create(db.pool(), user.id, &candidate, translation)
        .await
        .map_err(|e| AppError::internal(e.to_string()))?;
    let total = words::count_words(db.pool(), user.id)
        .await
        .map_err(|e| AppError::internal(e.to_string()))?;

    Ok(Json(AddWordResponse {
        success: true,
        is_correct: check.is_correct,
        feedback: check.feedback,
        word: WordView::from(word),
        total_words: total,
    }))
}

#[derive(Serialize)]
pub struct DeleteResponse {
    success: bool,
    message: &'static str,
}

pub async fn delete_word(
    State(state): State<AppState>,
    Path(word_id): Path<i64>,
) -> Result<Json<DeleteResponse>, AppError> {
    let db = state
        .db()
        .ok_or_else(|| AppError::service_unavailable("database not available"))?;

    let deleted = words::soft_delete(db.pool(), word_id)
        .await
        .map_err(|e| AppError::internal(e.to_string()))?;

    if !deleted {
        return Err(AppError::not_found("word not found"));
    }

    Ok(Json(DeleteResponse {
        success: true,
        message: "word deleted",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use crate::services::llm_provider::LLMProvider;
    use crate::services::ocr::OcrClient;

    fn db_less_state() -> AppState {
        AppState::new(None, LLMProvider::from_env(), OcrClient::from_env(), 30)
    }

    #[tokio::test]
    async fn add_word_rejects_blank_word() {
        let result = add_word(
            State(db_less_state()),
            Json(AddWordRequest {
                telegram_id: 1,
                word: "   ".to_string(),
                translation: "dog".to_string(),
            }),
        )
        .await;
        let Err(err) = result else {
            panic!("blank word must be rejected")
        };
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn add_word_rejects_blank_translation() {
        let result = add_word(
            State(db_less_state()),
            Json(AddWordRequest {
                telegram_id: 1,
                word: "der Hund".to_string(),
                translation: "".to_string(),
            }),
        )
        .await;
        let Err(err) = result else {
            panic!("blank translation must be rejected")
        };
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn add_word_requires_the_database() {
        let result = add_word(
            State(db_less_state()),
            Json(AddWordRequest {
                telegram_id: 1,
                word: "der Hund".to_string(),
                translation: "dog".to_string(),
            }),
        )
        .await;
        let Err(err) = result else {
            panic!("missing database must surface as unavailable")
        };
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
