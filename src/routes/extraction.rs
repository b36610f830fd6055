use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db;
use crate::db::words;
use crate::response::AppError;
use crate::services::classifier::{Article, Classification, WordType};
use crate::services::review::{self, ReviewCommand};
use crate::services::vocabulary::{self, Extraction};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExtractTextRequest {
    telegram_id: i64,
    text: String,
}

#[derive(Serialize)]
pub struct ExtractionResponse {
    success: bool,
    candidates: Vec<CandidateView>,
    filtered: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

#[derive(Serialize)]
struct CandidateView {
    /// 1-based position, referenced by the `remove` review command.
    index: usize,
    word: String,
    word_type: WordType,
    #[serde(skip_serializing_if = "Option::is_none")]
    article: Option<Article>,
    full_form: String,
}

fn extraction_response(extraction: Extraction) -> ExtractionResponse {
    // An all-filtered run still has nothing to review; the user gets the
    // explicit outcome either way, never a silent empty list.
    let message = if extraction.candidates.is_empty() {
        Some("No vocabulary found in the input.")
    } else {
        None
    };

    let candidates = extraction
        .candidates
        .into_iter()
        .enumerate()
        .map(|(pos, c)| CandidateView {
            index: pos + 1,
            word: c.word,
            word_type: c.word_type,
            article: c.article,
            full_form: c.full_form,
        })
        .collect();

    ExtractionResponse {
        success: true,
        candidates,
        filtered: extraction.filtered,
        message,
    }
}

pub async fn extract_text(
    State(state): State<AppState>,
    Json(request): Json<ExtractTextRequest>,
) -> Result<Json<ExtractionResponse>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::validation("text must not be empty"));
    }
    ensure_user(&state, request.telegram_id).await?;

    let extraction = vocabulary::extract_from_text(
        state.classifier().as_ref(),
        &request.text,
        state.batch_size(),
    )
    .await;

    Ok(Json(extraction_response(extraction)))
}

pub async fn extract_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractionResponse>, AppError> {
    let mut telegram_id: Option<i64> = None;
    let mut image: Option<bytes::Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("telegram_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::bad_request(format!("bad telegram_id field: {e}")))?;
                telegram_id = text.trim().parse().ok();
            }
            Some("image") => {
                image = Some(field.bytes().await.map_err(|e| {
                    AppError::bad_request(format!("bad image field: {e}"))
                })?);
            }
            _ => {}
        }
    }

    let telegram_id =
        telegram_id.ok_or_else(|| AppError::validation("telegram_id field is required"))?;
    let image = image.ok_or_else(|| AppError::validation("image field is required"))?;
    ensure_user(&state, telegram_id).await?;

    let extraction = vocabulary::extract_from_image(
        state.classifier().as_ref(),
        state.ocr().as_ref(),
        &image,
        state.batch_size(),
    )
    .await;

    Ok(Json(extraction_response(extraction)))
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    telegram_id: i64,
    /// One of the accepted review commands: an affirmative token,
    /// `remove i,j,k`, or a cancel token.
    command: String,
    candidates: Vec<CandidateInput>,
}

#[derive(Debug, Deserialize)]
struct CandidateInput {
    word: String,
    word_type: WordType,
    #[serde(default)]
    article: Option<Article>,
}

impl CandidateInput {
    fn into_classification(self) -> Classification {
        let article = if self.word_type == WordType::Noun {
            self.article
        } else {
            None
        };
        let full_form = match article {
            Some(a) => format!("{} {}", a.as_str(), self.word),
            None => self.word.clone(),
        };
        Classification {
            word: self.word,
            word_type: self.word_type,
            article,
            full_form,
        }
    }
}

#[derive(Serialize)]
pub struct ConfirmResponse {
    success: bool,
    outcome: &'static str,
    saved: usize,
    skipped: usize,
    message: String,
}

pub async fn confirm(
    State(state): State<AppState>,
    Json(request): Json<ConfirmRequest>,
) -> Result<Json<ConfirmResponse>, AppError> {
    let Some(command) = review::parse_command(&request.command) else {
        return Err(AppError::validation(
            "unrecognized command: use an affirmative, 'remove i,j,k' or a cancel token",
        ));
    };

    let candidates: Vec<Classification> = request
        .candidates
        .into_iter()
        .map(CandidateInput::into_classification)
        .collect();

    let to_save = match command {
        ReviewCommand::Cancel => {
            return Ok(Json(ConfirmResponse {
                success: true,
                outcome: "discarded",
                saved: 0,
                skipped: 0,
                message: "Batch discarded.".to_string(),
            }));
        }
        ReviewCommand::SaveAll => candidates,
        ReviewCommand::Remove(indices) => match review::apply_removals(candidates, &indices) {
            Some(remaining) => remaining,
            None => {
                return Ok(Json(ConfirmResponse {
                    success: false,
                    outcome: "rejected",
                    saved: 0,
                    skipped: 0,
                    message: "Removing every candidate leaves nothing to save; batch discarded."
                        .to_string(),
                }));
            }
        },
    };

    if to_save.is_empty() {
        return Err(AppError::validation("candidate list is empty"));
    }

    let db = state
        .db()
        .ok_or_else(|| AppError::service_unavailable("database not available"))?;
    let user = db::users::get_or_create(db.pool(), request.telegram_id, None, None, None)
        .await
        .map_err(|e| AppError::internal(e.to_string()))?;

    let report = words::bulk_create_pending(db.pool(), user.id, &to_save).await;

    Ok(Json(ConfirmResponse {
        success: true,
        outcome: "saved",
        saved: report.saved,
        skipped: report.skipped,
        message: format!(
            "Saved {} word(s){}.",
            report.saved,
            if report.skipped > 0 {
                format!(", {} skipped", report.skipped)
            } else {
                String::new()
            }
        ),
    }))
}

async fn ensure_user(state: &AppState, telegram_id: i64) -> Result<(), AppError> {
    if let Some(db) = state.db() {
        db::users::get_or_create(db.pool(), telegram_id, None, None, None)
            .await
            .map_err(|e| AppError::internal(e.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_filtered_run_still_reports_nothing_found() {
        let extraction = Extraction {
            candidates: Vec::new(),
            filtered: vec!["der".to_string(), "die".to_string()],
        };
        let response = extraction_response(extraction);
        assert!(response.message.is_some());
        assert!(response.candidates.is_empty());
        assert_eq!(response.filtered, vec!["der", "die"]);
    }

    #[test]
    fn surviving_candidates_suppress_the_message() {
        let extraction = Extraction {
            candidates: vec![Classification {
                word: "Hund".to_string(),
                word_type: WordType::Noun,
                article: Some(Article::Der),
                full_form: "der Hund".to_string(),
            }],
            filtered: vec!["der".to_string()],
        };
        let response = extraction_response(extraction);
        assert!(response.message.is_none());
        assert_eq!(response.candidates.len(), 1);
        assert_eq!(response.candidates[0].index, 1);
    }
}
