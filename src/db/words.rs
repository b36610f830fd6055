use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::services::classifier::Classification;

/// Sentinel translation for entries whose meaning has not been resolved yet.
/// Filled exactly once, on the first successful quiz attempt.
pub const PENDING_TRANSLATION: &str = "[pending]";

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_DELETED: &str = "deleted";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Word {
    pub id: i64,
    pub user_id: i64,
    pub word: String,
    pub article: Option<String>,
    pub word_type: String,
    pub translation: String,
    pub correct_count: i32,
    pub incorrect_count: i32,
    pub total_reviews: i32,
    pub date_added: DateTime<Utc>,
    pub last_reviewed: Option<DateTime<Utc>>,
    pub status: String,
}

impl Word {
    /// The word with its article re-attached, when one exists.
    pub fn full_form(&self) -> String {
        match self.article.as_deref() {
            Some(article) => format!("{article} {}", self.word),
            None => self.word.clone(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.translation == PENDING_TRANSLATION
    }
}

/// Outcome of a bulk save; skipped entries were logged individually.
#[derive(Debug, Clone, Copy, Default)]
pub struct BulkSaveReport {
    pub saved: usize,
    pub skipped: usize,
}

const WORD_COLUMNS: &str = "id, user_id, word, article, word_type, translation, \
     correct_count, incorrect_count, total_reviews, date_added, last_reviewed, status";

pub async fn create(
    pool: &PgPool,
    user_id: i64,
    candidate: &Classification,
    translation: &str,
) -> Result<Word, sqlx::Error> {
    let word = sqlx::query_as::<_, Word>(&format!(
        r#"
        INSERT INTO words (user_id, word, article, word_type, translation)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {WORD_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(&candidate.word)
    .bind(candidate.article.map(|a| a.as_str()))
    .bind(candidate.word_type.as_str())
    .bind(translation)
    .fetch_one(pool)
    .await?;

    info!(word = %word.full_form(), user_id, "created word");
    Ok(word)
}

pub async fn create_pending(
    pool: &PgPool,
    user_id: i64,
    candidate: &Classification,
) -> Result<Word, sqlx::Error> {
    create(pool, user_id, candidate, PENDING_TRANSLATION).await
}

/// Saves each candidate in its own statement. A failing row is logged and
/// skipped; the remaining rows still go in. The report carries the count
/// discrepancy back to the caller.
pub async fn bulk_create_pending(
    pool: &PgPool,
    user_id: i64,
    candidates: &[Classification],
) -> BulkSaveReport {
    let mut report = BulkSaveReport::default();
    for candidate in candidates {
        match create_pending(pool, user_id, candidate).await {
            Ok(_) => report.saved += 1,
            Err(err) => {
                warn!(word = %candidate.word, error = %err, "skipping candidate during bulk save");
                report.skipped += 1;
            }
        }
    }
    report
}

pub async fn get_by_id(pool: &PgPool, word_id: i64) -> Result<Option<Word>, sqlx::Error> {
    sqlx::query_as::<_, Word>(&format!("SELECT {WORD_COLUMNS} FROM words WHERE id = $1"))
        .bind(word_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_words(
    pool: &PgPool,
    user_id: i64,
    limit: Option<i64>,
) -> Result<Vec<Word>, sqlx::Error> {
    sqlx::query_as::<_, Word>(&format!(
        r#"
        SELECT {WORD_COLUMNS} FROM words
        WHERE user_id = $1 AND status = $2
        ORDER BY date_added DESC
        LIMIT $3
        "#
    ))
    .bind(user_id)
    .bind(STATUS_ACTIVE)
    .bind(limit.unwrap_or(i64::MAX))
    .fetch_all(pool)
    .await
}

pub async fn count_words(pool: &PgPool, user_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM words WHERE user_id = $1 AND status = $2")
        .bind(user_id)
        .bind(STATUS_ACTIVE)
        .fetch_one(pool)
        .await
}

pub async fn random_word(pool: &PgPool, user_id: i64) -> Result<Option<Word>, sqlx::Error> {
    sqlx::query_as::<_, Word>(&format!(
        r#"
        SELECT {WORD_COLUMNS} FROM words
        WHERE user_id = $1 AND status = $2
        ORDER BY RANDOM()
        LIMIT 1
        "#
    ))
    .bind(user_id)
    .bind(STATUS_ACTIVE)
    .fetch_optional(pool)
    .await
}

/// Fills the pending translation. Guarded on the sentinel so a concurrent
/// quiz cannot overwrite an already-resolved translation.
pub async fn resolve_translation(
    pool: &PgPool,
    word_id: i64,
    translation: &str,
) -> Result<(), sqlx::Error> {
    let result = sqlx::query("UPDATE words SET translation = $1 WHERE id = $2 AND translation = $3")
        .bind(translation)
        .bind(word_id)
        .bind(PENDING_TRANSLATION)
        .execute(pool)
        .await?;

    if result.rows_affected() > 0 {
        info!(word_id, %translation, "resolved pending translation");
    }
    Ok(())
}

pub async fn update_review_stats(
    pool: &PgPool,
    word_id: i64,
    is_correct: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE words SET
            total_reviews = total_reviews + 1,
            correct_count = correct_count + CASE WHEN $2 THEN 1 ELSE 0 END,
            incorrect_count = incorrect_count + CASE WHEN $2 THEN 0 ELSE 1 END,
            last_reviewed = NOW()
        WHERE id = $1
        "#,
    )
    .bind(word_id)
    .bind(is_correct)
    .execute(pool)
    .await?;
    Ok(())
}

/// Soft delete; the row stays for history.
pub async fn soft_delete(pool: &PgPool, word_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE words SET status = $1 WHERE id = $2 AND status = $3")
        .bind(STATUS_DELETED)
        .bind(word_id)
        .bind(STATUS_ACTIVE)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn search_words(
    pool: &PgPool,
    user_id: i64,
    term: &str,
) -> Result<Vec<Word>, sqlx::Error> {
    let pattern = format!("%{term}%");
    sqlx::query_as::<_, Word>(&format!(
        r#"
        SELECT {WORD_COLUMNS} FROM words
        WHERE user_id = $1 AND status = $2
          AND (word ILIKE $3 OR translation ILIKE $3)
        ORDER BY date_added DESC
        "#
    ))
    .bind(user_id)
    .bind(STATUS_ACTIVE)
    .bind(pattern)
    .fetch_all(pool)
    .await
}
