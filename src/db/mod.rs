pub mod users;
pub mod words;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbInitError {
    #[error("DATABASE_URL is not set")]
    MissingUrl,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn from_env() -> Result<Self, DbInitError> {
        let url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(DbInitError::MissingUrl)?;

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&url)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn ping(&self) -> bool {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }

    /// Idempotent schema bootstrap.
    async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id              BIGSERIAL PRIMARY KEY,
                telegram_id     BIGINT UNIQUE NOT NULL,
                username        VARCHAR(255),
                first_name      VARCHAR(255),
                last_name       VARCHAR(255),
                created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                last_active     TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS words (
                id              BIGSERIAL PRIMARY KEY,
                user_id         BIGINT NOT NULL REFERENCES users(id),
                word            VARCHAR(255) NOT NULL,
                article         VARCHAR(10),
                word_type       VARCHAR(50) NOT NULL DEFAULT 'other',
                translation     VARCHAR(255) NOT NULL,
                correct_count   INTEGER NOT NULL DEFAULT 0,
                incorrect_count INTEGER NOT NULL DEFAULT 0,
                total_reviews   INTEGER NOT NULL DEFAULT 0,
                date_added      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                last_reviewed   TIMESTAMPTZ,
                status          VARCHAR(50) NOT NULL DEFAULT 'active'
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_words_user_status ON words(user_id, status)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
