//! Repository for the `stories` table.

use dailystory_core::story::NewStory;
use dailystory_core::types::StoryDate;
use sqlx::PgPool;

use crate::models::story::StoryRow;

/// Column list for `stories` queries.
const COLUMNS: &str = "id, title, content, date, ai_source, created_at";

/// Name of the unique constraint on `stories.date`.
pub const UQ_STORIES_DATE: &str = "uq_stories_date";

/// PostgreSQL SQLSTATE for `unique_violation`.
const PG_UNIQUE_VIOLATION: &str = "23505";

/// Provides insert and read operations for stories. Stories are never
/// updated or deleted.
pub struct StoryRepo;

impl StoryRepo {
    /// Insert a story, failing with a `23505` database error when the date
    /// is already taken.
    ///
    /// The store goes through [`StoryRepo::create_if_absent`]. This plain
    /// insert surfaces constraint violations as errors, which is what
    /// [`is_date_conflict`] classifies.
    pub async fn create(pool: &PgPool, input: &NewStory) -> Result<StoryRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO stories (title, content, date, ai_source) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StoryRow>(&query)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.date)
            .bind(&input.ai_source)
            .fetch_one(pool)
            .await
    }

    /// Insert a story unless one already exists for its date.
    ///
    /// Returns `None` when the date collided. The check and the write are a
    /// single statement, so concurrent callers cannot both succeed.
    pub async fn create_if_absent(
        pool: &PgPool,
        input: &NewStory,
    ) -> Result<Option<StoryRow>, sqlx::Error> {
        let query = format!(
            "INSERT INTO stories (title, content, date, ai_source) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT ON CONSTRAINT {UQ_STORIES_DATE} DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StoryRow>(&query)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.date)
            .bind(&input.ai_source)
            .fetch_optional(pool)
            .await
    }

    /// Find the story for a date.
    pub async fn find_by_date(
        pool: &PgPool,
        date: StoryDate,
    ) -> Result<Option<StoryRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stories WHERE date = $1");
        sqlx::query_as::<_, StoryRow>(&query)
            .bind(date)
            .fetch_optional(pool)
            .await
    }

    /// List stories newest date first.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<StoryRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM stories \
             ORDER BY date DESC \
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, StoryRow>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}

/// Whether `err` is a unique violation of `uq_stories_date`.
pub fn is_date_conflict(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some(PG_UNIQUE_VIOLATION)
                && db_err.constraint() == Some(UQ_STORIES_DATE)
        }
        _ => false,
    }
}
