//! [`StoryStore`] implementation on top of Postgres.

use async_trait::async_trait;
use dailystory_core::store::{InsertOutcome, StoreError, StoryStore};
use dailystory_core::story::{NewStory, Story};
use dailystory_core::types::StoryDate;

use crate::repositories::story_repo::{is_date_conflict, StoryRepo};
use crate::DbPool;

/// Postgres-backed story store. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PgStoryStore {
    pool: DbPool,
}

impl PgStoryStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn unavailable(err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

#[async_trait]
impl StoryStore for PgStoryStore {
    async fn find_by_date(&self, date: StoryDate) -> Result<Option<Story>, StoreError> {
        let row = StoryRepo::find_by_date(&self.pool, date)
            .await
            .map_err(unavailable)?;
        Ok(row.map(Story::from))
    }

    async fn insert(&self, story: NewStory) -> Result<InsertOutcome, StoreError> {
        match StoryRepo::create_if_absent(&self.pool, &story).await {
            Ok(Some(row)) => Ok(InsertOutcome::Created(row.into())),
            Ok(None) => Ok(InsertOutcome::AlreadyExists),
            // `ON CONFLICT` only names `uq_stories_date`. A unique violation on
            // that constraint that still surfaces is the same collision.
            Err(err) if is_date_conflict(&err) => Ok(InsertOutcome::AlreadyExists),
            Err(err) => {
                tracing::error!(date = %story.date, error = %err, "Story insert failed");
                Err(unavailable(err))
            }
        }
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Story>, StoreError> {
        let rows = StoryRepo::list(&self.pool, limit, offset)
            .await
            .map_err(unavailable)?;
        Ok(rows.into_iter().map(Story::from).collect())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await.map_err(unavailable)
    }
}
