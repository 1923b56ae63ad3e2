//! In-process [`StoryStore`].
//!
//! Enforces date uniqueness the same way the Postgres store does: the
//! collision check and the write happen under one lock, and a collision is
//! reported as [`InsertOutcome::AlreadyExists`]. Used by tests and local
//! runs without a database.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use dailystory_core::store::{InsertOutcome, StoreError, StoryStore};
use dailystory_core::story::{NewStory, Story};
use dailystory_core::types::{DbId, StoryDate};

#[derive(Debug, Default)]
struct Inner {
    stories: Vec<Story>,
    next_id: DbId,
}

#[derive(Debug, Default)]
pub struct MemoryStoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored stories.
    pub fn len(&self) -> usize {
        self.lock().map(|inner| inner.stories.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl StoryStore for MemoryStoryStore {
    async fn find_by_date(&self, date: StoryDate) -> Result<Option<Story>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.stories.iter().find(|s| s.date == date).cloned())
    }

    async fn insert(&self, story: NewStory) -> Result<InsertOutcome, StoreError> {
        let mut inner = self.lock()?;
        if inner.stories.iter().any(|s| s.date == story.date) {
            return Ok(InsertOutcome::AlreadyExists);
        }

        inner.next_id += 1;
        let created = Story {
            id: inner.next_id,
            title: story.title,
            content: story.content,
            date: story.date,
            ai_source: story.ai_source,
            created_at: Utc::now(),
        };
        inner.stories.push(created.clone());
        Ok(InsertOutcome::Created(created))
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Story>, StoreError> {
        let inner = self.lock()?;
        let mut stories = inner.stories.clone();
        stories.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(stories
            .into_iter()
            .skip(usize::try_from(offset.max(0)).unwrap_or(usize::MAX))
            .take(usize::try_from(limit.max(0)).unwrap_or(usize::MAX))
            .collect())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.lock().map(|_| ())
    }
}
