//! Persistence seam for stories.
//!
//! Implementations must enforce uniqueness of [`Story::date`] at the storage
//! level. A date collision on insert is reported as
//! [`InsertOutcome::AlreadyExists`], not as an error: concurrent creators
//! are expected and the caller resolves the race by re-reading.

use async_trait::async_trait;

use crate::story::{NewStory, Story};
use crate::types::StoryDate;

/// Result of an insert attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The row was written; carries the store-assigned id and timestamp.
    Created(Story),
    /// Another story already holds this date.
    AlreadyExists,
}

/// Store failures other than a date collision.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Story store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait StoryStore: Send + Sync {
    /// Look up the story for a date.
    async fn find_by_date(&self, date: StoryDate) -> Result<Option<Story>, StoreError>;

    /// Insert a story, reporting a date collision as [`InsertOutcome::AlreadyExists`].
    async fn insert(&self, story: NewStory) -> Result<InsertOutcome, StoreError>;

    /// List stories ordered by date, newest first.
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Story>, StoreError>;

    /// Cheap reachability probe used by the health endpoint.
    async fn health_check(&self) -> Result<(), StoreError>;
}
