//! The daily story model.
//!
//! A [`Story`] is created at most once per UTC calendar date and never
//! modified afterwards. Generation produces a [`StoryDraft`]; the
//! orchestrator turns a validated draft into a [`NewStory`] for the store.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, StoryDate, Timestamp};

/// Wire and storage format of a story date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A persisted story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub id: DbId,
    pub title: String,
    pub content: String,
    pub date: StoryDate,
    /// Provider tag that produced the story (e.g. `OpenRouter`).
    pub ai_source: Option<String>,
    pub created_at: Timestamp,
}

/// A story ready to be inserted. `id` and `created_at` are store-assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStory {
    pub title: String,
    pub content: String,
    pub date: StoryDate,
    pub ai_source: Option<String>,
}

impl NewStory {
    /// Build an insertable story from a generated draft.
    pub fn from_draft(draft: StoryDraft, date: StoryDate, source: &str) -> Self {
        Self {
            title: draft.title,
            content: draft.content,
            date,
            ai_source: Some(source.to_string()),
        }
    }
}

/// Output of a single generation call, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoryDraft {
    pub title: String,
    pub content: String,
}

impl StoryDraft {
    /// Both fields must contain something other than whitespace.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::Validation("Story title is empty".to_string()));
        }
        if self.content.trim().is_empty() {
            return Err(CoreError::Validation("Story content is empty".to_string()));
        }
        Ok(())
    }
}

/// Parse a `YYYY-MM-DD` path segment into a story date.
pub fn parse_story_date(raw: &str) -> Result<StoryDate, CoreError> {
    StoryDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        CoreError::Validation(format!("Invalid date '{raw}'. Use YYYY-MM-DD"))
    })
}
