//! Story row model.

use dailystory_core::story::Story;
use dailystory_core::types::{DbId, StoryDate, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `stories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoryRow {
    pub id: DbId,
    pub title: String,
    pub content: String,
    pub date: StoryDate,
    pub ai_source: Option<String>,
    pub created_at: Timestamp,
}

impl From<StoryRow> for Story {
    fn from(row: StoryRow) -> Self {
        Story {
            id: row.id,
            title: row.title,
            content: row.content,
            date: row.date,
            ai_source: row.ai_source,
            created_at: row.created_at,
        }
    }
}
