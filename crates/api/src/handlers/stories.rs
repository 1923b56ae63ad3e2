//! Handlers for the `/stories` resource.

use axum::extract::{Path, Query, State};
use dailystory_core::error::CoreError;
use dailystory_core::story::{parse_story_date, Story};

use crate::error::{AppError, AppResult};
use crate::query::PageParams;
use crate::response::{self, DataJson};
use crate::state::AppState;

/// GET /api/v1/stories?page=&page_size=
///
/// Newest first. `page` is clamped to `>= 1` and `page_size` to `1..=50`.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<DataJson<Vec<Story>>> {
    let stories = state.service.list_page(params.to_request()).await?;
    Ok(response::data(stories))
}

/// GET /api/v1/stories/latest
pub async fn latest(State(state): State<AppState>) -> AppResult<DataJson<Story>> {
    let story = state
        .service
        .latest()
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Story",
            key: "latest".to_string(),
        }))?;
    Ok(response::data(story))
}

/// GET /api/v1/stories/today
///
/// Generates today's story on first request; concurrent callers all receive
/// the same stored story.
pub async fn today(State(state): State<AppState>) -> AppResult<DataJson<Story>> {
    let story = state.service.get_or_create_for_today(&state.shutdown).await?;
    Ok(response::data(story))
}

/// GET /api/v1/stories/{date}
pub async fn get_by_date(
    State(state): State<AppState>,
    Path(raw_date): Path<String>,
) -> AppResult<DataJson<Story>> {
    let date = parse_story_date(&raw_date)?;
    let story = state
        .service
        .get_by_date(date)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Story",
                key: date.to_string(),
            })
        })?;
    Ok(response::data(story))
}
