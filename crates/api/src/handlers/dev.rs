//! Development-only handlers, mounted when `ENABLE_DEV_ROUTES=true`.

use axum::extract::State;
use dailystory_core::story::Story;

use crate::error::AppResult;
use crate::response::{self, DataJson};
use crate::state::AppState;

/// POST /api/v1/dev/trigger-daily-generation
///
/// Runs the same get-or-create the daily scheduler runs.
pub async fn trigger_daily_generation(
    State(state): State<AppState>,
) -> AppResult<DataJson<Story>> {
    tracing::info!("Manual daily generation triggered");
    let today = state
        .service
        .get_or_create_for_today_with_origin(&state.shutdown)
        .await?;
    tracing::info!(
        story_id = today.story.id,
        origin = ?today.origin,
        "Manual daily generation finished",
    );
    Ok(response::data(today.story))
}
