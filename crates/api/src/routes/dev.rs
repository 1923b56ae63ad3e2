use axum::routing::post;
use axum::Router;

use crate::handlers::dev;
use crate::state::AppState;

/// Routes mounted at `/dev`.
///
/// ```text
/// POST   /trigger-daily-generation    -> trigger_daily_generation
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/trigger-daily-generation",
        post(dev::trigger_daily_generation),
    )
}
