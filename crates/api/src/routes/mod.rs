pub mod dev;
pub mod health;
pub mod stories;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /stories                                 list (?page, page_size)
/// /stories/latest                          most recent story
/// /stories/today                           get or create today's story
/// /stories/{date}                          story for YYYY-MM-DD
///
/// /dev/trigger-daily-generation            run daily generation (POST, dev only)
/// ```
pub fn api_routes(enable_dev_routes: bool) -> Router<AppState> {
    let routes = Router::new().nest("/stories", stories::router());

    if enable_dev_routes {
        routes.nest("/dev", dev::router())
    } else {
        routes
    }
}
