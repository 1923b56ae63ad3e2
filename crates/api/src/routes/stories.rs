use axum::routing::get;
use axum::Router;

use crate::handlers::stories;
use crate::state::AppState;

/// Routes mounted at `/stories`.
///
/// ```text
/// GET    /                -> list
/// GET    /latest          -> latest
/// GET    /today           -> today
/// GET    /{date}          -> get_by_date
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(stories::list))
        .route("/latest", get(stories::latest))
        .route("/today", get(stories::today))
        .route("/{date}", get(stories::get_by_date))
}
