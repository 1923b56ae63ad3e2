use std::sync::Arc;

use dailystory_pipeline::StoryService;
use tokio_util::sync::CancellationToken;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Story reads and get-or-create of today's story.
    pub service: Arc<StoryService>,
    /// Cancelled when the server begins shutting down; in-flight
    /// generations observe it.
    pub shutdown: CancellationToken,
}
