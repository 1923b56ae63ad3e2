use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dailystory_core::error::CoreError;
use dailystory_pipeline::StoryError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`StoryError`].
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `dailystory_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failure from the story service.
    #[error(transparent)]
    Story(#[from] StoryError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, key } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} '{key}' not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
                }
            },

            // --- Story service errors ---
            AppError::Story(story) => classify_story_error(story),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map a story service failure to an HTTP status, error code, and message.
///
/// Provider and database details are logged, never returned.
fn classify_story_error(err: &StoryError) -> (StatusCode, &'static str, String) {
    match err {
        StoryError::GenerationExhausted { attempts, last } => {
            tracing::error!(attempts, error = %last, "Story generation exhausted");
            (
                StatusCode::BAD_GATEWAY,
                "GENERATION_FAILED",
                format!("Story generation failed after {attempts} attempts"),
            )
        }
        StoryError::Cancelled => (
            StatusCode::SERVICE_UNAVAILABLE,
            "CANCELLED",
            "Story request was cancelled".to_string(),
        ),
        StoryError::Persistence(e) => {
            tracing::error!(error = %e, "Story store error");
            internal()
        }
        StoryError::InconsistentState { date } => {
            tracing::error!(%date, "Story store is in an inconsistent state");
            internal()
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
