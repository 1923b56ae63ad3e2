//! Request handlers.
//!
//! Handlers delegate to the shared [`StoryService`](dailystory_pipeline::StoryService)
//! and map errors via [`AppError`](crate::error::AppError).

pub mod dev;
pub mod stories;
