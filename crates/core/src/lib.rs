//! Domain layer for the daily story service.
//!
//! Holds the types and seams shared by every other crate: the `Story`
//! model, the [`store::StoryStore`] and [`generation::StoryGenerator`]
//! traits, pagination clamps and daily-trigger arithmetic. This crate has
//! no internal dependencies.

pub mod clock;
pub mod error;
pub mod generation;
pub mod pagination;
pub mod scheduling;
pub mod store;
pub mod story;
pub mod types;
