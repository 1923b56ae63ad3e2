//! OpenAI-compatible chat-completions client used to write the daily story.
//!
//! [`OpenRouterClient`] implements
//! [`StoryGenerator`](dailystory_core::generation::StoryGenerator). It
//! performs exactly one provider call per `generate`; retries belong to the
//! caller.

pub mod client;
pub mod config;
pub mod prompt;

pub use client::OpenRouterClient;
pub use config::{LlmConfig, LlmConfigError};
