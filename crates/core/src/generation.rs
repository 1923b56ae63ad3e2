//! Text-generation seam.
//!
//! A [`StoryGenerator`] produces one [`StoryDraft`] per call or fails with a
//! [`GenerationError`]. Every variant is considered transient by the retry
//! layer; the generator is responsible for turning provider-specific
//! failures (transport, status codes, unparseable bodies) into this type.

use async_trait::async_trait;

use crate::story::StoryDraft;

/// Optional overrides for a single generation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Steer the story towards a theme instead of letting the model pick.
    pub theme: Option<String>,
    /// Use this model instead of the configured default.
    pub model: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Transport-level failure (network, DNS, TLS, timeout).
    #[error("Generation request failed: {0}")]
    Request(String),

    /// The provider answered with a non-2xx status.
    #[error("Generation provider error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The provider answered but produced no text.
    #[error("Generation provider returned no content")]
    EmptyResponse,

    /// The text could not be turned into a usable draft.
    #[error("Generation provider returned an invalid story: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait StoryGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<StoryDraft, GenerationError>;
}
