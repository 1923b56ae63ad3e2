//! HTTP client for an OpenAI-compatible chat-completions endpoint.
//!
//! Sends a single `POST {base_url}/chat/completions` per generation and
//! converts every failure (transport, status code, empty or malformed
//! answer) into a [`GenerationError`].

use async_trait::async_trait;
use dailystory_core::generation::{GenerationError, GenerationRequest, StoryGenerator};
use dailystory_core::story::StoryDraft;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::{LlmConfig, LlmConfigError};
use crate::prompt;

/// Story generator backed by OpenRouter (or any OpenAI-compatible API).
#[derive(Debug)]
pub struct OpenRouterClient {
    client: reqwest::Client,
    config: LlmConfig,
}

/// Subset of the chat-completions response we read.
#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenRouterClient {
    /// Build a client, rejecting blank credentials or endpoints.
    pub fn new(config: LlmConfig) -> Result<Self, LlmConfigError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        tracing::info!(base_url = %config.base_url, model = %config.model, "LLM client initialized");
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Request body for one completion.
    fn request_body(&self, model: &str, theme: Option<&str>) -> Value {
        json!({
            "model": model,
            "messages": prompt::messages(theme),
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "response_format": { "type": "json_object" },
        })
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, otherwise capture the
    /// status and body text.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GenerationError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

fn request_error(err: reqwest::Error) -> GenerationError {
    GenerationError::Request(err.to_string())
}

/// Decode a chat-completions body.
fn parse_completion(body: &str) -> Result<ChatCompletion, GenerationError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::warn!(error = %e, "Completion body is not valid JSON");
        GenerationError::InvalidResponse(format!("malformed completion body: {e}"))
    })
}

/// Pull the first choice's text out of a completion and parse it.
fn draft_from_completion(completion: ChatCompletion) -> Result<StoryDraft, GenerationError> {
    let text = completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(GenerationError::EmptyResponse)?;

    prompt::parse_draft(&text).map_err(|e| {
        tracing::warn!(error = %e, raw_response = %text, "Cannot parse model response");
        GenerationError::InvalidResponse(e.to_string())
    })
}

#[async_trait]
impl StoryGenerator for OpenRouterClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<StoryDraft, GenerationError> {
        let model = request
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.config.model);

        tracing::info!(model, theme = ?request.theme, "Requesting story from provider");

        let mut builder = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&self.request_body(model, request.theme.as_deref()));
        if let Some(site_url) = &self.config.site_url {
            builder = builder.header("HTTP-Referer", site_url);
        }
        if let Some(app_name) = &self.config.app_name {
            builder = builder.header("X-Title", app_name);
        }

        let response = builder.send().await.map_err(request_error)?;
        let response = Self::ensure_success(response).await?;
        let body = response.text().await.map_err(request_error)?;
        let completion = parse_completion(&body)?;

        let draft = draft_from_completion(completion)?;
        tracing::info!(model, title = %draft.title, "Story generated");
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;

    use super::*;
    use crate::config::{DEFAULT_BASE_URL, DEFAULT_MODEL};

    fn config() -> LlmConfig {
        LlmConfig {
            api_key: "sk-test".into(),
            base_url: format!("{DEFAULT_BASE_URL}/"),
            model: DEFAULT_MODEL.into(),
            max_tokens: 1200,
            temperature: 0.7,
            site_url: None,
            app_name: None,
            request_timeout: Duration::from_secs(5),
        }
    }

    fn completion(body: Value) -> ChatCompletion {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn new_rejects_missing_key() {
        let result = OpenRouterClient::new(LlmConfig {
            api_key: String::new(),
            ..config()
        });
        assert_matches!(result, Err(LlmConfigError::MissingApiKey));
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = OpenRouterClient::new(config()).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn request_body_carries_sampling_and_json_mode() {
        let client = OpenRouterClient::new(config()).unwrap();
        let body = client.request_body("some/model", Some("fog"));
        assert_eq!(body["model"], "some/model");
        assert_eq!(body["max_tokens"], 1200);
        assert_eq!(body["response_format"]["type"], "json_object");
        assert!(body["messages"][1]["content"].as_str().unwrap().contains("fog"));
    }

    #[test]
    fn completion_with_story_parses() {
        let draft = draft_from_completion(completion(json!({
            "choices": [{ "message": { "content": "{\"title\":\"T\",\"content\":\"C\"}" } }]
        })))
        .unwrap();
        assert_eq!(draft.title, "T");
        assert_eq!(draft.content, "C");
    }

    #[test]
    fn completion_without_choices_is_empty() {
        assert_matches!(
            draft_from_completion(completion(json!({ "choices": [] }))),
            Err(GenerationError::EmptyResponse)
        );
        assert_matches!(
            draft_from_completion(completion(json!({}))),
            Err(GenerationError::EmptyResponse)
        );
    }

    #[test]
    fn completion_with_null_content_is_empty() {
        assert_matches!(
            draft_from_completion(completion(json!({
                "choices": [{ "message": { "content": null } }]
            }))),
            Err(GenerationError::EmptyResponse)
        );
    }

    #[test]
    fn completion_with_prose_is_invalid() {
        assert_matches!(
            draft_from_completion(completion(json!({
                "choices": [{ "message": { "content": "Sorry, I can't do that." } }]
            }))),
            Err(GenerationError::InvalidResponse(_))
        );
    }

    #[test]
    fn non_json_completion_body_is_invalid() {
        assert_matches!(
            parse_completion("<html>Bad Gateway</html>"),
            Err(GenerationError::InvalidResponse(msg)) if msg.starts_with("malformed completion body")
        );
        assert_matches!(parse_completion(r#"{"choices": []}"#), Ok(c) if c.choices.is_empty());
    }

    #[tokio::test]
    async fn unreachable_provider_is_request_error() {
        let client = OpenRouterClient::new(LlmConfig {
            base_url: "http://127.0.0.1:1".into(),
            request_timeout: Duration::from_secs(2),
            ..config()
        })
        .unwrap();
        let result = client.generate(&GenerationRequest::default()).await;
        assert_matches!(result, Err(GenerationError::Request(_)));
    }
}
