use std::time::Duration;

/// Default provider endpoint (OpenAI-compatible).
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default model identifier on OpenRouter.
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-pro-preview";

/// Provider connection and sampling settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Sent as `HTTP-Referer` for provider attribution.
    pub site_url: Option<String>,
    /// Sent as `X-Title` for provider attribution.
    pub app_name: Option<String>,
    pub request_timeout: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum LlmConfigError {
    #[error("OPENROUTER_API_KEY is not set")]
    MissingApiKey,

    #[error("LLM base URL is not set")]
    MissingBaseUrl,

    #[error("LLM model is not specified")]
    MissingModel,

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl LlmConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                        |
    /// |----------------------------|--------------------------------|
    /// | `OPENROUTER_API_KEY`       | (empty, rejected by the client)|
    /// | `LLM_BASE_URL`             | `https://openrouter.ai/api/v1` |
    /// | `LLM_MODEL`                | `google/gemini-2.5-pro-preview`|
    /// | `LLM_MAX_TOKENS`           | `3000`                         |
    /// | `LLM_TEMPERATURE`          | `1.0`                          |
    /// | `LLM_SITE_URL`             | unset                          |
    /// | `LLM_APP_NAME`             | unset                          |
    /// | `LLM_REQUEST_TIMEOUT_SECS` | `120`                          |
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENROUTER_API_KEY").unwrap_or_default();

        let base_url = std::env::var("LLM_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        let max_tokens: u32 = std::env::var("LLM_MAX_TOKENS")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("LLM_MAX_TOKENS must be a valid u32");

        let temperature: f32 = std::env::var("LLM_TEMPERATURE")
            .unwrap_or_else(|_| "1.0".into())
            .parse()
            .expect("LLM_TEMPERATURE must be a number");

        let request_timeout_secs: u64 = std::env::var("LLM_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("LLM_REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            api_key,
            base_url,
            model,
            max_tokens,
            temperature,
            site_url: non_empty_var("LLM_SITE_URL"),
            app_name: non_empty_var("LLM_APP_NAME"),
            request_timeout: Duration::from_secs(request_timeout_secs),
        }
    }

    /// Reject configurations the client cannot work with.
    pub fn validate(&self) -> Result<(), LlmConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(LlmConfigError::MissingApiKey);
        }
        if self.base_url.trim().is_empty() {
            return Err(LlmConfigError::MissingBaseUrl);
        }
        if self.model.trim().is_empty() {
            return Err(LlmConfigError::MissingModel);
        }
        Ok(())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn valid_config() -> LlmConfig {
        LlmConfig {
            api_key: "sk-test".into(),
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            max_tokens: 3000,
            temperature: 1.0,
            site_url: None,
            app_name: None,
            request_timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn blank_api_key_rejected() {
        let config = LlmConfig {
            api_key: "  ".into(),
            ..valid_config()
        };
        assert_matches!(config.validate(), Err(LlmConfigError::MissingApiKey));
    }

    #[test]
    fn blank_base_url_rejected() {
        let config = LlmConfig {
            base_url: String::new(),
            ..valid_config()
        };
        assert_matches!(config.validate(), Err(LlmConfigError::MissingBaseUrl));
    }

    #[test]
    fn blank_model_rejected() {
        let config = LlmConfig {
            model: String::new(),
            ..valid_config()
        };
        assert_matches!(config.validate(), Err(LlmConfigError::MissingModel));
    }
}
