//! Prompt construction and response parsing for story generation.

use dailystory_core::story::StoryDraft;
use serde_json::{json, Value};

/// JSON shape the model is told to answer with.
const RESPONSE_SCHEMA: &str = r#"{
  "title": "The story's title",
  "content": "The complete text of the story"
}"#;

/// System prompt: role, task, and the strict response format.
pub fn system_prompt() -> String {
    format!(
        "You are a gifted writer of short fiction.\n\
         Your task is to write a gripping short horror story with a complete arc \
         (setup, development, twist, resolution) that leaves a lingering unease.\n\
         You must answer with a single JSON object that follows the structure below \
         exactly. Do not add explanations, code fences, or any other text.\n\
         JSON structure:\n{RESPONSE_SCHEMA}"
    )
}

/// User prompt: today's request, optionally pinned to a theme.
pub fn user_prompt(theme: Option<&str>) -> String {
    let theme_line = match theme.map(str::trim).filter(|t| !t.is_empty()) {
        Some(theme) => format!("Write today's short horror story on the theme: {theme}."),
        None => "Write today's short horror story on a theme of your choosing.".to_string(),
    };
    format!(
        "{theme_line}\n\
         Make sure your answer is one valid JSON object with exactly the 'title' and \
         'content' fields described earlier."
    )
}

/// Chat messages for a single generation call.
pub fn messages(theme: Option<&str>) -> Value {
    json!([
        { "role": "system", "content": system_prompt() },
        { "role": "user", "content": user_prompt(theme) },
    ])
}

/// Why a model answer could not be turned into a draft.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("response is not valid JSON: {0}")]
    NotJson(String),

    #[error("response JSON is not an object")]
    NotAnObject,

    #[error("response JSON has no '{0}' string")]
    MissingField(&'static str),

    #[error("response JSON has a blank '{0}'")]
    BlankField(&'static str),
}

/// Parse the model's text into a draft.
///
/// Tolerates a surrounding Markdown code fence and matches field names
/// case-insensitively. Both fields must be non-blank strings.
pub fn parse_draft(text: &str) -> Result<StoryDraft, ParseError> {
    let body = strip_code_fence(text);
    let value: Value =
        serde_json::from_str(body).map_err(|e| ParseError::NotJson(e.to_string()))?;
    let object = value.as_object().ok_or(ParseError::NotAnObject)?;

    let field = |name: &'static str| -> Result<String, ParseError> {
        let raw = object
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| v.as_str())
            .ok_or(ParseError::MissingField(name))?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ParseError::BlankField(name));
        }
        Ok(trimmed.to_string())
    };

    Ok(StoryDraft {
        title: field("title")?,
        content: field("content")?,
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an info string such as `json` on the opening fence line.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
