//! Chat-completion request and response shapes.
//!
//! The transport lives in the extension crate; building the body and
//! interpreting the reply are kept here so they can be tested natively.

use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;
use crate::error::SuggestError;

/// Prefix every valid provider key starts with.
pub const PROVIDER_KEY_PREFIX: &str = "gsk_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Body of a chat-completion POST.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub stop: Vec<String>,
}

impl ChatRequest {
    /// Build the request asking for a continuation of `prompt`.
    pub fn for_prompt(config: &ProviderConfig, prompt: &str) -> Self {
        Self {
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: config.system_prompt.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!("Complete this text naturally: \"{prompt}\""),
                },
            ],
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
            stop: config.stop.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

impl ChatResponse {
    /// The trimmed completion text.
    pub fn into_completion(self) -> Result<String, SuggestError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SuggestError::Malformed("response has no choices".into()))?;
        let text = choice.message.content.trim();
        if text.is_empty() {
            return Err(SuggestError::Empty);
        }
        Ok(text.to_string())
    }
}

/// Parse a raw response body into completion text.
pub fn parse_completion(body: &str) -> Result<String, SuggestError> {
    serde_json::from_str::<ChatResponse>(body)?.into_completion()
}

/// Check a decrypted key before it is sent anywhere.
pub fn validate_provider_key(key: &str) -> Result<&str, SuggestError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(SuggestError::MissingKey);
    }
    if !key.starts_with(PROVIDER_KEY_PREFIX) {
        return Err(SuggestError::InvalidKey);
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let request = ChatRequest::for_prompt(&ProviderConfig::default(), "The quick brown");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama-3.3-70b-versatile");
        assert_eq!(json["max_tokens"], 20);
        assert_eq!(json["messages"][0]["role"], "system");
        insta::assert_snapshot!(
            json["messages"][1]["content"].as_str().unwrap(),
            @r#"Complete this text naturally: "The quick brown""#
        );
        assert_eq!(json["stop"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn completion_is_trimmed() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"  fox jumps \n"}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "fox jumps");
    }

    #[test]
    fn blank_completion_is_empty() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"   "}}]}"#;
        assert_eq!(parse_completion(body), Err(SuggestError::Empty));
    }

    #[test]
    fn malformed_bodies() {
        assert!(matches!(
            parse_completion(r#"{"choices":[]}"#),
            Err(SuggestError::Malformed(_))
        ));
        assert!(matches!(
            parse_completion("<html>bad gateway</html>"),
            Err(SuggestError::Malformed(_))
        ));
    }

    #[test]
    fn key_validation() {
        assert_eq!(validate_provider_key(" gsk_abc "), Ok("gsk_abc"));
        assert_eq!(validate_provider_key("sk-abc"), Err(SuggestError::InvalidKey));
        assert_eq!(validate_provider_key("  "), Err(SuggestError::MissingKey));
    }
}
