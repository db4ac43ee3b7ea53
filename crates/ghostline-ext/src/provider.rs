//! HTTP chat-completion provider.

use ghostline_browser::{
    ChatRequest, ProviderConfig, SecretStore, SuggestError, SuggestionProvider, parse_completion,
    validate_provider_key,
};

/// Asks an OpenAI-compatible chat-completion endpoint to continue the
/// prompt, authenticating with a key from `K`.
#[derive(Debug, Clone)]
pub struct ChatCompletionProvider<K> {
    client: reqwest::Client,
    config: ProviderConfig,
    secrets: K,
}

impl<K: SecretStore> ChatCompletionProvider<K> {
    pub fn new(config: ProviderConfig, secrets: K) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            secrets,
        }
    }

    fn build_request(&self, key: &str, prompt: &str) -> Result<reqwest::Request, SuggestError> {
        self.client
            .post(&self.config.endpoint)
            .bearer_auth(key)
            .json(&ChatRequest::for_prompt(&self.config, prompt))
            .build()
            .map_err(transport)
    }
}

impl<K: SecretStore> SuggestionProvider for ChatCompletionProvider<K> {
    async fn complete(&self, prompt: &str) -> Result<String, SuggestError> {
        let key = self.secrets.provider_key().await?;
        let key = validate_provider_key(&key)?;
        let request = self.build_request(key, prompt)?;

        let response = self.client.execute(request).await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "completion request rejected");
            return Err(SuggestError::Status {
                status: status.as_u16(),
                body,
            });
        }
        parse_completion(&body)
    }
}

fn transport(e: reqwest::Error) -> SuggestError {
    SuggestError::Transport(e.to_string())
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    struct FixedKey(Result<String, SuggestError>);

    impl SecretStore for FixedKey {
        async fn provider_key(&self) -> Result<String, SuggestError> {
            self.0.clone()
        }
    }

    fn provider(key: Result<String, SuggestError>) -> ChatCompletionProvider<FixedKey> {
        ChatCompletionProvider::new(ProviderConfig::default(), FixedKey(key))
    }

    #[test]
    fn request_carries_bearer_key_and_prompt() {
        let provider = provider(Ok("gsk_test".into()));
        let request = provider.build_request("gsk_test", "Dear team").unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(
            request.url().as_str(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert_eq!(
            request.headers()["authorization"].to_str().unwrap(),
            "Bearer gsk_test"
        );
        let body: serde_json::Value =
            serde_json::from_slice(request.body().unwrap().as_bytes().unwrap()).unwrap();
        assert_eq!(
            body["messages"][1]["content"],
            "Complete this text naturally: \"Dear team\""
        );
        assert_eq!(body["max_tokens"], 20);
    }

    #[tokio::test]
    async fn missing_key_fails_before_network() {
        let provider = provider(Err(SuggestError::MissingKey));
        assert_eq!(
            provider.complete("Hello").await,
            Err(SuggestError::MissingKey)
        );
    }

    #[tokio::test]
    async fn malformed_key_is_rejected() {
        let provider = provider(Ok("sk-not-groq".into()));
        let err = provider.complete("Hello").await.unwrap_err();
        assert_eq!(err, SuggestError::InvalidKey);
        assert!(err.is_provider_unavailable());
    }
}
