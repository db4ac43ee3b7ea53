//! Runtime configuration.
//!
//! Every field has a default, so a partial `ghostlineConfig` object in
//! storage only overrides what it names.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub timing: TimingConfig,
    pub provider: ProviderConfig,
    pub overlay: OverlayConfig,
}

impl Config {
    /// Parse a config object, falling back to defaults when it is malformed.
    pub fn from_json_or_default(value: &serde_json::Value) -> Self {
        match serde_json::from_value(value.clone()) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed config, using defaults");
                Self::default()
            }
        }
    }
}

/// Timer lengths and the context gate for the suggestion machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimingConfig {
    /// Quiet period after the last `input` event before evaluating.
    pub debounce_ms: u64,
    /// How long after an evaluation the user still counts as typing.
    pub typing_idle_ms: u64,
    /// Minimum spacing between a display/dismissal and the next request.
    pub cooldown_ms: u64,
    /// Trimmed characters required before the caret.
    pub min_context_chars: usize,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            typing_idle_ms: 1000,
            cooldown_ms: 4000,
            min_context_chars: 3,
        }
    }
}

impl TimingConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn typing_idle(&self) -> Duration {
        Duration::from_millis(self.typing_idle_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Chat-completion endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderConfig {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub stop: Vec<String>,
    pub system_prompt: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            max_tokens: 20,
            temperature: 0.3,
            top_p: 1.0,
            stop: ["\n", ".", "!", "?"].iter().map(|s| s.to_string()).collect(),
            system_prompt: "You are an autocomplete assistant. Complete the user's text \
                            naturally and briefly. Only provide the completion, no other text."
                .to_string(),
        }
    }
}

/// Visual settings for the ghost overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayConfig {
    pub opacity: f32,
    pub z_index: i32,
    pub class_name: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            opacity: 0.7,
            z_index: 999_999,
            class_name: "ghostline-suggestion".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let value = serde_json::json!({ "timing": { "cooldownMs": 2500 } });
        let config = Config::from_json_or_default(&value);
        assert_eq!(config.timing.cooldown_ms, 2500);
        assert_eq!(config.timing.debounce_ms, 300);
        assert_eq!(config.provider.max_tokens, 20);
        assert_eq!(config.overlay.opacity, 0.7);
    }

    #[test]
    fn malformed_config_falls_back() {
        let value = serde_json::json!({ "timing": { "debounceMs": "soon" } });
        assert_eq!(Config::from_json_or_default(&value), Config::default());
    }

    #[test]
    fn default_stop_sequences() {
        let provider = ProviderConfig::default();
        assert_eq!(provider.stop, vec!["\n", ".", "!", "?"]);
    }
}
