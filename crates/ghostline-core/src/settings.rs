//! Wire types for persisted settings and the toggle channel.

use serde::{Deserialize, Serialize};

/// Sync-storage key for the enabled flag.
pub const ENABLED_KEY: &str = "autocompleteEnabled";
/// Sync-storage key for the encrypted provider key bytes.
pub const ENCRYPTED_KEY_KEY: &str = "encryptedGroqKey";
/// Sync-storage key for an optional [`crate::Config`] override.
pub const CONFIG_KEY: &str = "ghostlineConfig";

/// The subset of persisted settings read at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredSettings {
    #[serde(rename = "autocompleteEnabled", default)]
    pub enabled: bool,
    #[serde(rename = "encryptedGroqKey", default, skip_serializing_if = "Option::is_none")]
    pub encrypted_key: Option<Vec<u8>>,
    #[serde(rename = "ghostlineConfig", default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

/// Messages arriving on the runtime message channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum ExtensionMessage {
    #[serde(rename = "toggleAutocomplete")]
    ToggleAutocomplete { enabled: bool },
}

impl ExtensionMessage {
    /// Parse a runtime message; anything unrecognised is `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn enabled_defaults_to_false() {
        let settings: StoredSettings = serde_json::from_value(json!({})).unwrap();
        assert!(!settings.enabled);
        assert!(settings.encrypted_key.is_none());
    }

    #[test]
    fn reads_stored_values() {
        let settings: StoredSettings = serde_json::from_value(json!({
            "autocompleteEnabled": true,
            "encryptedGroqKey": [1, 2, 3],
        }))
        .unwrap();
        assert!(settings.enabled);
        assert_eq!(settings.encrypted_key.as_deref(), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn toggle_message() {
        let msg = ExtensionMessage::from_json(&json!({
            "action": "toggleAutocomplete",
            "enabled": false,
        }));
        assert_eq!(
            msg,
            Some(ExtensionMessage::ToggleAutocomplete { enabled: false })
        );
    }

    #[test]
    fn unknown_messages_are_ignored() {
        assert_eq!(ExtensionMessage::from_json(&json!({ "action": "ping" })), None);
        assert_eq!(ExtensionMessage::from_json(&json!("hello")), None);
    }
}
