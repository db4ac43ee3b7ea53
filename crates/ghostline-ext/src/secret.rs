use ghostline_browser::{SecretStore, SuggestError, validate_provider_key};

use crate::chrome;

/// Provider key stored encrypted in sync storage, decrypted by the page's
/// `encryptionUtils` helper on every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoredKeySecretStore;

impl SecretStore for StoredKeySecretStore {
    async fn provider_key(&self) -> Result<String, SuggestError> {
        let settings = chrome::load_settings()
            .await
            .map_err(|e| SuggestError::Secret(e.to_string()))?;
        let encrypted = settings
            .encrypted_key
            .filter(|bytes| !bytes.is_empty())
            .ok_or(SuggestError::MissingKey)?;
        let key = chrome::decrypt_api_key(&encrypted)
            .await
            .map_err(|e| SuggestError::Secret(e.to_string()))?;
        validate_provider_key(&key).map(str::to_string)
    }
}
