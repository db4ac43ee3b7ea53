//! Boundaries to the completion provider and the credential store.
//!
//! Both run on the single browser event loop, so the futures are not `Send`.

use crate::error::SuggestError;

/// Source of completion text.
#[allow(async_fn_in_trait)]
pub trait SuggestionProvider {
    /// Continue `prompt`, which is exactly the text preceding the caret.
    ///
    /// Returns trimmed, non-empty text or an error; callers treat every error
    /// the same way (no suggestion).
    async fn complete(&self, prompt: &str) -> Result<String, SuggestError>;
}

/// Access to the decrypted provider credential.
#[allow(async_fn_in_trait)]
pub trait SecretStore {
    async fn provider_key(&self) -> Result<String, SuggestError>;
}
