//! Error types for suggestion requests.
//!
//! Everything here is absorbed below the toggle boundary: a failed request
//! means "no suggestion this time", never a user-facing error.

use miette::Diagnostic;

/// Failure of a single suggestion request, from credential lookup to
/// response parsing.
#[derive(thiserror::Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum SuggestError {
    /// No provider key has been stored yet.
    #[error("no provider key stored")]
    #[diagnostic(
        code(ghostline::provider::missing_key),
        help("add an API key in the extension settings")
    )]
    MissingKey,

    /// A key was decrypted but does not look like a provider key.
    #[error("stored provider key has an invalid format")]
    #[diagnostic(code(ghostline::provider::invalid_key))]
    InvalidKey,

    /// The secret store failed to decrypt or read the key.
    #[error("secret store error: {0}")]
    #[diagnostic(code(ghostline::provider::secret))]
    Secret(String),

    /// Network or fetch failure.
    #[error("transport error: {0}")]
    #[diagnostic(code(ghostline::provider::transport))]
    Transport(String),

    /// Provider answered with a non-success status.
    #[error("provider returned status {status}: {body}")]
    #[diagnostic(code(ghostline::provider::status))]
    Status { status: u16, body: String },

    /// Response body did not have the expected shape.
    #[error("malformed provider response: {0}")]
    #[diagnostic(code(ghostline::provider::malformed))]
    Malformed(String),

    /// Provider answered, but with nothing to show.
    #[error("provider returned an empty completion")]
    #[diagnostic(code(ghostline::provider::empty))]
    Empty,
}

impl SuggestError {
    /// Whether this failure comes from the credential rather than the request.
    pub fn is_provider_unavailable(&self) -> bool {
        matches!(
            self,
            SuggestError::MissingKey | SuggestError::InvalidKey | SuggestError::Secret(_)
        )
    }
}

impl From<serde_json::Error> for SuggestError {
    fn from(err: serde_json::Error) -> Self {
        SuggestError::Malformed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_errors_are_provider_unavailable() {
        assert!(SuggestError::MissingKey.is_provider_unavailable());
        assert!(SuggestError::InvalidKey.is_provider_unavailable());
        assert!(SuggestError::Secret("bad tag".into()).is_provider_unavailable());
        assert!(!SuggestError::Transport("offline".into()).is_provider_unavailable());
        assert!(!SuggestError::Empty.is_provider_unavailable());
    }

    #[test]
    fn status_error_display() {
        let err = SuggestError::Status {
            status: 429,
            body: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "provider returned status 429: rate limited");
    }
}
