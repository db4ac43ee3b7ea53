//! ghostline-core: inline suggestion logic without DOM dependencies.
//!
//! This crate provides:
//! - `classify` over `ElementTraits` - which focused nodes are editable surfaces
//! - `CaretState` and UTF-16 aware splicing
//! - `SuggestionMachine` - the sans-IO debounce/cooldown/request/display lifecycle
//! - caret position arithmetic and overlay styling rules
//! - provider request/response shapes and the `SuggestionProvider`/`SecretStore` seams
//! - settings, toggle messages and configuration

pub mod caret;
pub mod color;
pub mod completion;
pub mod config;
pub mod error;
pub mod host;
pub mod machine;
pub mod measure;
pub mod overlay;
pub mod provider;
pub mod settings;
pub mod surface;

pub use caret::{CaretState, splice_at_caret, utf16_len, utf16_to_byte_index};
pub use completion::{ChatRequest, ChatResponse, parse_completion, validate_provider_key};
pub use config::{Config, OverlayConfig, ProviderConfig, TimingConfig};
pub use error::SuggestError;
pub use host::{HostProfile, HostProfiles};
pub use machine::{
    Effect, KeyPress, Phase, SessionContext, SessionId, SuggestionMachine, SuggestionSession,
    TimerKind, TimerToken, Transition,
};
pub use measure::{CaretPoint, FontSpec, Rect, TextExtent, caret_point};
pub use provider::{SecretStore, SuggestionProvider};
pub use settings::{ExtensionMessage, StoredSettings};
pub use smol_str::SmolStr;
pub use surface::{ElementTraits, StyleTraits, SurfaceKind, classify};
pub use web_time::Instant;
