//! Browser DOM layer for ghostline inline suggestions.
//!
//! This crate drives `ghostline-core`'s suggestion machine against a live
//! page. It assumes a `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `cast`: DOM casts that hold for nodes from other frames
//! - `classify`: SurfaceClassifier, reads element traits for classification
//! - `insertion`: InsertionAdapter, caret snapshots and text insertion
//! - `position`: PositionEngine, canvas-measured caret coordinates
//! - `overlay`: OverlayRenderer, the ghost-text element
//! - `frames`: FrameRegistry, listeners and observers for every frame
//! - `controller`: runs the machine and applies its effects
//!
//! # Re-exports
//!
//! This crate re-exports `ghostline-core` for convenience, so consumers
//! only need to depend on `ghostline-browser`.

// Re-export core crate
pub use ghostline_core;
pub use ghostline_core::*;

pub mod cast;
pub mod classify;
pub mod controller;
pub mod error;
pub mod events;
pub mod frames;
pub mod insertion;
pub mod overlay;
pub mod position;
pub mod surface;

pub use classify::SurfaceClassifier;
pub use controller::Controller;
pub use error::DomError;
pub use frames::{FrameEvent, FrameEventHandler, FrameRegistry};
pub use insertion::InsertionAdapter;
pub use overlay::OverlayRenderer;
pub use position::{PositionEngine, font_of};
pub use surface::Surface;
