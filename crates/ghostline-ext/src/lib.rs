//! Content-script entry point for ghostline.
//!
//! Loads persisted settings, builds the controller with the HTTP completion
//! provider, registers every frame, and listens for the popup's toggle.

mod chrome;
mod provider;
mod secret;

pub use provider::ChatCompletionProvider;
pub use secret::StoredKeySecretStore;

use ghostline_browser::{Config, Controller, DomError, ExtensionMessage, HostProfiles, StoredSettings};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    init_tracing();

    wasm_bindgen_futures::spawn_local(async {
        if let Err(e) = run().await {
            tracing::error!(error = %e, "ghostline failed to start");
        }
    });
}

fn init_tracing() {
    use tracing::Level;
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    let reg = Registry::default().with(wasm_layer);

    let _ = set_global_default(reg);
}

async fn run() -> Result<(), DomError> {
    let settings = match chrome::load_settings().await {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(error = %e, "could not read settings, using defaults");
            StoredSettings::default()
        }
    };
    let config = settings
        .config
        .as_ref()
        .map(Config::from_json_or_default)
        .unwrap_or_default();

    let hostname = web_sys::window()
        .ok_or("no window")?
        .location()
        .hostname()?;
    let provider = ChatCompletionProvider::new(config.provider.clone(), StoredKeySecretStore);
    let controller = Controller::new(&config, &HostProfiles::builtin(), &hostname, provider);
    controller.install()?;
    controller.set_enabled(settings.enabled);
    tracing::info!(enabled = settings.enabled, host = %hostname, "ghostline initialised");

    chrome::listen_for_messages(move |message| match message {
        ExtensionMessage::ToggleAutocomplete { enabled } => controller.set_enabled(enabled),
    });
    Ok(())
}
