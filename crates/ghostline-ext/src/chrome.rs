//! Bindings to the extension APIs the content script uses.

use ghostline_browser::DomError;
use ghostline_browser::settings::{CONFIG_KEY, ENABLED_KEY, ENCRYPTED_KEY_KEY};
use ghostline_browser::{ExtensionMessage, StoredSettings};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// `chrome.storage.sync.get(keys)`, promise form.
    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "sync"], js_name = get)]
    async fn storage_sync_get(keys: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onMessage"], js_name = addListener)]
    fn add_message_listener(callback: &Closure<dyn FnMut(JsValue, JsValue, JsValue)>);

    /// Page-provided AES-GCM helper; resolves to the plaintext key.
    #[wasm_bindgen(catch, js_namespace = encryptionUtils, js_name = decryptApiKey)]
    async fn decrypt_api_key_js(encrypted: JsValue) -> Result<JsValue, JsValue>;
}

/// Read every persisted setting in one call.
pub async fn load_settings() -> Result<StoredSettings, DomError> {
    let keys = js_sys::Array::of3(
        &JsValue::from_str(ENABLED_KEY),
        &JsValue::from_str(ENCRYPTED_KEY_KEY),
        &JsValue::from_str(CONFIG_KEY),
    );
    let stored = storage_sync_get(keys.into()).await?;
    serde_wasm_bindgen::from_value(stored).map_err(|e| DomError(e.to_string()))
}

pub async fn decrypt_api_key(encrypted: &[u8]) -> Result<String, DomError> {
    let bytes = serde_wasm_bindgen::to_value(encrypted).map_err(|e| DomError(e.to_string()))?;
    decrypt_api_key_js(bytes)
        .await?
        .as_string()
        .ok_or_else(|| DomError::from("decrypted key is not a string"))
}

/// Call `on_message` for every recognised runtime message, for the lifetime
/// of the page.
pub fn listen_for_messages(mut on_message: impl FnMut(ExtensionMessage) + 'static) {
    let callback = Closure::<dyn FnMut(JsValue, JsValue, JsValue)>::new(
        move |message: JsValue, _sender: JsValue, _respond: JsValue| {
            let parsed = serde_wasm_bindgen::from_value::<serde_json::Value>(message)
                .ok()
                .and_then(|value| ExtensionMessage::from_json(&value));
            match parsed {
                Some(message) => on_message(message),
                None => tracing::trace!("ignoring unrecognised runtime message"),
            }
        },
    );
    add_message_listener(&callback);
    callback.forget();
}
