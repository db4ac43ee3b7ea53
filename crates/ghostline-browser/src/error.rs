use wasm_bindgen::JsValue;

/// Error from a DOM operation (measurement, insertion, overlay, frames).
///
/// These are absorbed and logged by the controller; none of them reach the
/// page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomError(pub String);

impl std::fmt::Display for DomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for DomError {}

impl From<&str> for DomError {
    fn from(s: &str) -> Self {
        DomError(s.to_string())
    }
}

impl From<String> for DomError {
    fn from(s: String) -> Self {
        DomError(s)
    }
}

impl From<JsValue> for DomError {
    fn from(value: JsValue) -> Self {
        DomError(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}
