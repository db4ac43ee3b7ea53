//! DOM casts that also work on objects from another frame.
//!
//! `dyn_into`/`dyn_ref` test `instanceof` against this window's
//! constructors, so they reject nodes and events that belong to a
//! same-origin iframe. These helpers check the object's shape instead.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, Event, HtmlElement, KeyboardEvent, Node};

const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// `value` as an [`Element`] if it is an element node.
pub fn as_element(value: &JsValue) -> Option<Element> {
    let node_type = js_sys::Reflect::get(value, &JsValue::from_str("nodeType"))
        .ok()?
        .as_f64()?;
    (node_type == f64::from(Node::ELEMENT_NODE)).then(|| value.clone().unchecked_into())
}

/// `element` as an HTML element, if it is in the XHTML namespace.
pub fn as_html(element: &Element) -> Option<&HtmlElement> {
    (element.namespace_uri().as_deref() == Some(XHTML_NS)).then(|| element.unchecked_ref())
}

/// `element` as `T` when it is an HTML element named `tag`.
pub fn with_tag<'a, T: JsCast>(element: &'a Element, tag: &str) -> Option<&'a T> {
    let html = as_html(element)?;
    html.tag_name()
        .eq_ignore_ascii_case(tag)
        .then(|| html.unchecked_ref())
}

/// `event` as a [`KeyboardEvent`] if it carries a key.
pub fn as_keyboard_event(event: &Event) -> Option<KeyboardEvent> {
    js_sys::Reflect::get(event, &JsValue::from_str("key"))
        .ok()?
        .is_string()
        .then(|| event.clone().unchecked_into())
}
