//! DOM event extraction and synthetic event dispatch.

use ghostline_core::KeyPress;
use web_sys::{Element, Event, EventTarget, InputEvent, InputEventInit, KeyboardEvent};

use crate::cast::as_element;
use crate::error::DomError;

/// The parts of a keydown the suggestion machine looks at.
pub fn key_press(event: &KeyboardEvent) -> KeyPress {
    KeyPress::new(event.key(), event.shift_key())
}

/// Event target as an element, if it is one.
pub fn target_element(event: &Event) -> Option<Element> {
    as_element(event.target()?.as_ref())
}

/// Dispatch an `insertText` input event of `event_type` (`beforeinput` or
/// `input`) carrying `text`.
///
/// The event does not bubble, so the frame listeners never see the
/// controller's own insertion as typing. Returns false if a listener
/// cancelled it.
pub fn dispatch_insert_text(
    target: &EventTarget,
    event_type: &str,
    text: &str,
) -> Result<bool, DomError> {
    let init = InputEventInit::new();
    init.set_data(Some(text));
    init.set_input_type("insertText");
    init.set_is_composing(false);
    init.set_bubbles(false);
    init.set_cancelable(event_type == "beforeinput");
    let event = InputEvent::new_with_event_init_dict(event_type, &init)?;
    Ok(target.dispatch_event(&event)?)
}
