//! InsertionAdapter: reads caret snapshots from surfaces and writes
//! accepted text back, per surface variant.
//!
//! Offsets are UTF-16 code units throughout, matching `selectionStart` and
//! DOM range offsets.

use ghostline_core::{CaretState, HostProfile, SurfaceKind, splice_at_caret, utf16_len};
use web_sys::{Element, HtmlInputElement, HtmlTextAreaElement, Range, Selection};

use crate::cast::with_tag;
use crate::error::DomError;
use crate::events::dispatch_insert_text;
use crate::surface::Surface;

#[derive(Debug, Clone, Default)]
pub struct InsertionAdapter {
    profile: Option<HostProfile>,
}

impl InsertionAdapter {
    pub fn new(profile: Option<HostProfile>) -> Self {
        Self { profile }
    }

    /// Fresh text and caret of `surface`.
    ///
    /// Content-editable and rich-editor offsets are relative to the
    /// container whose text is returned, not to the whole document.
    pub fn read_caret_state(&self, surface: &Surface) -> Option<CaretState> {
        match surface.kind() {
            SurfaceKind::PlainInput => {
                let field = PlainField::of(surface.element())?;
                let value = field.value();
                Some(match field.selection_start() {
                    Some(start) => CaretState::new(value, start as usize),
                    None => CaretState::at_end(value),
                })
            }
            SurfaceKind::ContentEditable => Some(container_caret(surface.element())),
            SurfaceKind::RichEditor => Some(container_caret(&self.line_container(surface))),
        }
    }

    /// Insert `text` at the caret of `surface`.
    ///
    /// A content-editable surface with no live selection is left untouched.
    pub fn insert(&self, surface: &Surface, text: &str) -> Result<(), DomError> {
        match surface.kind() {
            SurfaceKind::PlainInput => {
                let field =
                    PlainField::of(surface.element()).ok_or("plain surface is not a text field")?;
                let value = field.value();
                let caret = field
                    .selection_start()
                    .map(|start| start as usize)
                    .unwrap_or_else(|| utf16_len(&value));
                let (value, caret) = splice_at_caret(&value, caret, text);
                field.set_value(&value);
                field.set_caret(caret as u32);
                Ok(())
            }
            SurfaceKind::ContentEditable => {
                let Some((selection, range)) = live_range(surface.element()) else {
                    tracing::debug!("no live selection, skipping insert");
                    return Ok(());
                };
                let node = surface.owner_document()?.create_text_node(text);
                range.insert_node(&node)?;
                range.set_start_after(&node)?;
                range.set_end_after(&node)?;
                selection.remove_all_ranges()?;
                selection.add_range(&range)?;
                Ok(())
            }
            SurfaceKind::RichEditor => {
                // The host owns its editing pipeline; hand it the text as if
                // it had been typed.
                let container = self.line_container(surface);
                let before = container.text_content().unwrap_or_default();
                let target = surface.element();
                dispatch_insert_text(target, "beforeinput", text)?;
                dispatch_insert_text(target, "input", text)?;
                if container.text_content().unwrap_or_default() == before {
                    tracing::debug!(kind = %surface.kind(), "host ignored insert, patching text");
                    container.set_text_content(Some(&format!("{before}{text}")));
                }
                Ok(())
            }
        }
    }

    /// Nearest line (or editor container) around a rich-editor node.
    fn line_container(&self, surface: &Surface) -> Element {
        let element = surface.element();
        self.profile
            .iter()
            .flat_map(|profile| profile.line_selectors.iter())
            .find_map(|selector| element.closest(selector).ok().flatten())
            .unwrap_or_else(|| element.clone())
    }
}

enum PlainField<'a> {
    Input(&'a HtmlInputElement),
    TextArea(&'a HtmlTextAreaElement),
}

impl<'a> PlainField<'a> {
    fn of(element: &'a Element) -> Option<Self> {
        if let Some(input) = with_tag::<HtmlInputElement>(element, "input") {
            return Some(PlainField::Input(input));
        }
        with_tag::<HtmlTextAreaElement>(element, "textarea").map(PlainField::TextArea)
    }

    fn value(&self) -> String {
        match self {
            PlainField::Input(el) => el.value(),
            PlainField::TextArea(el) => el.value(),
        }
    }

    fn set_value(&self, value: &str) {
        match self {
            PlainField::Input(el) => el.set_value(value),
            PlainField::TextArea(el) => el.set_value(value),
        }
    }

    /// `None` for input types without selection support.
    fn selection_start(&self) -> Option<u32> {
        let start = match self {
            PlainField::Input(el) => el.selection_start(),
            PlainField::TextArea(el) => el.selection_start(),
        };
        start.ok().flatten()
    }

    fn set_caret(&self, caret: u32) {
        let result = match self {
            PlainField::Input(el) => el.set_selection_range(caret, caret),
            PlainField::TextArea(el) => el.set_selection_range(caret, caret),
        };
        if let Err(e) = result {
            tracing::trace!(error = ?e, "field does not support selection");
        }
    }
}

/// Selection of the node's document and its first range, if that range sits
/// inside `container`.
fn live_range(container: &Element) -> Option<(Selection, Range)> {
    let selection = container.owner_document()?.get_selection().ok()??;
    if selection.range_count() == 0 {
        return None;
    }
    let range = selection.get_range_at(0).ok()?;
    let start = range.start_container().ok()?;
    container
        .contains(Some(&start))
        .then_some((selection, range))
}

/// Text of `container` with the caret measured from its start. Without a
/// selection inside it the caret is placed at the end.
fn container_caret(container: &Element) -> CaretState {
    let text = container.text_content().unwrap_or_default();
    match live_range(container).and_then(|(_, range)| offset_within(container, &range)) {
        Some(offset) => CaretState::new(text, offset),
        None => CaretState::at_end(text),
    }
}

fn offset_within(container: &Element, range: &Range) -> Option<usize> {
    let before = range.clone_range();
    before.select_node_contents(container).ok()?;
    before
        .set_end(&range.start_container().ok()?, range.start_offset().ok()?)
        .ok()?;
    Some(utf16_len(&String::from(before.to_string())))
}
