//! Handle to the editable node the system is currently tracking.

use ghostline_core::SurfaceKind;
use web_sys::{CssStyleDeclaration, Document, Element};

use crate::error::DomError;

/// Non-owning reference to one editable DOM node plus its variant.
///
/// The page owns the node; [`Surface::is_attached`] tells whether it is
/// still part of a live document.
#[derive(Debug, Clone)]
pub struct Surface {
    element: Element,
    kind: SurfaceKind,
}

impl Surface {
    pub fn new(element: Element, kind: SurfaceKind) -> Self {
        Self { element, kind }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    /// Connected to a document that still has a window.
    ///
    /// A node inside a removed iframe stays connected to the orphaned
    /// frame document, whose `defaultView` is gone.
    pub fn is_attached(&self) -> bool {
        self.element.is_connected()
            && self
                .element
                .owner_document()
                .and_then(|document| document.default_view())
                .is_some()
    }

    /// Document the node lives in, which may be an iframe's.
    pub fn owner_document(&self) -> Result<Document, DomError> {
        self.element
            .owner_document()
            .ok_or_else(|| DomError::from("surface has no owner document"))
    }

    /// Computed style of the node, resolved in its own frame.
    pub fn computed_style(&self) -> Result<CssStyleDeclaration, DomError> {
        computed_style(&self.element)
    }
}

impl PartialEq for Surface {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.element.is_same_node(Some(other.element.as_ref()))
    }
}

/// Computed style of `element` using the window of its owner document.
pub fn computed_style(element: &Element) -> Result<CssStyleDeclaration, DomError> {
    let view = element
        .owner_document()
        .and_then(|doc| doc.default_view())
        .or_else(web_sys::window)
        .ok_or("no window for element")?;
    view.get_computed_style(element)?
        .ok_or_else(|| DomError::from("computed style unavailable"))
}
