//! OverlayRenderer: the ghost-text element.
//!
//! At most one overlay exists at a time; [`OverlayRenderer::show`] always
//! removes the previous one first.

use ghostline_core::overlay::{COPIED_PROPERTIES, css_px, overlay_background};
use ghostline_core::{CaretPoint, OverlayConfig};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};

use crate::error::DomError;
use crate::surface::Surface;

#[derive(Debug)]
struct Overlay {
    element: HtmlElement,
    surface: Surface,
}

#[derive(Debug, Default)]
pub struct OverlayRenderer {
    config: OverlayConfig,
    current: Option<Overlay>,
}

impl OverlayRenderer {
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            current: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.current.is_some()
    }

    /// Surface the visible overlay belongs to.
    pub fn surface(&self) -> Option<&Surface> {
        self.current.as_ref().map(|overlay| &overlay.surface)
    }

    pub fn text(&self) -> Option<String> {
        self.current
            .as_ref()
            .and_then(|overlay| overlay.element.text_content())
    }

    /// Whether `target` is the overlay or inside it.
    pub fn contains(&self, target: &Element) -> bool {
        self.current
            .as_ref()
            .is_some_and(|overlay| overlay.element.contains(Some(target.as_ref())))
    }

    /// Render `text` for `surface` at `point`, styled like the surface.
    pub fn show(&mut self, surface: &Surface, text: &str, point: CaretPoint) -> Result<(), DomError> {
        self.hide();

        let document = surface.owner_document()?;
        // Created in the surface's frame, so `instanceof` would not hold here.
        let element: HtmlElement = document.create_element("div")?.unchecked_into();
        element.set_class_name(&self.config.class_name);
        element.set_text_content(Some(text));

        let computed = surface.computed_style()?;
        let style = element.style();
        for property in COPIED_PROPERTIES {
            style.set_property(property, &computed.get_property_value(property)?)?;
        }
        style.set_property("position", "fixed")?;
        style.set_property("top", &css_px(point.top))?;
        style.set_property("left", &css_px(point.left))?;
        style.set_property("opacity", &self.config.opacity.to_string())?;
        style.set_property("z-index", &self.config.z_index.to_string())?;
        // Keep the leading space of a continuation visible.
        style.set_property("white-space", "pre")?;

        let background = computed.get_property_value("background-color")?;
        if let Some(background) = overlay_background(&background) {
            style.set_property("background-color", background)?;
        }

        document
            .body()
            .ok_or("surface document has no body")?
            .append_child(&element)?;
        tracing::trace!(target: "ghostline::overlay", len = text.len(), "overlay shown");
        self.current = Some(Overlay {
            element,
            surface: surface.clone(),
        });
        Ok(())
    }

    /// Move the overlay without touching its copied styles.
    pub fn reposition(&mut self, point: CaretPoint) -> Result<(), DomError> {
        let Some(overlay) = &self.current else {
            return Ok(());
        };
        let style = overlay.element.style();
        style.set_property("top", &css_px(point.top))?;
        style.set_property("left", &css_px(point.left))?;
        Ok(())
    }

    /// Detach the overlay. Safe to call when none is shown.
    pub fn hide(&mut self) {
        if let Some(overlay) = self.current.take() {
            overlay.element.remove();
            tracing::trace!(target: "ghostline::overlay", "overlay removed");
        }
    }
}
