//! PositionEngine: viewport coordinates of a surface's caret.
//!
//! Uses canvas text measurement with the surface's computed font. This is an
//! approximation: wrapped multi-line text is measured as if it were a single
//! line. The canvas lives in the top document, whichever frame the surface
//! is in.

use ghostline_core::{CaretPoint, FontSpec, Rect, TextExtent, caret_point};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, CssStyleDeclaration, HtmlCanvasElement};

use crate::error::DomError;
use crate::insertion::InsertionAdapter;
use crate::surface::Surface;

#[derive(Debug, Default)]
pub struct PositionEngine {
    context: Option<CanvasRenderingContext2d>,
}

impl PositionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caret position of `surface` in fixed (viewport) coordinates.
    pub fn caret_pixel(
        &mut self,
        surface: &Surface,
        adapter: &InsertionAdapter,
    ) -> Result<CaretPoint, DomError> {
        let bounds = surface.element().get_bounding_client_rect();
        let origin = Rect {
            top: bounds.top(),
            left: bounds.left(),
            width: bounds.width(),
            height: bounds.height(),
        };
        let font = font_of(&surface.computed_style()?)?;
        let extent = match adapter.read_caret_state(surface) {
            Some(caret) => Some(self.measure(caret.text_before_caret(), &font)?),
            None => None,
        };
        Ok(caret_point(surface.kind(), origin, extent))
    }

    /// Width of `text` in `font`, with height taken from the font size.
    pub fn measure(&mut self, text: &str, font: &FontSpec) -> Result<TextExtent, DomError> {
        let context = self.context()?;
        context.set_font(&font.shorthand());
        let metrics = context.measure_text(text)?;
        Ok(TextExtent {
            width: metrics.width(),
            height: font.size_px(),
        })
    }

    fn context(&mut self) -> Result<&CanvasRenderingContext2d, DomError> {
        if self.context.is_none() {
            let document = web_sys::window()
                .and_then(|window| window.document())
                .ok_or("no top document")?;
            let canvas = document
                .create_element("canvas")?
                .dyn_into::<HtmlCanvasElement>()
                .map_err(|_| DomError::from("canvas element has unexpected type"))?;
            let context = canvas
                .get_context("2d")?
                .ok_or("2d context unavailable")?
                .dyn_into::<CanvasRenderingContext2d>()
                .map_err(|_| DomError::from("2d context has unexpected type"))?;
            self.context = Some(context);
        }
        self.context
            .as_ref()
            .ok_or_else(|| DomError::from("2d context unavailable"))
    }
}

/// Font of a computed style, as used for measurement.
pub fn font_of(style: &CssStyleDeclaration) -> Result<FontSpec, DomError> {
    Ok(FontSpec {
        weight: style.get_property_value("font-weight")?,
        size: style.get_property_value("font-size")?,
        family: style.get_property_value("font-family")?,
    })
}
