//! Caret position arithmetic.
//!
//! The DOM layer measures text with an offscreen canvas; this module owns
//! the font shorthand it configures and how the measurement combines with
//! the surface's bounding box. Multi-line wrapping is not modelled: the
//! result is exact only for text on the surface's first line.

use crate::surface::SurfaceKind;

/// Font properties read from a surface's computed style.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontSpec {
    pub weight: String,
    pub size: String,
    pub family: String,
}

impl FontSpec {
    /// Canvas `font` shorthand: `"<weight> <size> <family>"`.
    pub fn shorthand(&self) -> String {
        format!("{} {} {}", self.weight, self.size, self.family)
    }

    /// Font size in pixels, or 0 when it is not a pixel value.
    pub fn size_px(&self) -> f64 {
        parse_px(&self.size).unwrap_or(0.0)
    }
}

/// Parse the numeric part of a CSS pixel length (`"16px"`, `"13.5px"`).
pub fn parse_px(value: &str) -> Option<f64> {
    value.trim().strip_suffix("px")?.trim().parse().ok()
}

/// Width of the text before the caret, and the line height estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextExtent {
    pub width: f64,
    pub height: f64,
}

/// Viewport rectangle of a surface.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Viewport (fixed) coordinates for the overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CaretPoint {
    pub top: f64,
    pub left: f64,
}

/// Combine a surface's origin with the measured text before the caret.
///
/// Plain inputs are treated as single-line, so only the horizontal advance
/// applies. Other surfaces also drop one font-size line down from the
/// origin.
pub fn caret_point(kind: SurfaceKind, origin: Rect, extent: Option<TextExtent>) -> CaretPoint {
    let extent = extent.unwrap_or_default();
    let vertical = match kind {
        SurfaceKind::PlainInput => 0.0,
        SurfaceKind::ContentEditable | SurfaceKind::RichEditor => extent.height,
    };
    CaretPoint {
        top: origin.top + vertical,
        left: origin.left + extent.width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_shorthand() {
        let font = FontSpec {
            weight: "400".into(),
            size: "16px".into(),
            family: "Arial, sans-serif".into(),
        };
        insta::assert_snapshot!(font.shorthand(), @"400 16px Arial, sans-serif");
        assert_eq!(font.size_px(), 16.0);
    }

    #[test]
    fn px_parsing() {
        assert_eq!(parse_px("13.5px"), Some(13.5));
        assert_eq!(parse_px(" 12px "), Some(12.0));
        assert_eq!(parse_px("1em"), None);
        assert_eq!(parse_px(""), None);
    }

    #[test]
    fn plain_input_is_horizontal_only() {
        let origin = Rect {
            top: 100.0,
            left: 20.0,
            width: 300.0,
            height: 24.0,
        };
        let extent = TextExtent {
            width: 42.5,
            height: 16.0,
        };
        let point = caret_point(SurfaceKind::PlainInput, origin, Some(extent));
        assert_eq!(point, CaretPoint { top: 100.0, left: 62.5 });

        let point = caret_point(SurfaceKind::ContentEditable, origin, Some(extent));
        assert_eq!(point, CaretPoint { top: 116.0, left: 62.5 });
    }

    #[test]
    fn missing_measurement_uses_origin() {
        let origin = Rect {
            top: 5.0,
            left: 7.0,
            ..Default::default()
        };
        let point = caret_point(SurfaceKind::RichEditor, origin, None);
        assert_eq!(point, CaretPoint { top: 5.0, left: 7.0 });
    }
}
