//! What the ghost overlay copies from its surface.

use crate::color::is_transparent;

/// Computed-style properties copied from the surface onto the overlay so the
/// ghost text matches the host's typography and box.
pub const COPIED_PROPERTIES: &[&str] = &[
    "font-size",
    "font-family",
    "font-weight",
    "font-style",
    "letter-spacing",
    "line-height",
    "text-transform",
    "word-spacing",
    "padding",
    "border",
    "color",
];

/// Background to give the overlay for a surface background, if any.
pub fn overlay_background(surface_background: &str) -> Option<&str> {
    (!is_transparent(surface_background)).then_some(surface_background)
}

/// Format a pixel length for an inline style.
pub fn css_px(value: f64) -> String {
    format!("{value}px")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_only_when_opaque() {
        assert_eq!(overlay_background("rgba(0, 0, 0, 0)"), None);
        assert_eq!(overlay_background("transparent"), None);
        assert_eq!(
            overlay_background("rgb(255, 255, 255)"),
            Some("rgb(255, 255, 255)")
        );
    }

    #[test]
    fn px_formatting() {
        assert_eq!(css_px(12.0), "12px");
        assert_eq!(css_px(62.5), "62.5px");
    }
}
