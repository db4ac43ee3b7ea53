//! Color utilities for the overlay.

/// An sRGB colour with alpha in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }
}

/// Parse a computed-style colour (`rgb(...)`, `rgba(...)`, `transparent`).
///
/// Computed styles always serialise colours in one of these forms, so named
/// colours and hex notation are not handled.
pub fn parse_css_color(value: &str) -> Option<Rgba> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("transparent") {
        return Some(Rgba {
            r: 0,
            g: 0,
            b: 0,
            a: 0.0,
        });
    }

    let inner = value
        .strip_prefix("rgba(")
        .or_else(|| value.strip_prefix("rgb("))?
        .strip_suffix(')')?;

    // Accept both `r, g, b, a` and `r g b / a`.
    let parts: Vec<&str> = inner
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();

    let channel = |s: &str| s.parse::<f32>().ok().map(|v| v.clamp(0.0, 255.0) as u8);
    match parts.as_slice() {
        [r, g, b] => Some(Rgba {
            r: channel(r)?,
            g: channel(g)?,
            b: channel(b)?,
            a: 1.0,
        }),
        [r, g, b, a] => Some(Rgba {
            r: channel(r)?,
            g: channel(g)?,
            b: channel(b)?,
            a: parse_alpha(a)?,
        }),
        _ => None,
    }
}

fn parse_alpha(s: &str) -> Option<f32> {
    match s.strip_suffix('%') {
        Some(pct) => pct.parse::<f32>().ok().map(|v| (v / 100.0).clamp(0.0, 1.0)),
        None => s.parse::<f32>().ok().map(|v| v.clamp(0.0, 1.0)),
    }
}

/// Whether a computed background should be treated as "no background".
///
/// Unparseable values count as transparent so the overlay never picks up a
/// colour it did not understand.
pub fn is_transparent(value: &str) -> bool {
    parse_css_color(value).is_none_or(|c| c.is_transparent())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rgb() {
        assert_eq!(
            parse_css_color("rgb(255, 0, 0)"),
            Some(Rgba {
                r: 255,
                g: 0,
                b: 0,
                a: 1.0
            })
        );
        assert_eq!(
            parse_css_color("rgba(0, 255, 0, 0.5)"),
            Some(Rgba {
                r: 0,
                g: 255,
                b: 0,
                a: 0.5
            })
        );
        assert_eq!(parse_css_color("rgb(1 2 3 / 50%)").map(|c| c.a), Some(0.5));
    }

    #[test]
    fn test_transparent_backgrounds() {
        assert!(is_transparent("rgba(0, 0, 0, 0)"));
        assert!(is_transparent("transparent"));
        assert!(is_transparent("rgba(12, 34, 56, 0)"));
        assert!(is_transparent("not-a-colour"));
        assert!(!is_transparent("rgb(255, 255, 255)"));
        assert!(!is_transparent("rgba(32, 33, 36, 0.9)"));
    }
}
