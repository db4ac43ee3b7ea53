//! Surface classification.
//!
//! The DOM layer snapshots the facts about a focused node into
//! [`ElementTraits`]; [`classify`] turns those facts into a [`SurfaceKind`].
//! Classification is pure and is re-run on every focus event.

use std::sync::LazyLock;

use regex::Regex;
use smol_str::SmolStr;

/// Which editing mechanics a surface uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// `<input>` or `<textarea>`: value + selectionStart.
    PlainInput,
    /// Native `contenteditable` region driven by the Selection API.
    ContentEditable,
    /// Host-managed editor that intercepts native editing.
    RichEditor,
}

impl SurfaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceKind::PlainInput => "plain-input",
            SurfaceKind::ContentEditable => "content-editable",
            SurfaceKind::RichEditor => "rich-editor",
        }
    }
}

impl std::fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `<input type>` values that take free text.
pub const TEXT_INPUT_TYPES: &[&str] = &["text", "email", "search", "url", "tel", "password"];

/// ARIA roles that mark a custom text field.
pub const EDITABLE_ROLES: &[&str] = &["textbox", "searchbox", "combobox"];

static EDITABLE_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)editor|editable|textarea|input").expect("static regex is valid")
});

/// Computed-style facts used by the last-resort heuristic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleTraits {
    pub user_select: SmolStr,
    pub cursor: SmolStr,
    pub white_space: SmolStr,
}

/// Snapshot of everything classification needs to know about a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementTraits {
    /// Tag name as reported by the DOM (`INPUT`, `div`, ...).
    pub tag_name: SmolStr,
    /// `type` of an `<input>`; `None` for other elements.
    pub input_type: Option<SmolStr>,
    /// `isContentEditable` or `contentEditable == "true"`.
    pub content_editable: bool,
    pub role: Option<SmolStr>,
    pub class_names: Vec<SmolStr>,
    /// Some ancestor element is content-editable.
    pub has_editable_ancestor: bool,
    /// The active host profile matched this node.
    pub rich_editor_match: bool,
    pub style: Option<StyleTraits>,
}

impl ElementTraits {
    fn is_tag(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }
}

/// Decide whether a node is an editable surface, first match wins.
pub fn classify(traits: &ElementTraits) -> Option<SurfaceKind> {
    if traits.rich_editor_match {
        return Some(SurfaceKind::RichEditor);
    }

    if traits.is_tag("input") {
        let input_type = traits.input_type.as_deref().unwrap_or("text");
        return TEXT_INPUT_TYPES
            .iter()
            .any(|t| t.eq_ignore_ascii_case(input_type))
            .then_some(SurfaceKind::PlainInput);
    }

    if traits.is_tag("textarea") {
        return Some(SurfaceKind::PlainInput);
    }

    let role_matches = traits
        .role
        .as_deref()
        .is_some_and(|role| EDITABLE_ROLES.contains(&role));
    let class_matches = traits
        .class_names
        .iter()
        .any(|class| EDITABLE_CLASS.is_match(class));

    if traits.content_editable || role_matches || class_matches || traits.has_editable_ancestor {
        return Some(SurfaceKind::ContentEditable);
    }

    if let Some(style) = &traits.style {
        let selectable = style.user_select != "none";
        if selectable && (style.cursor == "text" || style.white_space == "pre-wrap") {
            return Some(SurfaceKind::ContentEditable);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tag: &str) -> ElementTraits {
        ElementTraits {
            tag_name: tag.into(),
            ..Default::default()
        }
    }

    #[test]
    fn text_like_inputs_are_plain() {
        for ty in TEXT_INPUT_TYPES {
            let traits = ElementTraits {
                input_type: Some((*ty).into()),
                ..element("INPUT")
            };
            assert_eq!(classify(&traits), Some(SurfaceKind::PlainInput), "{ty}");
        }
    }

    #[test]
    fn other_inputs_never_match() {
        let checkbox = ElementTraits {
            input_type: Some("checkbox".into()),
            class_names: vec!["form-input".into()],
            style: Some(StyleTraits {
                user_select: "auto".into(),
                cursor: "text".into(),
                white_space: "normal".into(),
            }),
            ..element("INPUT")
        };
        assert_eq!(classify(&checkbox), None);
    }

    #[test]
    fn textarea_is_plain() {
        assert_eq!(classify(&element("TEXTAREA")), Some(SurfaceKind::PlainInput));
    }

    #[test]
    fn rich_editor_wins_over_everything() {
        let traits = ElementTraits {
            rich_editor_match: true,
            content_editable: true,
            ..element("TEXTAREA")
        };
        assert_eq!(classify(&traits), Some(SurfaceKind::RichEditor));
    }

    #[test]
    fn content_editable_signals() {
        let ce = ElementTraits {
            content_editable: true,
            ..element("DIV")
        };
        assert_eq!(classify(&ce), Some(SurfaceKind::ContentEditable));

        let role = ElementTraits {
            role: Some("searchbox".into()),
            ..element("DIV")
        };
        assert_eq!(classify(&role), Some(SurfaceKind::ContentEditable));

        let class = ElementTraits {
            class_names: vec!["ProseMirror".into(), "RichEditorRoot".into()],
            ..element("DIV")
        };
        assert_eq!(classify(&class), Some(SurfaceKind::ContentEditable));

        let nested = ElementTraits {
            has_editable_ancestor: true,
            ..element("SPAN")
        };
        assert_eq!(classify(&nested), Some(SurfaceKind::ContentEditable));
    }

    #[test]
    fn style_fallback() {
        let pre_wrap = ElementTraits {
            style: Some(StyleTraits {
                user_select: "auto".into(),
                cursor: "auto".into(),
                white_space: "pre-wrap".into(),
            }),
            ..element("DIV")
        };
        assert_eq!(classify(&pre_wrap), Some(SurfaceKind::ContentEditable));

        let unselectable = ElementTraits {
            style: Some(StyleTraits {
                user_select: "none".into(),
                cursor: "text".into(),
                white_space: "normal".into(),
            }),
            ..element("DIV")
        };
        assert_eq!(classify(&unselectable), None);
    }

    #[test]
    fn plain_div_is_not_a_surface() {
        let traits = ElementTraits {
            role: Some("button".into()),
            class_names: vec!["card".into()],
            style: Some(StyleTraits {
                user_select: "auto".into(),
                cursor: "pointer".into(),
                white_space: "normal".into(),
            }),
            ..element("DIV")
        };
        assert_eq!(classify(&traits), None);
    }
}
