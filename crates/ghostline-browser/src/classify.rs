//! SurfaceClassifier: reads [`ElementTraits`] off live DOM nodes.
//!
//! The decision itself is [`ghostline_core::classify`]; this module only
//! gathers the facts. Nothing is cached on the node, every focus event
//! re-classifies.

use ghostline_core::{ElementTraits, HostProfile, HostProfiles, StyleTraits, classify};
use smol_str::SmolStr;
use web_sys::{Element, HtmlInputElement};

use crate::cast::{as_html, with_tag};
use crate::surface::{Surface, computed_style};

#[derive(Debug, Clone, Default)]
pub struct SurfaceClassifier {
    profile: Option<HostProfile>,
}

impl SurfaceClassifier {
    pub fn new(profile: Option<HostProfile>) -> Self {
        Self { profile }
    }

    /// Classifier for the page at `hostname`, picking up any matching
    /// rich-editor profile.
    pub fn for_host(profiles: &HostProfiles, hostname: &str) -> Self {
        let profile = profiles.for_host(hostname).cloned();
        if let Some(profile) = &profile {
            tracing::debug!(host = %profile.host, "rich-editor profile active");
        }
        Self::new(profile)
    }

    pub fn profile(&self) -> Option<&HostProfile> {
        self.profile.as_ref()
    }

    pub fn classify(&self, element: &Element) -> Option<Surface> {
        let kind = classify(&self.traits(element))?;
        Some(Surface::new(element.clone(), kind))
    }

    pub fn traits(&self, element: &Element) -> ElementTraits {
        let class_names = class_names(element);
        ElementTraits {
            tag_name: element.tag_name().into(),
            input_type: with_tag::<HtmlInputElement>(element, "input")
                .map(|input| input.type_().into()),
            content_editable: is_content_editable(element),
            role: element.get_attribute("role").map(SmolStr::from),
            has_editable_ancestor: has_editable_ancestor(element),
            rich_editor_match: self.matches_rich_editor(element, &class_names),
            style: style_traits(element),
            class_names,
        }
    }

    fn matches_rich_editor(&self, element: &Element, class_names: &[SmolStr]) -> bool {
        let Some(profile) = &self.profile else {
            return false;
        };
        if profile.has_marker_class(class_names.iter().map(SmolStr::as_str)) {
            return true;
        }
        profile
            .container_selectors
            .iter()
            .any(|selector| matches!(element.closest(selector), Ok(Some(_))))
    }
}

fn class_names(element: &Element) -> Vec<SmolStr> {
    let list = element.class_list();
    (0..list.length())
        .filter_map(|i| list.item(i))
        .map(SmolStr::from)
        .collect()
}

fn is_content_editable(element: &Element) -> bool {
    as_html(element).is_some_and(|el| el.is_content_editable() || el.content_editable() == "true")
}

fn has_editable_ancestor(element: &Element) -> bool {
    let mut parent = element.parent_element();
    while let Some(node) = parent {
        if is_content_editable(&node) {
            return true;
        }
        parent = node.parent_element();
    }
    false
}

fn style_traits(element: &Element) -> Option<StyleTraits> {
    let style = computed_style(element).ok()?;
    let read = |prop: &str| -> SmolStr { style.get_property_value(prop).unwrap_or_default().into() };
    Some(StyleTraits {
        user_select: read("user-select"),
        cursor: read("cursor"),
        white_space: read("white-space"),
    })
}
