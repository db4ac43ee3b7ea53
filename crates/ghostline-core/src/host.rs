//! Rich-editor host profiles.
//!
//! Some hosts render their own editing surface (line views inside a
//! container, hidden event-target iframes) and intercept native editing. A
//! profile describes how to recognise such a surface and where its text
//! lives. Selectors are evaluated by the DOM layer with `closest()`.

use smol_str::SmolStr;

/// Recognition rules for one rich-editor host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostProfile {
    /// Host name the profile applies to, e.g. `docs.google.com`.
    pub host: SmolStr,
    /// Classes that mark the focused node itself as the editor.
    pub marker_classes: Vec<SmolStr>,
    /// Selectors for an enclosing editor; a `closest()` hit is a match.
    pub container_selectors: Vec<SmolStr>,
    /// Selectors tried in order to find the node whose text holds the caret.
    pub line_selectors: Vec<SmolStr>,
}

impl HostProfile {
    /// Whether any of `classes` is one of this profile's marker classes.
    pub fn has_marker_class<'a>(&self, classes: impl IntoIterator<Item = &'a str>) -> bool {
        classes
            .into_iter()
            .any(|class| self.marker_classes.iter().any(|m| m == class))
    }
}

/// The set of known rich-editor hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostProfiles {
    profiles: Vec<HostProfile>,
}

impl Default for HostProfiles {
    fn default() -> Self {
        Self::builtin()
    }
}

impl HostProfiles {
    /// Profiles shipped with the extension.
    pub fn builtin() -> Self {
        Self {
            profiles: vec![HostProfile {
                host: SmolStr::new_static("docs.google.com"),
                marker_classes: vec![
                    SmolStr::new_static("kix-lineview"),
                    SmolStr::new_static("docs-texteventtarget-iframe"),
                ],
                container_selectors: vec![
                    SmolStr::new_static(".docs-editor-container"),
                    SmolStr::new_static("[contenteditable=\"true\"][role=\"textbox\"]"),
                ],
                line_selectors: vec![
                    SmolStr::new_static(".kix-lineview"),
                    SmolStr::new_static(".docs-editor-container"),
                ],
            }],
        }
    }

    pub fn new(profiles: Vec<HostProfile>) -> Self {
        Self { profiles }
    }

    /// Profile for the given host name, compared case-insensitively.
    pub fn for_host(&self, hostname: &str) -> Option<&HostProfile> {
        self.profiles
            .iter()
            .find(|p| p.host.eq_ignore_ascii_case(hostname))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_docs() {
        let profiles = HostProfiles::builtin();
        let docs = profiles.for_host("docs.google.com").unwrap();
        assert!(docs.has_marker_class(["kix-lineview"]));
        assert!(!docs.has_marker_class(["kix-page"]));
        assert_eq!(docs.line_selectors[0], ".kix-lineview");
    }

    #[test]
    fn host_match_is_case_insensitive() {
        let profiles = HostProfiles::builtin();
        assert!(profiles.for_host("Docs.Google.com").is_some());
        assert!(profiles.for_host("example.com").is_none());
    }
}
