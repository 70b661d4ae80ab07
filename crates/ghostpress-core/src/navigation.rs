//! Navigation items and link classification.
//!
//! A navigation item is either an external link, which opens in a new
//! browsing context with no opener or referrer, or an internal link that the
//! client-side router handles without a full page reload.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static EXTERNAL_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*https?://").expect("external url pattern is valid"));

/// `target` attribute of external links.
pub const EXTERNAL_TARGET: &str = "_blank";

/// `rel` attribute of external links.
pub const EXTERNAL_REL: &str = "noopener noreferrer";

/// One entry of the site navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationItem {
    /// Display label.
    pub label: String,

    /// Link URL, absolute or site-relative.
    pub url: String,
}

impl NavigationItem {
    /// Create a new navigation item.
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> LinkKind {
        classify_url(&self.url)
    }
}

/// How a link is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// Plain hyperlink opening a new browsing context.
    External,
    /// Client-side routed link.
    Internal,
}

impl LinkKind {
    #[must_use]
    pub fn is_external(self) -> bool {
        matches!(self, Self::External)
    }

    /// `target` attribute, set only for external links.
    #[must_use]
    pub fn target(self) -> Option<&'static str> {
        self.is_external().then_some(EXTERNAL_TARGET)
    }

    /// `rel` attribute, set only for external links.
    #[must_use]
    pub fn rel(self) -> Option<&'static str> {
        self.is_external().then_some(EXTERNAL_REL)
    }
}

/// External iff the URL starts with an explicit `http://` or `https://`
/// scheme, ignoring case and leading whitespace.
///
/// Protocol-relative (`//host`) and other schemes (`mailto:`, `tel:`) are
/// internal. The router only intercepts same-origin links, so the browser
/// still opens those natively.
#[must_use]
pub fn classify_url(url: &str) -> LinkKind {
    if EXTERNAL_URL.is_match(url) {
        LinkKind::External
    } else {
        LinkKind::Internal
    }
}

/// A navigation item ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    /// Position in the input sequence; stable identity for keyed rendering.
    pub key: usize,
    pub label: String,
    pub href: String,
    pub kind: LinkKind,
}

/// Map navigation items to render entries, preserving order and length.
#[must_use]
pub fn navigation_entries(items: &[NavigationItem]) -> Vec<NavEntry> {
    items
        .iter()
        .enumerate()
        .map(|(key, item)| NavEntry {
            key,
            label: item.label.clone(),
            href: item.url.clone(),
            kind: item.kind(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_external() {
        assert_eq!(classify_url("https://example.com"), LinkKind::External);
        assert_eq!(classify_url("http://example.com/a"), LinkKind::External);
        assert_eq!(classify_url("HTTPS://EXAMPLE.COM"), LinkKind::External);
        assert_eq!(classify_url("  https://example.com"), LinkKind::External);
        assert_eq!(classify_url("\thttp://example.com"), LinkKind::External);
    }

    #[test]
    fn test_classify_internal() {
        assert_eq!(classify_url("/"), LinkKind::Internal);
        assert_eq!(classify_url("/tag/rust/"), LinkKind::Internal);
        assert_eq!(classify_url("about/"), LinkKind::Internal);
        assert_eq!(classify_url("/https://not-a-scheme"), LinkKind::Internal);
        assert_eq!(classify_url("httpsomething"), LinkKind::Internal);
    }

    #[test]
    fn test_classify_other_schemes_are_internal() {
        assert_eq!(classify_url("//cdn.example.com"), LinkKind::Internal);
        assert_eq!(classify_url("mailto:me@example.com"), LinkKind::Internal);
        assert_eq!(classify_url("tel:+4912345"), LinkKind::Internal);
    }

    #[test]
    fn test_link_attributes() {
        assert_eq!(LinkKind::External.target(), Some("_blank"));
        assert_eq!(LinkKind::External.rel(), Some("noopener noreferrer"));
        assert_eq!(LinkKind::Internal.target(), None);
        assert_eq!(LinkKind::Internal.rel(), None);
    }

    #[test]
    fn test_entries_preserve_order_and_length() {
        let items = vec![
            NavigationItem::new("Home", "/"),
            NavigationItem::new("Ext", "https://example.com"),
            NavigationItem::new("About", "/about/"),
        ];

        let entries = navigation_entries(&items);

        assert_eq!(entries.len(), items.len());
        for (i, (entry, item)) in entries.iter().zip(&items).enumerate() {
            assert_eq!(entry.key, i);
            assert_eq!(entry.label, item.label);
            assert_eq!(entry.href, item.url);
        }
    }

    #[test]
    fn test_home_and_external_example() {
        let items = vec![
            NavigationItem::new("Home", "/"),
            NavigationItem::new("Ext", "https://example.com"),
        ];

        let entries = navigation_entries(&items);

        assert_eq!(entries[0].kind, LinkKind::Internal);
        assert_eq!(entries[0].href, "/");
        assert_eq!(entries[1].kind, LinkKind::External);
        assert_eq!(entries[1].href, "https://example.com");
    }

    #[test]
    fn test_entries_are_idempotent() {
        let items = vec![
            NavigationItem::new("Home", "/"),
            NavigationItem::new("Ext", "https://example.com"),
        ];
        assert_eq!(navigation_entries(&items), navigation_entries(&items));
    }

    #[test]
    fn test_empty_navigation() {
        assert!(navigation_entries(&[]).is_empty());
    }
}
