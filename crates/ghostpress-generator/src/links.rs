//! Rewriting CMS links to site-relative links.
//!
//! Post and page bodies link to other content by its absolute CMS URL.
//! Those links are turned into site-relative paths so that they resolve on
//! the generated site. Links into `/content/` (uploaded media) still point
//! at the CMS, which keeps serving those files.

use std::borrow::Cow;

use regex::{Captures, Regex};
use thiserror::Error;

use crate::pipeline::{LinkRewriteOptions, NodeType};

/// Link rewriting errors.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The CMS URL has no host.
    #[error("invalid CMS url: {0}")]
    InvalidUrl(String),

    /// Pattern compilation failed.
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type for link rewriting.
pub type Result<T> = std::result::Result<T, LinkError>;

/// Rewrites absolute CMS links in HTML bodies.
#[derive(Debug, Clone)]
pub struct LinkRewriter {
    options: LinkRewriteOptions,
    pattern: Regex,
}

impl LinkRewriter {
    /// Build a rewriter for links to `cms_url`.
    pub fn new(cms_url: &str, options: LinkRewriteOptions) -> Result<Self> {
        let host = cms_url
            .trim()
            .trim_end_matches('/')
            .split_once("://")
            .map(|(_, host)| host)
            .filter(|host| !host.is_empty())
            .ok_or_else(|| LinkError::InvalidUrl(cms_url.to_string()))?;

        let pattern = Regex::new(&format!(
            r#"href="(?i:https?)://{}(/[^"]*)?""#,
            regex::escape(host)
        ))?;

        Ok(Self { options, pattern })
    }

    /// Rewrite `html` of a record of type `node_type`.
    ///
    /// Records rejected by the filter are returned unchanged.
    pub fn rewrite<'a>(&self, node_type: NodeType, html: &'a str) -> Cow<'a, str> {
        if !self.options.accepts(node_type) {
            return Cow::Borrowed(html);
        }

        self.pattern.replace_all(html, |caps: &Captures<'_>| {
            let path = caps.get(1).map_or("/", |m| m.as_str());
            if path.starts_with("/content/") {
                caps[0].to_string()
            } else {
                format!(r#"href="{}""#, with_trailing_slash(path))
            }
        })
    }
}

/// Append a trailing slash to page paths.
///
/// Paths with a query, fragment or file extension are left alone.
fn with_trailing_slash(path: &str) -> Cow<'_, str> {
    let last_segment = path.rsplit('/').next().unwrap_or_default();
    if path.ends_with('/') || path.contains(['?', '#']) || last_segment.contains('.') {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("{path}/"))
    }
}
