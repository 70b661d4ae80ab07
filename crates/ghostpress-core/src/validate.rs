//! Content validation pass.
//!
//! Runs over a fetched [`SiteContent`] before anything is rendered, so that
//! malformed records fail the build loudly instead of producing broken
//! markup. Rendering code assumes every error-level rule below holds.

use std::collections::HashSet;

use tracing::debug;

use crate::content::SiteContent;

/// Outcome of validating a content snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// True when the report blocks a build.
    #[must_use]
    pub fn is_fatal(&self, strict: bool) -> bool {
        self.has_errors() || (strict && self.has_warnings())
    }
}

/// A slug made only of lowercase ASCII letters, digits and inner hyphens.
#[must_use]
pub fn is_url_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Validate every record a build renders.
#[must_use]
pub fn validate_content(content: &SiteContent) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (i, item) in content.settings.navigation.iter().enumerate() {
        if item.label.trim().is_empty() {
            report.add_error(format!("navigation item {i} has an empty label"));
        }
        if item.url.trim().is_empty() {
            report.add_error(format!("navigation item {i} has an empty url"));
        }
    }

    // Posts and pages share the root URL space.
    let mut seen = HashSet::new();
    for post in &content.posts {
        let summary = &post.summary;
        check_slug(&summary.slug, "post", &mut seen, &mut report);

        if summary.title.trim().is_empty() {
            report.add_error(format!("post '{}' has an empty title", summary.slug));
        }
        if summary.primary_author.name.trim().is_empty() {
            report.add_error(format!("post '{}' has no primary author name", summary.slug));
        }
        if summary.excerpt.trim().is_empty() {
            report.add_warning(format!("post '{}' has an empty excerpt", summary.slug));
        }
        if summary.primary_tag.is_none() {
            report.add_warning(format!(
                "post '{}' has no primary tag; its cards omit the tag label",
                summary.slug
            ));
        }
        if summary.feature_image_sharp.thumbnail_src().is_none() {
            report.add_warning(format!("post '{}' has no feature image", summary.slug));
        }
    }

    for page in &content.pages {
        check_slug(&page.slug, "page", &mut seen, &mut report);
        if page.title.trim().is_empty() {
            report.add_error(format!("page '{}' has an empty title", page.slug));
        }
    }

    let mut tag_slugs = HashSet::new();
    for tag in &content.tags {
        check_slug(&tag.slug, "tag", &mut tag_slugs, &mut report);
    }

    let mut author_slugs = HashSet::new();
    for author in &content.authors {
        check_slug(&author.slug, "author", &mut author_slugs, &mut report);
    }

    debug!(
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "validated content"
    );

    report
}

fn check_slug<'a>(
    slug: &'a str,
    kind: &str,
    seen: &mut HashSet<&'a str>,
    report: &mut ValidationReport,
) {
    if !is_url_safe_slug(slug) {
        report.add_error(format!("{kind} slug '{slug}' is not URL-safe"));
    }
    if !seen.insert(slug) {
        report.add_error(format!("duplicate {kind} slug '{slug}'"));
    }
}
