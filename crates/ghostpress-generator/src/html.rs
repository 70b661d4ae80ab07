//! HTML generation from site content.
//!
//! Renders posts, pages and archive listings into the base template. The
//! navigation and suggestion-card markup here mirrors the `ghostpress-ui`
//! components; both go through the core view models.

use std::path::{Path, PathBuf};

use chrono::{Datelike, Utc};
use ghostpress_core::{
    Author, Config, NavigationItem, Page, Post, PostCard, PostSummary, Settings, Tag,
    navigation_entries, suggestion::CARD_REVEAL,
};
use thiserror::Error;
use tracing::debug;

use crate::{
    offline::registration_script,
    pipeline::{Pipeline, ScrollRevealOptions},
    template::{TemplateContext, TemplateError, TemplateRegistry},
};

/// HTML generation errors.
#[derive(Debug, Error)]
pub enum HtmlError {
    /// Template error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for HTML generation.
pub type Result<T> = std::result::Result<T, HtmlError>;

/// Escape text for use in HTML content and attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Render the site navigation.
///
/// External links open in a new tab; internal links carry
/// `data-router-link` for the client-side router.
#[must_use]
pub fn navigation_html(items: &[NavigationItem]) -> String {
    let entries: String = navigation_entries(items)
        .iter()
        .map(|entry| {
            let attrs = match (entry.kind.target(), entry.kind.rel()) {
                (Some(target), Some(rel)) => format!(r#" target="{target}" rel="{rel}""#),
                _ => " data-router-link".to_string(),
            };
            format!(
                r#"<li class="entry"><a class="link" href="{}"{attrs}>{}</a></li>"#,
                escape_html(&entry.href),
                escape_html(&entry.label)
            )
        })
        .collect();

    format!(r#"<ul class="categories">{entries}</ul>"#)
}

/// Render a suggestion card linking to `post`.
#[must_use]
pub fn post_suggestion_html(post: &PostSummary) -> String {
    let card = PostCard::from_summary(post);
    let transition = card.transition;

    let reveal: String = CARD_REVEAL
        .iter()
        .map(|(name, value)| format!(r#" {name}="{value}""#))
        .collect();

    let tag = card
        .tag_label
        .as_deref()
        .map(|label| format!("<span>{}</span>", escape_html(label)))
        .unwrap_or_default();

    format!(
        r#"<a href="{href}" class="transition-link" data-transition="{effect}" data-direction="{direction}" data-duration="{duration}" data-bg="{bg}"><article class="next-article" style="{style}"{reveal}><div class="content">{tag}<h1 class="title">{title}</h1></div></article></a>"#,
        href = escape_html(&card.permalink),
        effect = transition.effect,
        direction = transition.direction,
        duration = transition.duration,
        bg = transition.background,
        style = escape_html(&card.style()),
        title = escape_html(&card.title),
    )
}

/// Render a post as an entry of a listing page.
#[must_use]
pub fn post_list_item_html(post: &Post) -> String {
    let image = post
        .summary
        .feature_image_sharp
        .thumbnail_src()
        .map(|src| {
            format!(
                r#"<img class="post-card-image" src="{}" alt="{}" loading="lazy">"#,
                escape_html(src),
                escape_html(post.title())
            )
        })
        .unwrap_or_default();

    let date = post
        .published_at
        .map(|d| {
            format!(
                r#"<time datetime="{}">{}</time>"#,
                d.format("%Y-%m-%d"),
                d.format("%B %d, %Y")
            )
        })
        .unwrap_or_default();

    format!(
        r#"<article class="post-card"{reveal}><a href="{href}" data-router-link>{image}<h2 class="post-card-title">{title}</h2></a><p class="post-card-excerpt">{excerpt}</p>{date}</article>"#,
        reveal = CARD_REVEAL
            .iter()
            .map(|(name, value)| format!(r#" {name}="{value}""#))
            .collect::<String>(),
        href = escape_html(&post.url()),
        title = escape_html(post.title()),
        excerpt = escape_html(&post.summary.excerpt),
    )
}

/// Per-site markup shared by every page: head links and scripts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteChrome {
    /// Extra `<link>` tags for the head.
    pub head_links: String,
    /// Feed discovery `<link>` tags, if feeds are generated.
    pub feed_links: Option<String>,
    /// Analytics `<script>`, if configured.
    pub analytics: Option<String>,
    /// Service worker registration `<script>`, if offline support is on.
    pub service_worker: Option<String>,
    pub reveal: ScrollRevealOptions,
}

impl SiteChrome {
    /// Derive head markup from the pipeline's manifest, feed, sitemap,
    /// analytics and offline steps.
    #[must_use]
    pub fn from_pipeline(pipeline: &Pipeline) -> Self {
        let mut links = Vec::new();

        if let Some(manifest) = pipeline.manifest() {
            links.push(r#"<link rel="manifest" href="/manifest.webmanifest">"#.to_string());
            let icon = icon_href(&manifest.icon);
            links.push(format!(r#"<link rel="icon" href="{icon}">"#));
            if manifest.legacy {
                links.push(format!(r#"<link rel="apple-touch-icon" href="{icon}">"#));
            }
        }

        if pipeline.sitemap().is_some_and(|s| s.create_link_in_head) {
            links.push(
                r#"<link rel="sitemap" type="application/xml" href="/sitemap.xml">"#.to_string(),
            );
        }

        let feed_links = pipeline.feed().map(|feed| {
            feed.feeds
                .iter()
                .map(|f| {
                    format!(
                        r#"<link rel="alternate" type="application/rss+xml" title="{}" href="{}">"#,
                        escape_html(&f.title),
                        escape_html(&f.output)
                    )
                })
                .collect::<Vec<_>>()
                .join("\n    ")
        });

        let analytics = pipeline.analytics().map(|a| {
            format!(
                r#"<script src="https://{}/script.js" data-site="{}" defer></script>"#,
                escape_html(a.tracking_url.trim_end_matches('/')),
                escape_html(&a.site_id)
            )
        });

        Self {
            head_links: links.join("\n    "),
            feed_links,
            analytics,
            service_worker: pipeline.offline().map(|_| registration_script()),
            reveal: pipeline.scroll_reveal().copied().unwrap_or_default(),
        }
    }
}

/// Site path of an icon given its project path, e.g. `static/favicon.png`
/// becomes `/favicon.png`.
fn icon_href(icon: &str) -> String {
    let file = icon.rsplit('/').next().unwrap_or(icon);
    format!("/{file}")
}

/// HTML page generator.
#[derive(Debug)]
pub struct HtmlGenerator {
    templates: TemplateRegistry,
    config: Config,
    settings: Settings,
    chrome: SiteChrome,
}

impl HtmlGenerator {
    /// Create a new HTML generator.
    #[must_use]
    pub fn new(config: Config, settings: Settings, chrome: SiteChrome) -> Self {
        Self {
            templates: TemplateRegistry::new(),
            config,
            settings,
            chrome,
        }
    }

    fn site_title(&self) -> &str {
        if self.settings.title.is_empty() {
            &self.config.site.title
        } else {
            &self.settings.title
        }
    }

    fn site_description(&self) -> Option<&str> {
        self.settings
            .description
            .as_deref()
            .or(self.config.site.description.as_deref())
    }

    /// Generate the home page listing every post, newest first.
    pub fn generate_index(&self, posts: &[&Post]) -> Result<String> {
        debug!(posts = posts.len(), "generating index page");

        let mut ctx = TemplateContext::new()
            .with_var("title", escape_html(self.site_title()))
            .with_var("items", list_items(posts));
        if let Some(description) = self.site_description() {
            ctx.insert(
                "description",
                format!(r#"<p class="list-description">{}</p>"#, escape_html(description)),
            );
        }

        let inner = self.templates.render("list", &ctx)?;
        self.wrap(self.site_title(), self.site_description(), "/", &inner)
    }

    /// Generate a post page with suggestion cards for its neighbours.
    pub fn generate_post(
        &self,
        post: &Post,
        previous: Option<&PostSummary>,
        next: Option<&PostSummary>,
    ) -> Result<String> {
        debug!(url = %post.url(), "generating HTML for post");

        let mut ctx = TemplateContext::new()
            .with_var("title", escape_html(post.title()))
            .with_var("author", author_html(&post.summary.primary_author))
            .with_var("body", &post.html);

        if let Some(tag) = &post.summary.primary_tag {
            ctx.insert(
                "tag_label",
                format!(
                    r#"<a class="post-tag" href="{}" data-router-link>{}</a>"#,
                    escape_html(&tag.url()),
                    escape_html(&tag.name)
                ),
            );
        }
        if let Some(date) = post.published_at {
            ctx.insert(
                "date",
                format!(
                    r#" &middot; <time datetime="{}">{}</time>"#,
                    date.format("%Y-%m-%d"),
                    date.format("%B %d, %Y")
                ),
            );
        }
        if let Some(image) = &post.feature_image {
            ctx.insert("feature_image", feature_image_html(image, post.title()));
        }

        let cards: String = [previous, next]
            .into_iter()
            .flatten()
            .map(post_suggestion_html)
            .collect();
        if !cards.is_empty() {
            ctx.insert(
                "suggestions",
                format!(r#"<aside class="suggestions">{cards}</aside>"#),
            );
        }

        let inner = self.templates.render("post", &ctx)?;
        let description =
            (!post.summary.excerpt.is_empty()).then_some(post.summary.excerpt.as_str());
        self.wrap(post.title(), description, &post.url(), &inner)
    }

    /// Generate a static page.
    pub fn generate_page(&self, page: &Page) -> Result<String> {
        debug!(url = %page.url(), "generating HTML for page");

        let mut ctx = TemplateContext::new()
            .with_var("title", escape_html(&page.title))
            .with_var("body", &page.html);
        if let Some(image) = &page.feature_image {
            ctx.insert("feature_image", feature_image_html(image, &page.title));
        }

        let inner = self.templates.render("page", &ctx)?;
        self.wrap(&page.title, None, &page.url(), &inner)
    }

    /// Generate a tag archive page.
    pub fn generate_tag(&self, tag: &Tag, posts: &[&Post]) -> Result<String> {
        debug!(tag = %tag.slug, posts = posts.len(), "generating tag page");

        let mut ctx = TemplateContext::new()
            .with_var("title", escape_html(&tag.name))
            .with_var("items", list_items(posts));
        if let Some(description) = &tag.description {
            ctx.insert(
                "description",
                format!(r#"<p class="list-description">{}</p>"#, escape_html(description)),
            );
        }

        let inner = self.templates.render("list", &ctx)?;
        self.wrap(&tag.name, tag.description.as_deref(), &tag.url(), &inner)
    }

    /// Generate an author archive page.
    pub fn generate_author(&self, author: &Author, posts: &[&Post]) -> Result<String> {
        debug!(author = %author.slug, posts = posts.len(), "generating author page");

        let mut ctx = TemplateContext::new()
            .with_var("title", escape_html(&author.name))
            .with_var("items", list_items(posts));
        if let Some(bio) = &author.bio {
            ctx.insert(
                "description",
                format!(r#"<p class="list-description">{}</p>"#, escape_html(bio)),
            );
        }

        let inner = self.templates.render("list", &ctx)?;
        self.wrap(&author.name, author.bio.as_deref(), &author.url(), &inner)
    }

    /// Generate the app shell page the service worker serves for pages that
    /// are not in its cache.
    pub fn generate_app_shell(&self, path: &str) -> Result<String> {
        let ctx = TemplateContext::new()
            .with_var("title", "You are offline")
            .with_var("body", "<p>This page has not been saved for offline reading yet.</p>");

        let inner = self.templates.render("page", &ctx)?;
        self.wrap("Offline", None, path, &inner)
    }

    /// Wrap inner markup in the base template.
    fn wrap(
        &self,
        title: &str,
        description: Option<&str>,
        path: &str,
        inner: &str,
    ) -> Result<String> {
        let site_title = self.site_title();
        let full_title = if title == site_title {
            escape_html(title)
        } else {
            format!("{} | {}", escape_html(title), escape_html(site_title))
        };

        let mut ctx = TemplateContext::new()
            .with_var("lang", &self.config.site.language)
            .with_var("title", full_title)
            .with_var("site_title", escape_html(site_title))
            .with_var("theme_color", &self.config.site.theme_color)
            .with_var("canonical_url", self.config.url_for(path))
            .with_var("navigation", navigation_html(&self.settings.navigation))
            .with_var("content", inner)
            .with_var("year", Utc::now().year().to_string())
            .with_var("head_links", &self.chrome.head_links)
            .with_var("reveal_once", self.chrome.reveal.once.to_string())
            .with_var("reveal_threshold", self.chrome.reveal.threshold.to_string());

        if let Some(description) = description.or(self.site_description()) {
            ctx.insert("description", escape_html(description));
        }
        if let Some(feed_links) = &self.chrome.feed_links {
            ctx.insert("feed_link", feed_links);
        }
        if let Some(analytics) = &self.chrome.analytics {
            ctx.insert("analytics", analytics);
        }
        if let Some(service_worker) = &self.chrome.service_worker {
            ctx.insert("service_worker", service_worker);
        }

        Ok(self.templates.render("base", &ctx)?)
    }

    /// Output file for a site path: `/a/b/` becomes `<out>/a/b/index.html`.
    #[must_use]
    pub fn output_path(&self, path: &str, output_dir: &Path) -> PathBuf {
        let relative = path.trim_matches('/');

        if relative.is_empty() {
            output_dir.join("index.html")
        } else {
            output_dir.join(relative).join("index.html")
        }
    }
}

fn list_items(posts: &[&Post]) -> String {
    posts
        .iter()
        .map(|post| post_list_item_html(post))
        .collect::<Vec<_>>()
        .join("\n")
}

fn author_html(author: &Author) -> String {
    if author.slug.is_empty() {
        escape_html(&author.name)
    } else {
        format!(
            r#"<a class="post-author" href="{}" data-router-link>{}</a>"#,
            escape_html(&author.url()),
            escape_html(&author.name)
        )
    }
}

fn feature_image_html(src: &str, alt: &str) -> String {
    format!(
        r#"<figure class="feature-image"><img src="{}" alt="{}"></figure>"#,
        escape_html(src),
        escape_html(alt)
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use ghostpress_core::{BuildCredentials, ProcessedImage, suggestion::CARD_GRADIENT};

    use super::*;

    fn test_config() -> Config {
        Config::new("Short Tech", "https://shorttech.de")
    }

    fn test_settings() -> Settings {
        Settings {
            title: "Short Tech".to_string(),
            description: Some("Tech in short".to_string()),
            navigation: vec![
                NavigationItem::new("Home", "/"),
                NavigationItem::new("Ext", "https://example.com"),
            ],
            ..Default::default()
        }
    }

    fn summary(slug: &str, tag: Option<&str>) -> PostSummary {
        PostSummary {
            slug: slug.to_string(),
            title: format!("Post {slug}"),
            excerpt: "Excerpt".to_string(),
            primary_tag: tag.map(|name| Tag {
                name: name.to_string(),
                slug: name.to_lowercase(),
                ..Default::default()
            }),
            primary_author: Author {
                name: "Ada".to_string(),
                slug: "ada".to_string(),
                ..Default::default()
            },
            feature_image_sharp: ProcessedImage::passthrough("/img/a.jpg"),
        }
    }

    fn test_post() -> Post {
        Post {
            summary: summary("hello-world", Some("Rust")),
            html: "<p>Hello</p>".to_string(),
            published_at: Some(Utc.with_ymd_and_hms(2020, 5, 1, 10, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    fn generator() -> HtmlGenerator {
        HtmlGenerator::new(test_config(), test_settings(), SiteChrome::default())
    }

    #[test]
    fn test_navigation_home_and_external() {
        let html = navigation_html(&test_settings().navigation);

        assert_eq!(
            html,
            concat!(
                r#"<ul class="categories">"#,
                r#"<li class="entry"><a class="link" href="/" data-router-link>Home</a></li>"#,
                r#"<li class="entry"><a class="link" href="https://example.com" target="_blank" rel="noopener noreferrer">Ext</a></li>"#,
                "</ul>"
            )
        );
    }

    #[test]
    fn test_navigation_empty_and_idempotent() {
        assert_eq!(navigation_html(&[]), r#"<ul class="categories"></ul>"#);

        let items = test_settings().navigation;
        assert_eq!(navigation_html(&items), navigation_html(&items));
    }

    #[test]
    fn test_navigation_escapes_labels() {
        let html = navigation_html(&[NavigationItem::new("<b>", "/a?x=1&y=2")]);
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains(r#"href="/a?x=1&amp;y=2""#));
    }

    #[test]
    fn test_suggestion_card() {
        let html = post_suggestion_html(&summary("hello-world", Some("Rust")));

        assert!(html.starts_with(r#"<a href="/hello-world/" class="transition-link""#));
        assert!(html.contains(r#"data-transition="cover""#));
        assert!(html.contains(r#"data-direction="up""#));
        assert!(html.contains(r#"data-duration="1""#));
        assert!(html.contains(r##"data-bg="#111111""##));
        assert!(html.contains(r#"<article class="next-article""#));
        assert!(
            html.contains(r#"data-sal="slide-up" data-sal-duration="800" data-sal-easing="ease""#)
        );
        assert!(html.contains("<span>Rust</span>"));
        assert!(html.contains(r#"<h1 class="title">Post hello-world</h1>"#));
        assert!(html.contains(CARD_GRADIENT));
    }

    #[test]
    fn test_suggestion_card_without_tag() {
        let html = post_suggestion_html(&summary("untagged", None));
        assert!(!html.contains("<span>"));
        assert!(html.contains(r#"<div class="content"><h1 class="title">"#));
    }

    #[test]
    fn test_generate_post() {
        let previous = summary("older", None);
        let html = generator()
            .generate_post(&test_post(), Some(&previous), None)
            .unwrap();

        assert!(html.contains("<title>Post hello-world | Short Tech</title>"));
        assert!(html.contains("<p>Hello</p>"));
        assert!(
            html.contains(r#"<link rel="canonical" href="https://shorttech.de/hello-world/">"#)
        );
        assert!(html.contains(r#"<a href="/older/" class="transition-link""#));
        assert!(html.contains(r#"<time datetime="2020-05-01">"#));
        assert!(html.contains(r#"<ul class="categories">"#));
    }

    #[test]
    fn test_generate_index() {
        let post = test_post();
        let html = generator().generate_index(&[&post]).unwrap();

        assert!(html.contains("<title>Short Tech</title>"));
        assert!(html.contains(r#"<a href="/hello-world/" data-router-link>"#));
        assert!(html.contains("Tech in short"));
    }

    #[test]
    fn test_generate_tag_and_author() {
        let post = test_post();
        let tag = post.summary.primary_tag.clone().unwrap();
        let html = generator().generate_tag(&tag, &[&post]).unwrap();
        assert!(html.contains(r#"href="https://shorttech.de/tag/rust/""#));

        let html = generator()
            .generate_author(&post.summary.primary_author, &[&post])
            .unwrap();
        assert!(html.contains("<title>Ada | Short Tech</title>"));
    }

    #[test]
    fn test_generate_page() {
        let page = Page {
            slug: "about".to_string(),
            title: "About".to_string(),
            html: "<p>About us</p>".to_string(),
            ..Default::default()
        };
        let html = generator().generate_page(&page).unwrap();
        assert!(html.contains("<p>About us</p>"));
        assert!(html.contains(r#"<h1 class="page-title">About</h1>"#));
    }

    #[test]
    fn test_chrome_from_pipeline() {
        let mut config = test_config();
        config.analytics = Some(ghostpress_core::config::AnalyticsConfig {
            tracking_url: "analytics.shorttech.de".to_string(),
            site_id: "FFBAU".to_string(),
        });
        let credentials = BuildCredentials::new("https://x.ghost.io", "k");
        let pipeline = Pipeline::assemble(&config, &credentials);
        let chrome = SiteChrome::from_pipeline(&pipeline);

        let head = &chrome.head_links;
        assert!(head.contains(r#"<link rel="manifest" href="/manifest.webmanifest">"#));
        assert!(head.contains(r#"<link rel="apple-touch-icon" href="/favicon.png">"#));
        assert!(head.contains(r#"href="/sitemap.xml""#));
        assert!(chrome.analytics.as_deref().unwrap().contains(r#"data-site="FFBAU""#));

        let generator = HtmlGenerator::new(config, test_settings(), chrome);
        let html = generator.generate_index(&[]).unwrap();
        assert!(html.contains("analytics.shorttech.de"));
        assert!(html.contains("threshold: 0.1"));
        assert!(html.contains(
            r#"<link rel="alternate" type="application/rss+xml" title="Short Tech" href="/rss/">"#
        ));
        assert!(html.contains(r#"navigator.serviceWorker.register("/sw.js")"#));
    }

    #[test]
    fn test_chrome_without_feed() {
        let mut config = test_config();
        config.rss.enabled = false;
        let credentials = BuildCredentials::new("https://x.ghost.io", "k");
        let pipeline = Pipeline::assemble(&config, &credentials);
        let chrome = SiteChrome::from_pipeline(&pipeline);
        assert!(chrome.feed_links.is_none());

        let html = HtmlGenerator::new(config, test_settings(), chrome)
            .generate_index(&[])
            .unwrap();
        assert!(!html.contains("application/rss+xml"));
    }

    #[test]
    fn test_internal_links_are_client_routed() {
        let html = generator().generate_index(&[]).unwrap();

        // Home is internal, Ext is external.
        assert!(html.contains(r#"<a class="link" href="/" data-router-link>Home</a>"#));
        assert!(html.contains(
            r#"<a class="link" href="https://example.com" target="_blank" rel="noopener noreferrer">Ext</a>"#
        ));
        assert_eq!(html.matches(r#"<a class="link""#).count(), 2);
        assert_eq!(html.matches(r#"<a class="link" href="/" data-router-link"#).count(), 1);

        // The base template script picks the marker up.
        assert!(html.contains(r#"closest("a[data-router-link], a.transition-link")"#));
        assert!(html.contains("history.pushState"));
    }

    #[test]
    fn test_generate_app_shell() {
        let html = generator()
            .generate_app_shell("/offline-plugin-app-shell-fallback/")
            .unwrap();
        assert!(html.contains("<title>Offline | Short Tech</title>"));
        assert!(html.contains(r#"<h1 class="page-title">You are offline</h1>"#));
        assert!(html.contains(r#"href="https://shorttech.de/offline-plugin-app-shell-fallback/""#));
    }

    #[test]
    fn test_output_path() {
        let out = Path::new("public");
        assert_eq!(generator().output_path("/", out), out.join("index.html"));
        assert_eq!(
            generator().output_path("/tag/rust/", out),
            out.join("tag/rust/index.html")
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }
}
