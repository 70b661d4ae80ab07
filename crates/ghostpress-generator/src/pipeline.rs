//! Build pipeline assembly.
//!
//! The pipeline is the ordered list of build steps and their options. It is
//! assembled once from the site configuration and the resolved CMS
//! credentials, then handed to the content source and the output generators.

use ghostpress_core::{BuildCredentials, Config};
use tracing::debug;

/// Kind of CMS record a step applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Author,
    Tag,
    Post,
    Page,
    Settings,
}

/// Content source options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSourceOptions {
    pub api_url: String,
    pub content_api_key: String,
    pub cache_response: bool,
    pub cache_path: String,
    pub verbose: bool,
    pub severity: String,
}

/// Image fields processed for one node type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLookup {
    pub node_type: NodeType,
    pub img_tags: Vec<&'static str>,
}

/// Which CMS images get a processed descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GhostImagesOptions {
    pub lookup: Vec<ImageLookup>,
    pub verbose: bool,
    pub disable: bool,
}

impl GhostImagesOptions {
    /// Whether `field` of a `node_type` record is processed.
    ///
    /// Records without a CMS id are never processed.
    #[must_use]
    pub fn processes(&self, node_type: NodeType, field: &str, cms_id: Option<&str>) -> bool {
        if self.disable || cms_id.is_none() {
            return false;
        }
        self.lookup
            .iter()
            .any(|l| l.node_type == node_type && l.img_tags.contains(&field))
    }
}

/// Image encoder options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePipelineOptions {
    pub use_mozjpeg: bool,
    pub strip_metadata: bool,
    pub default_quality: u8,
}

/// Link rewriting applies to records accepted by this filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRewriteOptions {
    pub node_types: Vec<NodeType>,
}

impl LinkRewriteOptions {
    #[must_use]
    pub fn accepts(&self, node_type: NodeType) -> bool {
        self.node_types.contains(&node_type)
    }
}

/// Web app manifest options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestOptions {
    pub short_name: String,
    pub start_url: String,
    pub background_color: String,
    pub theme_color: String,
    pub display: String,
    /// Path of the icon inside the project, e.g. `static/favicon.png`.
    pub icon: String,
    /// Also emit an apple-touch-icon link.
    pub legacy: bool,
}

/// One generated feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedDefinition {
    /// Site path of the feed, with trailing slash.
    pub output: String,
    pub title: String,
    pub limit: usize,
}

/// Feed options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedOptions {
    pub feeds: Vec<FeedDefinition>,
}

/// Maps a record type to its sitemap name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapMapping {
    pub source: NodeType,
    pub sitemap: &'static str,
}

/// Sitemap options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapOptions {
    pub mapping: Vec<SitemapMapping>,
    pub exclude: Vec<String>,
    pub create_link_in_head: bool,
    pub add_uncaught_pages: bool,
}

impl SitemapOptions {
    /// Whether `path` is excluded. Trailing slashes are ignored.
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        let path = path.trim_end_matches('/');
        self.exclude
            .iter()
            .any(|excluded| excluded.trim_end_matches('/') == path)
    }

}

/// Offline support: a service worker that precaches the site shell and
/// serves the app shell page for pages that were never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfflineOptions {
    /// Site path of the app shell page.
    pub app_shell: String,
    /// Prefix of the service worker cache name.
    pub cache_prefix: String,
}

/// Scroll reveal options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRevealOptions {
    pub threshold: f32,
    pub once: bool,
}

impl Default for ScrollRevealOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            once: true,
        }
    }
}

/// Fathom analytics options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsOptions {
    pub tracking_url: String,
    pub site_id: String,
}

/// A configured build step.
#[derive(Debug, Clone, PartialEq)]
pub enum Plugin {
    Analytics(AnalyticsOptions),
    ScrollReveal(ScrollRevealOptions),
    ContentSource(ContentSourceOptions),
    GhostImages(GhostImagesOptions),
    ImagePipeline(ImagePipelineOptions),
    LinkRewrite(LinkRewriteOptions),
    Manifest(ManifestOptions),
    Feed(FeedOptions),
    Sitemap(SitemapOptions),
    Offline(OfflineOptions),
}

impl Plugin {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Analytics(_) => "analytics",
            Self::ScrollReveal(_) => "scroll-reveal",
            Self::ContentSource(_) => "content-source",
            Self::GhostImages(_) => "ghost-images",
            Self::ImagePipeline(_) => "image-pipeline",
            Self::LinkRewrite(_) => "link-rewrite",
            Self::Manifest(_) => "manifest",
            Self::Feed(_) => "feed",
            Self::Sitemap(_) => "sitemap",
            Self::Offline(_) => "offline",
        }
    }
}

/// The ordered build steps.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    plugins: Vec<Plugin>,
}

impl Pipeline {
    /// Assemble the pipeline for validated credentials.
    #[must_use]
    pub fn assemble(config: &Config, credentials: &BuildCredentials) -> Self {
        let mut plugins = Vec::new();

        if let Some(analytics) = &config.analytics {
            plugins.push(Plugin::Analytics(AnalyticsOptions {
                tracking_url: analytics.tracking_url.clone(),
                site_id: analytics.site_id.clone(),
            }));
        }

        plugins.push(Plugin::ScrollReveal(ScrollRevealOptions::default()));

        plugins.push(Plugin::GhostImages(GhostImagesOptions {
            lookup: vec![
                ImageLookup {
                    node_type: NodeType::Author,
                    img_tags: vec!["cover_image", "profile_image"],
                },
                ImageLookup {
                    node_type: NodeType::Tag,
                    img_tags: vec!["feature_image"],
                },
                ImageLookup {
                    node_type: NodeType::Post,
                    img_tags: vec!["feature_image"],
                },
                ImageLookup {
                    node_type: NodeType::Page,
                    img_tags: vec!["feature_image"],
                },
                ImageLookup {
                    node_type: NodeType::Settings,
                    img_tags: vec!["logo", "icon", "cover_image"],
                },
            ],
            verbose: true,
            disable: false,
        }));

        plugins.push(Plugin::ImagePipeline(ImagePipelineOptions {
            use_mozjpeg: config.images.use_mozjpeg,
            strip_metadata: config.images.strip_metadata,
            default_quality: config.images.default_quality,
        }));

        plugins.push(Plugin::ContentSource(ContentSourceOptions {
            api_url: credentials.api_url.clone(),
            content_api_key: credentials.content_api_key.clone(),
            cache_response: config.source.cache_response,
            cache_path: config.source.cache_path.clone(),
            verbose: config.source.verbose,
            severity: config.source.severity.clone(),
        }));

        plugins.push(Plugin::LinkRewrite(LinkRewriteOptions {
            node_types: vec![NodeType::Post, NodeType::Page],
        }));

        plugins.push(Plugin::Manifest(ManifestOptions {
            short_name: config.short_title().to_string(),
            start_url: "/".to_string(),
            background_color: config.site.background_color.clone(),
            theme_color: config.site.theme_color.clone(),
            display: "standalone".to_string(),
            icon: format!("{}/{}", config.build.static_dir, config.site.site_icon),
            legacy: true,
        }));

        if config.rss.enabled {
            plugins.push(Plugin::Feed(FeedOptions {
                feeds: vec![FeedDefinition {
                    output: "/rss/".to_string(),
                    title: config.site.title.clone(),
                    limit: config.rss.limit,
                }],
            }));
        }

        plugins.push(Plugin::Sitemap(SitemapOptions {
            mapping: vec![
                SitemapMapping {
                    source: NodeType::Post,
                    sitemap: "posts",
                },
                SitemapMapping {
                    source: NodeType::Tag,
                    sitemap: "tags",
                },
                SitemapMapping {
                    source: NodeType::Author,
                    sitemap: "authors",
                },
                SitemapMapping {
                    source: NodeType::Page,
                    sitemap: "pages",
                },
            ],
            exclude: config.sitemap.exclude.clone(),
            create_link_in_head: config.sitemap.create_link_in_head,
            add_uncaught_pages: config.sitemap.add_uncaught_pages,
        }));

        // Runs last so that it can precache every generated file.
        plugins.push(Plugin::Offline(OfflineOptions {
            app_shell: "/offline-plugin-app-shell-fallback/".to_string(),
            cache_prefix: "ghostpress".to_string(),
        }));

        let pipeline = Self { plugins };
        debug!(plugins = ?pipeline.names(), "assembled pipeline");
        pipeline
    }

    #[must_use]
    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    /// Step names in execution order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(Plugin::name).collect()
    }

    #[must_use]
    pub fn content_source(&self) -> Option<&ContentSourceOptions> {
        self.plugins.iter().find_map(|p| match p {
            Plugin::ContentSource(o) => Some(o),
            _ => None,
        })
    }

    #[must_use]
    pub fn ghost_images(&self) -> Option<&GhostImagesOptions> {
        self.plugins.iter().find_map(|p| match p {
            Plugin::GhostImages(o) => Some(o),
            _ => None,
        })
    }

    #[must_use]
    pub fn image_pipeline(&self) -> Option<&ImagePipelineOptions> {
        self.plugins.iter().find_map(|p| match p {
            Plugin::ImagePipeline(o) => Some(o),
            _ => None,
        })
    }

    #[must_use]
    pub fn link_rewrite(&self) -> Option<&LinkRewriteOptions> {
        self.plugins.iter().find_map(|p| match p {
            Plugin::LinkRewrite(o) => Some(o),
            _ => None,
        })
    }

    #[must_use]
    pub fn manifest(&self) -> Option<&ManifestOptions> {
        self.plugins.iter().find_map(|p| match p {
            Plugin::Manifest(o) => Some(o),
            _ => None,
        })
    }

    #[must_use]
    pub fn feed(&self) -> Option<&FeedOptions> {
        self.plugins.iter().find_map(|p| match p {
            Plugin::Feed(o) => Some(o),
            _ => None,
        })
    }

    #[must_use]
    pub fn sitemap(&self) -> Option<&SitemapOptions> {
        self.plugins.iter().find_map(|p| match p {
            Plugin::Sitemap(o) => Some(o),
            _ => None,
        })
    }

    #[must_use]
    pub fn offline(&self) -> Option<&OfflineOptions> {
        self.plugins.iter().find_map(|p| match p {
            Plugin::Offline(o) => Some(o),
            _ => None,
        })
    }

    #[must_use]
    pub fn scroll_reveal(&self) -> Option<&ScrollRevealOptions> {
        self.plugins.iter().find_map(|p| match p {
            Plugin::ScrollReveal(o) => Some(o),
            _ => None,
        })
    }

    #[must_use]
    pub fn analytics(&self) -> Option<&AnalyticsOptions> {
        self.plugins.iter().find_map(|p| match p {
            Plugin::Analytics(o) => Some(o),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use ghostpress_core::config::AnalyticsConfig;

    use super::*;

    fn credentials() -> BuildCredentials {
        BuildCredentials::new("https://x.ghost.io", "22444f78447824223cefc48062")
    }

    #[test]
    fn test_pipeline_order() {
        let config = Config::new("Short Tech", "https://shorttech.de");
        let pipeline = Pipeline::assemble(&config, &credentials());

        assert_eq!(
            pipeline.names(),
            vec![
                "scroll-reveal",
                "ghost-images",
                "image-pipeline",
                "content-source",
                "link-rewrite",
                "manifest",
                "feed",
                "sitemap",
                "offline",
            ]
        );
    }

    #[test]
    fn test_content_source_uses_credentials() {
        let mut config = Config::new("Short Tech", "https://shorttech.de");
        config.source.verbose = true;
        let pipeline = Pipeline::assemble(&config, &credentials());

        let source = pipeline.content_source().unwrap();
        assert_eq!(source.api_url, "https://x.ghost.io");
        assert_eq!(source.content_api_key, "22444f78447824223cefc48062");
        assert!(source.cache_response);
        assert!(source.verbose);
        assert_eq!(source.severity, "info");
    }

    #[test]
    fn test_image_options() {
        let config = Config::new("Short Tech", "https://shorttech.de");
        let pipeline = Pipeline::assemble(&config, &credentials());

        let encoder = pipeline.image_pipeline().unwrap();
        assert!(encoder.use_mozjpeg);
        assert!(encoder.strip_metadata);
        assert_eq!(encoder.default_quality, 80);

        let images = pipeline.ghost_images().unwrap();
        assert!(images.processes(NodeType::Post, "feature_image", Some("1")));
        assert!(images.processes(NodeType::Settings, "logo", Some("1")));
        assert!(!images.processes(NodeType::Post, "feature_image", None));
        assert!(!images.processes(NodeType::Post, "logo", Some("1")));
    }

    #[test]
    fn test_link_rewrite_filter() {
        let config = Config::new("Short Tech", "https://shorttech.de");
        let pipeline = Pipeline::assemble(&config, &credentials());

        let rewrite = pipeline.link_rewrite().unwrap();
        assert!(rewrite.accepts(NodeType::Post));
        assert!(rewrite.accepts(NodeType::Page));
        assert!(!rewrite.accepts(NodeType::Tag));
        assert!(!rewrite.accepts(NodeType::Settings));
    }

    #[test]
    fn test_manifest_options() {
        let mut config = Config::new("Short Tech", "https://shorttech.de");
        config.site.short_title = Some("ST".to_string());
        let pipeline = Pipeline::assemble(&config, &credentials());

        let manifest = pipeline.manifest().unwrap();
        assert_eq!(manifest.short_name, "ST");
        assert_eq!(manifest.start_url, "/");
        assert_eq!(manifest.display, "standalone");
        assert_eq!(manifest.icon, "static/favicon.png");
        assert!(manifest.legacy);
    }

    #[test]
    fn test_sitemap_options() {
        let config = Config::new("Short Tech", "https://shorttech.de");
        let pipeline = Pipeline::assemble(&config, &credentials());

        let sitemap = pipeline.sitemap().unwrap();
        let names: Vec<_> = sitemap.mapping.iter().map(|m| (m.source, m.sitemap)).collect();
        assert_eq!(
            names,
            vec![
                (NodeType::Post, "posts"),
                (NodeType::Tag, "tags"),
                (NodeType::Author, "authors"),
                (NodeType::Page, "pages"),
            ]
        );
        assert!(sitemap.is_excluded("/404/"));
        assert!(sitemap.is_excluded("/dev-404-page"));
        assert!(!sitemap.is_excluded("/hello-world/"));

        let offline = pipeline.offline().unwrap();
        assert!(sitemap.is_excluded(&offline.app_shell));
    }

    #[test]
    fn test_optional_steps() {
        let mut config = Config::new("Short Tech", "https://shorttech.de");
        config.rss.enabled = false;
        config.analytics = Some(AnalyticsConfig {
            tracking_url: "analytics.shorttech.de".to_string(),
            site_id: "FFBAU".to_string(),
        });
        let pipeline = Pipeline::assemble(&config, &credentials());

        assert!(pipeline.feed().is_none());
        assert_eq!(pipeline.names()[0], "analytics");
        assert_eq!(pipeline.analytics().unwrap().site_id, "FFBAU");
        assert_eq!(pipeline.scroll_reveal().unwrap().threshold, 0.1);
    }
}
