//! Site configuration management.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Main configuration structure for ghostpress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,

    /// Build settings.
    #[serde(default)]
    pub build: BuildConfig,

    /// Content source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Image processing settings.
    #[serde(default)]
    pub images: ImageConfig,

    /// RSS feed settings.
    #[serde(default)]
    pub rss: RssConfig,

    /// Sitemap settings.
    #[serde(default)]
    pub sitemap: SitemapConfig,

    /// Fathom analytics, disabled when absent.
    #[serde(default)]
    pub analytics: Option<AnalyticsConfig>,
}

/// Site-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site title, used when the CMS settings carry none.
    pub title: String,

    /// Public URL of the generated site (e.g., "https://example.com").
    pub site_url: String,

    /// Short title for the web app manifest.
    #[serde(default)]
    pub short_title: Option<String>,

    /// Site description for meta tags.
    #[serde(default)]
    pub description: Option<String>,

    /// Icon file name inside the static directory.
    #[serde(default = "default_site_icon")]
    pub site_icon: String,

    /// Manifest background colour.
    #[serde(default = "default_background_color")]
    pub background_color: String,

    /// Manifest theme colour.
    #[serde(default = "default_theme_color")]
    pub theme_color: String,

    /// Language code.
    #[serde(default = "default_language")]
    pub language: String,
}

/// Build configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Output directory for generated site.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Static asset directory copied verbatim into the output.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

/// Content source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Keep the fetched content as an offline snapshot.
    #[serde(default = "default_true")]
    pub cache_response: bool,

    /// Where the snapshot is written.
    #[serde(default = "default_cache_path")]
    pub cache_path: String,

    /// Log every fetched resource.
    #[serde(default)]
    pub verbose: bool,

    /// Minimum severity reported by the source.
    #[serde(default = "default_severity")]
    pub severity: String,
}

/// Image processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default = "default_true")]
    pub use_mozjpeg: bool,

    #[serde(default = "default_true")]
    pub strip_metadata: bool,

    /// Default quality (0-100).
    #[serde(default = "default_quality")]
    pub default_quality: u8,
}

/// RSS feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RssConfig {
    /// Whether RSS feed is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum number of items in feed.
    #[serde(default = "default_rss_limit")]
    pub limit: usize,
}

/// Sitemap configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitemapConfig {
    /// Paths never listed in any sitemap.
    #[serde(default = "default_sitemap_exclude")]
    pub exclude: Vec<String>,

    /// Emit a `<link rel="sitemap">` in every page head.
    #[serde(default = "default_true")]
    pub create_link_in_head: bool,

    /// List generated pages that belong to no content type.
    #[serde(default = "default_true")]
    pub add_uncaught_pages: bool,
}

/// Fathom analytics configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Host serving the tracker script.
    pub tracking_url: String,

    /// Site identifier.
    pub site_id: String,
}

// Default value functions
fn default_site_icon() -> String {
    "favicon.png".to_string()
}

fn default_background_color() -> String {
    "#e9e9e9".to_string()
}

fn default_theme_color() -> String {
    "#15171A".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_output_dir() -> String {
    "public".to_string()
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_cache_path() -> String {
    ".cache/content.json".to_string()
}

fn default_severity() -> String {
    "info".to_string()
}

fn default_quality() -> u8 {
    80
}

fn default_true() -> bool {
    true
}

fn default_rss_limit() -> usize {
    20
}

fn default_sitemap_exclude() -> Vec<String> {
    vec![
        "/dev-404-page".to_string(),
        "/404".to_string(),
        "/404.html".to_string(),
        "/offline-plugin-app-shell-fallback".to_string(),
    ]
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            cache_response: true,
            cache_path: default_cache_path(),
            verbose: false,
            severity: default_severity(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            use_mozjpeg: true,
            strip_metadata: true,
            default_quality: default_quality(),
        }
    }
}

impl Default for RssConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            limit: default_rss_limit(),
        }
    }
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            exclude: default_sitemap_exclude(),
            create_link_in_head: true,
            add_uncaught_pages: true,
        }
    }
}

impl Config {
    /// Create a configuration with defaults for everything but the site identity.
    pub fn new(title: impl Into<String>, site_url: impl Into<String>) -> Self {
        Self {
            site: SiteConfig {
                title: title.into(),
                site_url: site_url.into(),
                short_title: None,
                description: None,
                site_icon: default_site_icon(),
                background_color: default_background_color(),
                theme_color: default_theme_color(),
                language: default_language(),
            },
            build: BuildConfig::default(),
            source: SourceConfig::default(),
            images: ImageConfig::default(),
            rss: RssConfig::default(),
            sitemap: SitemapConfig::default(),
            analytics: None,
        }
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration layered with `GHOSTPRESS__` environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("GHOSTPRESS").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.site.title.is_empty() {
            return Err(CoreError::config("site.title cannot be empty"));
        }

        if self.site.site_url.is_empty() {
            return Err(CoreError::config("site.site_url cannot be empty"));
        }

        if self.images.default_quality > 100 {
            return Err(CoreError::config(
                "images.default_quality must be between 0 and 100",
            ));
        }

        if self.site.site_url.ends_with('/') {
            tracing::warn!("site.site_url should not have a trailing slash");
        }

        Ok(())
    }

    /// Site URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.site.site_url.trim_end_matches('/')
    }

    /// Get the full URL for a path.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{path}", self.base_url())
    }

    /// Short title for the manifest, falling back to the title.
    #[must_use]
    pub fn short_title(&self) -> &str {
        self.site.short_title.as_deref().unwrap_or(&self.site.title)
    }
}
