//! Sitemap generation.
//!
//! One sitemap per mapped record type plus a `sitemap.xml` index pointing at
//! them. Feature images are listed with the image sitemap extension.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use ghostpress_core::{Config, SiteContent};
use thiserror::Error;
use tracing::debug;

use crate::pipeline::{NodeType, SitemapOptions};

/// Sitemap generation errors.
#[derive(Debug, Error)]
pub enum SitemapError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sitemap operations.
pub type Result<T> = std::result::Result<T, SitemapError>;

/// Name of the sitemap index file.
pub const SITEMAP_INDEX: &str = "sitemap.xml";

/// A sitemap URL entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapUrl {
    /// Site path, e.g. `/hello-world/`.
    pub path: String,

    /// Last modification date.
    pub lastmod: Option<DateTime<Utc>>,

    /// Absolute image URL.
    pub image: Option<String>,
}

impl SitemapUrl {
    fn new(path: String, lastmod: Option<DateTime<Utc>>, image: Option<&String>) -> Self {
        Self {
            path,
            lastmod,
            image: image.cloned(),
        }
    }
}

/// One generated sitemap file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapFile {
    /// File name in the output root, e.g. `sitemap-posts.xml`.
    pub file_name: String,
    pub xml: String,
}

/// Sitemap generator.
#[derive(Debug)]
pub struct SitemapGenerator {
    config: Config,
    options: SitemapOptions,
}

impl SitemapGenerator {
    /// Create a new sitemap generator.
    #[must_use]
    pub fn new(config: Config, options: SitemapOptions) -> Self {
        Self { config, options }
    }

    /// URLs of one record type, with exclusions removed.
    #[must_use]
    pub fn urls(&self, node_type: NodeType, content: &SiteContent) -> Vec<SitemapUrl> {
        let mut urls: Vec<SitemapUrl> = match node_type {
            NodeType::Post => content
                .posts_by_date()
                .into_iter()
                .map(|post| {
                    SitemapUrl::new(post.url(), post.lastmod(), post.feature_image.as_ref())
                })
                .collect(),
            NodeType::Page => content
                .pages
                .iter()
                .map(|page| {
                    SitemapUrl::new(page.url(), page.lastmod(), page.feature_image.as_ref())
                })
                .collect(),
            NodeType::Tag => content
                .tags
                .iter()
                .map(|tag| {
                    let lastmod = content
                        .posts_with_tag(&tag.slug)
                        .first()
                        .and_then(|post| post.lastmod());
                    SitemapUrl::new(tag.url(), lastmod, tag.feature_image.as_ref())
                })
                .collect(),
            NodeType::Author => content
                .authors
                .iter()
                .map(|author| {
                    let lastmod = content
                        .posts_by_author(&author.slug)
                        .first()
                        .and_then(|post| post.lastmod());
                    SitemapUrl::new(author.url(), lastmod, author.profile_image.as_ref())
                })
                .collect(),
            NodeType::Settings => Vec::new(),
        };

        if node_type == NodeType::Page && self.options.add_uncaught_pages {
            let newest = content.posts_by_date().first().and_then(|post| post.lastmod());
            urls.insert(0, SitemapUrl::new("/".to_string(), newest, None));
        }

        urls.retain(|url| !self.options.is_excluded(&url.path));
        urls
    }

    /// Generate every mapped sitemap followed by the index.
    #[must_use]
    pub fn generate(&self, content: &SiteContent) -> Vec<SitemapFile> {
        let mut files: Vec<SitemapFile> = self
            .options
            .mapping
            .iter()
            .map(|mapping| {
                let urls = self.urls(mapping.source, content);
                debug!(sitemap = mapping.sitemap, count = urls.len(), "generating sitemap");
                SitemapFile {
                    file_name: format!("sitemap-{}.xml", mapping.sitemap),
                    xml: self.generate_urlset(&urls),
                }
            })
            .collect();

        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        let index = self.generate_index(&names);
        files.push(SitemapFile {
            file_name: SITEMAP_INDEX.to_string(),
            xml: index,
        });
        files
    }

    /// Generate one `<urlset>` document.
    #[must_use]
    pub fn generate_urlset(&self, urls: &[SitemapUrl]) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(
            r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" xmlns:image="http://www.google.com/schemas/sitemap-image/1.1">"#,
        );
        xml.push('\n');

        for url in urls {
            xml.push_str(&self.url_to_xml(url));
        }

        xml.push_str("</urlset>\n");
        xml
    }

    fn url_to_xml(&self, url: &SitemapUrl) -> String {
        let mut xml = String::from("  <url>\n");

        xml.push_str(&format!(
            "    <loc>{}</loc>\n",
            escape_xml(&self.config.url_for(&url.path))
        ));

        if let Some(lastmod) = &url.lastmod {
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod.to_rfc3339()));
        }

        if let Some(image) = &url.image {
            xml.push_str("    <image:image>\n");
            xml.push_str(&format!("      <image:loc>{}</image:loc>\n", escape_xml(image)));
            xml.push_str("    </image:image>\n");
        }

        xml.push_str("  </url>\n");
        xml
    }

    /// Generate sitemap index for multiple sitemaps.
    #[must_use]
    pub fn generate_index(&self, sitemaps: &[&str]) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
        xml.push('\n');

        let now = Utc::now().format("%Y-%m-%d").to_string();

        for sitemap in sitemaps {
            xml.push_str("  <sitemap>\n");
            xml.push_str(&format!(
                "    <loc>{}</loc>\n",
                escape_xml(&self.config.url_for(sitemap))
            ));
            xml.push_str(&format!("    <lastmod>{now}</lastmod>\n"));
            xml.push_str("  </sitemap>\n");
        }

        xml.push_str("</sitemapindex>\n");
        xml
    }

    /// Write every sitemap into `output_dir`, returning the written paths.
    pub fn write_all(&self, content: &SiteContent, output_dir: &Path) -> Result<Vec<PathBuf>> {
        self.generate(content)
            .into_iter()
            .map(|file| {
                let path = output_dir.join(&file.file_name);
                let mut out = std::fs::File::create(&path)?;
                out.write_all(file.xml.as_bytes())?;
                Ok(path)
            })
            .collect()
    }
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
