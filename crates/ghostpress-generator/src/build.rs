//! Build orchestration.
//!
//! Coordinates the full site build: fetch, validate, rewrite links, render,
//! then write feeds, sitemaps, the manifest, static assets and the service
//! worker.

use std::{
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    time::Instant,
};

use chrono::Utc;
use ghostpress_core::{Config, Post, SiteContent, ValidationReport, validate_content};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    assets::{AssetError, AssetProcessor},
    html::{HtmlError, HtmlGenerator, SiteChrome},
    links::{LinkError, LinkRewriter},
    manifest::{MANIFEST_FILE, ManifestError, WebManifest},
    offline::{OfflineError, ServiceWorker},
    pipeline::{NodeType, Pipeline},
    rss::{RssError, RssGenerator},
    sitemap::{SitemapError, SitemapGenerator},
    source::{ContentSource, SourceError},
};

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Content source error.
    #[error("content source error: {0}")]
    Source(#[from] SourceError),

    /// Content failed validation.
    #[error("content validation failed: {}", .0.errors.join("; "))]
    Validation(ValidationReport),

    /// Link rewriting error.
    #[error("link rewrite error: {0}")]
    Links(#[from] LinkError),

    /// HTML generation error.
    #[error("HTML error: {0}")]
    Html(#[from] HtmlError),

    /// RSS generation error.
    #[error("RSS error: {0}")]
    Rss(#[from] RssError),

    /// Sitemap generation error.
    #[error("sitemap error: {0}")]
    Sitemap(#[from] SitemapError),

    /// Manifest generation error.
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Asset error.
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),

    /// Service worker error.
    #[error("offline support error: {0}")]
    Offline(#[from] OfflineError),
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build statistics.
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    /// Number of post pages generated.
    pub posts: usize,

    /// Number of static pages generated.
    pub pages: usize,

    /// Number of tag and author archive pages generated.
    pub archives: usize,

    /// Number of feeds written.
    pub feeds: usize,

    /// Number of sitemap files written, index included.
    pub sitemaps: usize,

    /// Number of assets copied.
    pub assets: usize,

    /// Validation warnings that did not fail the build.
    pub warnings: usize,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

/// Site builder that orchestrates the build process.
#[derive(Debug)]
pub struct Builder {
    config: Config,
    pipeline: Pipeline,
    output_dir: PathBuf,
    static_dir: Option<PathBuf>,
    strict: bool,
}

impl Builder {
    /// Create a new builder.
    #[must_use]
    pub fn new(config: Config, pipeline: Pipeline, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            pipeline,
            output_dir: output_dir.into(),
            static_dir: None,
            strict: false,
        }
    }

    /// Set the static assets directory.
    #[must_use]
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    /// Treat validation warnings as errors.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Fetch content from `source` and build the site.
    pub fn build(&self, source: &dyn ContentSource) -> Result<BuildStats> {
        let content = source.fetch()?;
        self.build_content(content)
    }

    /// Build the site from already fetched content.
    pub fn build_content(&self, mut content: SiteContent) -> Result<BuildStats> {
        let start = Instant::now();
        let mut stats = BuildStats::default();

        info!(output = %self.output_dir.display(), "starting build");

        // 1. Validate
        stats.warnings = self.validate(&content)?;

        // 2. Rewrite CMS links
        self.rewrite_links(&mut content)?;

        if let Some(images) = self.pipeline.image_pipeline() {
            debug!(
                mozjpeg = images.use_mozjpeg,
                strip_metadata = images.strip_metadata,
                quality = images.default_quality,
                "image pipeline options"
            );
        }

        // 3. Clean output directory
        self.clean_output()?;

        // 4. Generate HTML
        let generator = HtmlGenerator::new(
            self.config.clone(),
            content.settings.clone(),
            SiteChrome::from_pipeline(&self.pipeline),
        );
        let posts = content.posts_by_date();

        self.write_html("/", &generator.generate_index(&posts)?, &generator)?;
        stats.posts = self.generate_posts(&generator, &posts)?;
        stats.pages = self.generate_pages(&generator, &content)?;
        stats.archives = self.generate_archives(&generator, &content)?;

        // 5. Feeds
        stats.feeds = self.generate_feeds(&posts)?;

        // 6. Sitemaps
        if let Some(options) = self.pipeline.sitemap() {
            let generator = SitemapGenerator::new(self.config.clone(), options.clone());
            stats.sitemaps = generator.write_all(&content, &self.output_dir)?.len();
            info!(count = stats.sitemaps, "generated sitemaps");
        }

        // 7. Manifest
        if let Some(options) = self.pipeline.manifest() {
            WebManifest::new(&content.settings, &self.config.site.title, options)
                .write(&self.output_dir)?;
        }

        // 8. Static assets
        let mut assets = AssetProcessor::new();
        if let Some(static_dir) = &self.static_dir {
            stats.assets = assets.process(static_dir, &self.output_dir)?;
        }

        // 9. Offline support
        self.generate_offline(&generator, assets.copied())?;

        stats.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            posts = stats.posts,
            pages = stats.pages,
            archives = stats.archives,
            feeds = stats.feeds,
            sitemaps = stats.sitemaps,
            assets = stats.assets,
            duration_ms = stats.duration_ms,
            "build complete"
        );

        Ok(stats)
    }

    /// Run the validation pass, returning the warning count.
    fn validate(&self, content: &SiteContent) -> Result<usize> {
        let report = validate_content(content);
        for warning in &report.warnings {
            warn!("{warning}");
        }

        if report.is_fatal(self.strict) {
            let mut report = report;
            if self.strict {
                let warnings = std::mem::take(&mut report.warnings);
                report.errors.extend(warnings);
            }
            return Err(BuildError::Validation(report));
        }

        Ok(report.warnings.len())
    }

    fn rewrite_links(&self, content: &mut SiteContent) -> Result<()> {
        let (Some(options), Some(source)) =
            (self.pipeline.link_rewrite(), self.pipeline.content_source())
        else {
            return Ok(());
        };

        let rewriter = LinkRewriter::new(&source.api_url, options.clone())?;
        for post in &mut content.posts {
            post.html = rewriter.rewrite(NodeType::Post, &post.html).into_owned();
        }
        for page in &mut content.pages {
            page.html = rewriter.rewrite(NodeType::Page, &page.html).into_owned();
        }
        Ok(())
    }

    /// Clean the output directory.
    fn clean_output(&self) -> Result<()> {
        if self.output_dir.exists() {
            debug!(dir = %self.output_dir.display(), "cleaning output directory");
            fs::remove_dir_all(&self.output_dir)?;
        }
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    fn write_html(&self, path: &str, html: &str, generator: &HtmlGenerator) -> Result<()> {
        let output_path = generator.output_path(path, &self.output_dir);
        write_file(&output_path, html)?;
        debug!(path = %output_path.display(), "wrote page");
        Ok(())
    }

    /// Generate post pages in parallel. `posts` is sorted newest first; each
    /// page suggests the next older and next newer post.
    fn generate_posts(&self, generator: &HtmlGenerator, posts: &[&Post]) -> Result<usize> {
        info!(count = posts.len(), "generating post pages");

        posts
            .par_iter()
            .enumerate()
            .map(|(i, post)| {
                let older = posts.get(i + 1).map(|p| &p.summary);
                let newer = i.checked_sub(1).and_then(|j| posts.get(j)).map(|p| &p.summary);
                let html = generator.generate_post(post, older, newer)?;
                self.write_html(&post.url(), &html, generator)
            })
            .collect::<Result<Vec<()>>>()
            .map(|written| written.len())
    }

    fn generate_pages(&self, generator: &HtmlGenerator, content: &SiteContent) -> Result<usize> {
        info!(count = content.pages.len(), "generating static pages");

        content
            .pages
            .par_iter()
            .map(|page| {
                let html = generator.generate_page(page)?;
                self.write_html(&page.url(), &html, generator)
            })
            .collect::<Result<Vec<()>>>()
            .map(|written| written.len())
    }

    /// Generate tag and author archive pages.
    fn generate_archives(&self, generator: &HtmlGenerator, content: &SiteContent) -> Result<usize> {
        let mut count = 0;

        for tag in &content.tags {
            let posts = content.posts_with_tag(&tag.slug);
            let html = generator.generate_tag(tag, &posts)?;
            self.write_html(&tag.url(), &html, generator)?;
            count += 1;
        }

        for author in &content.authors {
            let posts = content.posts_by_author(&author.slug);
            let html = generator.generate_author(author, &posts)?;
            self.write_html(&author.url(), &html, generator)?;
            count += 1;
        }

        debug!(count, "generated archive pages");
        Ok(count)
    }

    fn generate_feeds(&self, posts: &[&Post]) -> Result<usize> {
        let Some(options) = self.pipeline.feed() else {
            return Ok(0);
        };

        for feed in &options.feeds {
            let generator = RssGenerator::new(self.config.clone(), feed.clone());
            let output_path = generator.output_path(&self.output_dir);
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut writer = BufWriter::new(fs::File::create(&output_path)?);
            generator.write_to(posts, &mut writer)?;
            writer.flush()?;
            info!(path = %output_path.display(), "generated RSS feed");
        }

        Ok(options.feeds.len())
    }

    /// Write the app shell page and the service worker precaching it along
    /// with the manifest and `assets`.
    fn generate_offline(&self, generator: &HtmlGenerator, assets: &[PathBuf]) -> Result<()> {
        let Some(options) = self.pipeline.offline() else {
            return Ok(());
        };

        let shell = generator.generate_app_shell(&options.app_shell)?;
        self.write_html(&options.app_shell, &shell, generator)?;

        let worker = ServiceWorker::new(options.clone());
        let manifest = self.pipeline.manifest().map(|_| MANIFEST_FILE);
        let precache = worker.precache(manifest, assets);
        let version = Utc::now().format("%Y%m%d%H%M%S").to_string();
        let path = worker.write(&self.output_dir, &version, &precache)?;

        info!(path = %path.display(), precache = precache.len(), "generated service worker");
        Ok(())
    }
}

fn write_file(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}
