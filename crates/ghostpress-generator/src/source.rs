//! Content sourcing.
//!
//! A [`ContentSource`] yields the complete [`SiteContent`] a build renders.
//! [`GhostApiSource`] reads the Ghost Content API; [`SnapshotSource`] reads a
//! JSON snapshot, such as the one the API source caches after a fetch.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::{DateTime, Utc};
use ghostpress_core::{
    Author, CoreError, Page, Post, PostSummary, ProcessedImage, Settings, SiteContent, Tag,
};
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, info};

use crate::pipeline::{ContentSourceOptions, GhostImagesOptions, NodeType};

const API_VERSION: &str = "v5.0";
const PAGE_SIZE: u32 = 100;

/// Content source errors.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response.
    #[error("content API returned {status} for {resource}")]
    Api { status: u16, resource: String },

    /// Snapshot decoding or caching error.
    #[error("content error: {0}")]
    Core(#[from] CoreError),
}

/// Result type for content sourcing.
pub type Result<T> = std::result::Result<T, SourceError>;

/// Something that can produce the site's content.
pub trait ContentSource {
    fn fetch(&self) -> Result<SiteContent>;
}

/// Reads a JSON snapshot from disk.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    path: PathBuf,
}

impl SnapshotSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ContentSource for SnapshotSource {
    fn fetch(&self) -> Result<SiteContent> {
        let content = SiteContent::load(&self.path)?;
        info!(
            path = %self.path.display(),
            posts = content.posts.len(),
            pages = content.pages.len(),
            "loaded content snapshot"
        );
        Ok(content)
    }
}

/// Ghost Content API client.
#[derive(Debug)]
pub struct GhostApiSource {
    options: ContentSourceOptions,
    images: GhostImagesOptions,
    client: reqwest::blocking::Client,
}

impl GhostApiSource {
    /// Create a client for validated source options.
    pub fn new(options: ContentSourceOptions, images: GhostImagesOptions) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            options,
            images,
            client,
        })
    }

    fn endpoint(&self, resource: &str) -> String {
        format!(
            "{}/ghost/api/content/{resource}/",
            self.options.api_url.trim_end_matches('/')
        )
    }

    fn get<T: DeserializeOwned>(&self, resource: &str, query: &[(&str, String)]) -> Result<T> {
        let response = self
            .client
            .get(self.endpoint(resource))
            .header("Accept-Version", API_VERSION)
            .query(&[("key", self.options.content_api_key.as_str())])
            .query(query)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Api {
                status: status.as_u16(),
                resource: resource.to_string(),
            });
        }

        Ok(response.json()?)
    }

    /// Fetch every record of a paginated resource.
    fn get_all<T: DeserializeOwned>(
        &self,
        resource: &str,
        include: Option<&str>,
    ) -> Result<Vec<T>> {
        let mut records = Vec::new();
        let mut page = Some(1);

        while let Some(current) = page {
            let mut query = vec![
                ("limit", PAGE_SIZE.to_string()),
                ("page", current.to_string()),
            ];
            if let Some(include) = include {
                query.push(("include", include.to_string()));
            }

            let batch: Browse<T> = self.get(resource, &query)?;
            if self.options.verbose {
                info!(resource, page = current, count = batch.items.len(), "fetched");
            }
            records.extend(batch.items);
            page = batch.meta.pagination.next;
        }

        debug!(resource, total = records.len(), "fetched all records");
        Ok(records)
    }

    fn image(
        &self,
        node_type: NodeType,
        field: &str,
        id: Option<&str>,
        url: Option<&str>,
    ) -> ProcessedImage {
        match url {
            Some(url) if self.images.processes(node_type, field, id) => {
                ProcessedImage::passthrough(url)
            }
            _ => ProcessedImage::default(),
        }
    }
}

impl ContentSource for GhostApiSource {
    fn fetch(&self) -> Result<SiteContent> {
        info!(
            api_url = %self.options.api_url,
            severity = %self.options.severity,
            "fetching content from CMS"
        );

        let settings: SettingsResponse = self.get("settings", &[])?;
        let posts: Vec<ApiPost> = self.get_all("posts", Some("tags,authors"))?;
        let pages: Vec<ApiPage> = self.get_all("pages", None)?;
        let tags: Vec<Tag> = self.get_all("tags", None)?;
        let authors: Vec<Author> = self.get_all("authors", None)?;

        let posts = posts
            .into_iter()
            .map(|post| {
                let image = self.image(
                    NodeType::Post,
                    "feature_image",
                    post.id.as_deref(),
                    post.feature_image.as_deref(),
                );
                post.into_post(image)
            })
            .collect();

        let content = SiteContent {
            settings: settings.settings,
            posts,
            pages: pages.into_iter().map(ApiPage::into_page).collect(),
            tags,
            authors,
        };

        info!(
            posts = content.posts.len(),
            pages = content.pages.len(),
            tags = content.tags.len(),
            authors = content.authors.len(),
            "fetched content"
        );

        if self.options.cache_response {
            let path = Path::new(&self.options.cache_path);
            content.save(path)?;
            debug!(path = %path.display(), "cached content snapshot");
        }

        Ok(content)
    }
}

/// Browse response: one resource array plus pagination metadata.
#[derive(Debug, Deserialize)]
struct Browse<T> {
    #[serde(alias = "posts", alias = "pages", alias = "tags", alias = "authors")]
    items: Vec<T>,
    meta: Meta,
}

#[derive(Debug, Deserialize)]
struct Meta {
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    #[serde(default)]
    next: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct SettingsResponse {
    settings: Settings,
}

#[derive(Debug, Deserialize)]
struct ApiPost {
    #[serde(default)]
    id: Option<String>,
    slug: String,
    title: String,
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    excerpt: Option<String>,
    #[serde(default)]
    custom_excerpt: Option<String>,
    #[serde(default)]
    feature_image: Option<String>,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    tags: Vec<Tag>,
    #[serde(default)]
    primary_tag: Option<Tag>,
    #[serde(default)]
    primary_author: Option<Author>,
}

impl ApiPost {
    fn into_post(self, feature_image_sharp: ProcessedImage) -> Post {
        Post {
            summary: PostSummary {
                slug: self.slug,
                title: self.title,
                excerpt: self.custom_excerpt.or(self.excerpt).unwrap_or_default(),
                primary_tag: self.primary_tag,
                primary_author: self.primary_author.unwrap_or_default(),
                feature_image_sharp,
            },
            html: self.html.unwrap_or_default(),
            feature_image: self.feature_image,
            published_at: self.published_at,
            updated_at: self.updated_at,
            created_at: self.created_at,
            tags: self.tags,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiPage {
    slug: String,
    title: String,
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    feature_image: Option<String>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl ApiPage {
    fn into_page(self) -> Page {
        Page {
            slug: self.slug,
            title: self.title,
            html: self.html.unwrap_or_default(),
            feature_image: self.feature_image,
            updated_at: self.updated_at,
            created_at: self.created_at,
        }
    }
}
