//! Content records as delivered by the CMS.
//!
//! Everything here is read-only input: records are produced by a content
//! source, checked by [`crate::validate`], and then only mapped to markup.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{CoreError, Result},
    navigation::NavigationItem,
};

/// Canonical path of a content item, always with a trailing slash.
#[must_use]
pub fn permalink(slug: &str) -> String {
    format!("/{}/", slug.trim_matches('/'))
}

/// A tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// Display name.
    pub name: String,

    #[serde(default)]
    pub slug: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub feature_image: Option<String>,
}

impl Tag {
    /// Tag archive URL.
    #[must_use]
    pub fn url(&self) -> String {
        format!("/tag/{}/", self.slug)
    }
}

/// A post or page author.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    /// Display name.
    pub name: String,

    #[serde(default)]
    pub slug: String,

    #[serde(default)]
    pub profile_image: Option<String>,

    #[serde(default)]
    pub cover_image: Option<String>,

    #[serde(default)]
    pub bio: Option<String>,
}

impl Author {
    /// Author archive URL.
    #[must_use]
    pub fn url(&self) -> String {
        format!("/author/{}/", self.slug)
    }
}

/// Responsive image variant produced by the image pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FluidImage {
    pub src: String,

    #[serde(default, rename = "srcSet")]
    pub src_set: String,

    #[serde(default = "default_aspect_ratio", rename = "aspectRatio")]
    pub aspect_ratio: f64,

    #[serde(default)]
    pub sizes: String,
}

fn default_aspect_ratio() -> f64 {
    1.5
}

/// Thumbnail rendition of a processed image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub fluid: FluidImage,
}

/// Processed-image descriptor. Opaque to rendering apart from the thumbnail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessedImage {
    pub thumbnail: Thumbnail,
}

impl ProcessedImage {
    /// Descriptor that serves the original image unchanged.
    #[must_use]
    pub fn passthrough(url: impl Into<String>) -> Self {
        let src = url.into();
        Self {
            thumbnail: Thumbnail {
                fluid: FluidImage {
                    src_set: format!("{src} 1x"),
                    src,
                    aspect_ratio: default_aspect_ratio(),
                    sizes: "(max-width: 800px) 100vw, 800px".to_string(),
                },
            },
        }
    }

    /// Thumbnail URL, `None` when the image pipeline produced nothing.
    #[must_use]
    pub fn thumbnail_src(&self) -> Option<&str> {
        let src = self.thumbnail.fluid.src.as_str();
        (!src.is_empty()).then_some(src)
    }
}

/// The fields needed to render a post preview.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,

    #[serde(default)]
    pub excerpt: String,

    /// Absent for untagged posts.
    #[serde(default)]
    pub primary_tag: Option<Tag>,

    pub primary_author: Author,

    #[serde(default, rename = "featureImageSharp")]
    pub feature_image_sharp: ProcessedImage,
}

impl PostSummary {
    /// `/<slug>/`.
    #[must_use]
    pub fn permalink(&self) -> String {
        permalink(&self.slug)
    }
}

/// A full post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(flatten)]
    pub summary: PostSummary,

    /// Rendered body.
    #[serde(default)]
    pub html: String,

    #[serde(default)]
    pub feature_image: Option<String>,

    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Post {
    #[must_use]
    pub fn slug(&self) -> &str {
        &self.summary.slug
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.summary.title
    }

    #[must_use]
    pub fn url(&self) -> String {
        self.summary.permalink()
    }

    /// Last modification, falling back to publication then creation.
    #[must_use]
    pub fn lastmod(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.published_at).or(self.created_at)
    }
}

/// A static page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub slug: String,
    pub title: String,

    #[serde(default)]
    pub html: String,

    #[serde(default)]
    pub feature_image: Option<String>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Page {
    #[must_use]
    pub fn url(&self) -> String {
        permalink(&self.slug)
    }

    #[must_use]
    pub fn lastmod(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }
}

/// CMS-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub logo: Option<String>,

    #[serde(default)]
    pub icon: Option<String>,

    #[serde(default)]
    pub cover_image: Option<String>,

    /// Primary navigation, in display order.
    #[serde(default)]
    pub navigation: Vec<NavigationItem>,
}

/// Everything a build renders, as fetched from the content source.
///
/// This is also the on-disk snapshot format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteContent {
    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub posts: Vec<Post>,

    #[serde(default)]
    pub pages: Vec<Page>,

    #[serde(default)]
    pub tags: Vec<Tag>,

    #[serde(default)]
    pub authors: Vec<Author>,
}

impl SiteContent {
    /// Decode a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON snapshot from disk.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::content(format!(
                "content snapshot not found: {}",
                path.display()
            )));
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write a JSON snapshot to disk, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Posts sorted newest first. Undated posts sort last.
    #[must_use]
    pub fn posts_by_date(&self) -> Vec<&Post> {
        let mut posts: Vec<_> = self.posts.iter().collect();
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        posts
    }

    /// Posts carrying the tag `slug`, newest first.
    #[must_use]
    pub fn posts_with_tag(&self, slug: &str) -> Vec<&Post> {
        self.posts_by_date()
            .into_iter()
            .filter(|post| post.tags.iter().any(|tag| tag.slug == slug))
            .collect()
    }

    /// Posts whose primary author is `slug`, newest first.
    #[must_use]
    pub fn posts_by_author(&self, slug: &str) -> Vec<&Post> {
        self.posts_by_date()
            .into_iter()
            .filter(|post| post.summary.primary_author.slug == slug)
            .collect()
    }
}
