//! RSS feed generation.
//!
//! Generates RSS 2.0 feeds for site content.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Utc;
use ghostpress_core::{Config, Post};
use rss::{ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use thiserror::Error;
use tracing::debug;

use crate::pipeline::FeedDefinition;

/// RSS generation errors.
#[derive(Debug, Error)]
pub enum RssError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for RSS operations.
pub type Result<T> = std::result::Result<T, RssError>;

/// RSS feed generator for one feed definition.
#[derive(Debug)]
pub struct RssGenerator {
    config: Config,
    feed: FeedDefinition,
}

impl RssGenerator {
    /// Create a new RSS generator.
    #[must_use]
    pub fn new(config: Config, feed: FeedDefinition) -> Self {
        Self { config, feed }
    }

    /// Generate RSS feed XML from posts sorted newest first.
    pub fn generate(&self, posts: &[&Post]) -> Result<String> {
        let limit = self.feed.limit;
        let items: Vec<Item> = posts
            .iter()
            .take(limit)
            .map(|post| self.post_to_item(post))
            .collect();

        debug!(count = items.len(), limit, feed = %self.feed.output, "generating RSS feed");

        let channel = ChannelBuilder::default()
            .title(&self.feed.title)
            .link(self.config.url_for("/"))
            .description(
                self.config
                    .site
                    .description
                    .as_deref()
                    .unwrap_or(&self.feed.title),
            )
            .language(Some(self.config.site.language.clone()))
            .last_build_date(Some(Utc::now().to_rfc2822()))
            .generator(Some("ghostpress".to_string()))
            .items(items)
            .build();

        Ok(channel.to_string())
    }

    fn post_to_item(&self, post: &Post) -> Item {
        let url = self.config.url_for(&post.url());
        let guid = GuidBuilder::default().value(&url).permalink(true).build();

        let mut builder = ItemBuilder::default();
        builder.title(Some(post.title().to_string()));
        builder.link(Some(url));
        builder.guid(Some(guid));

        if let Some(date) = post.published_at {
            builder.pub_date(Some(date.to_rfc2822()));
        }

        if !post.summary.excerpt.is_empty() {
            builder.description(Some(post.summary.excerpt.clone()));
        }

        if !post.html.is_empty() {
            builder.content(Some(post.html.clone()));
        }

        if !post.summary.primary_author.name.is_empty() {
            builder.author(Some(post.summary.primary_author.name.clone()));
        }

        let categories: Vec<_> = post
            .tags
            .iter()
            .map(|tag| rss::Category {
                name: tag.name.clone(),
                domain: None,
            })
            .collect();

        if !categories.is_empty() {
            builder.categories(categories);
        }

        builder.build()
    }

    /// Output file of the feed: `/rss/` becomes `<out>/rss/index.xml`.
    #[must_use]
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        let relative = self.feed.output.trim_matches('/');
        if relative.is_empty() {
            output_dir.join("index.xml")
        } else if Path::new(relative).extension().is_some() {
            output_dir.join(relative)
        } else {
            output_dir.join(relative).join("index.xml")
        }
    }

    /// Write RSS feed to a writer.
    pub fn write_to<W: Write>(&self, posts: &[&Post], writer: &mut W) -> Result<()> {
        let xml = self.generate(posts)?;
        writer.write_all(xml.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use ghostpress_core::{PostSummary, Tag};

    use super::*;

    fn test_config() -> Config {
        let mut config = Config::new("Short Tech", "https://shorttech.de/");
        config.site.description = Some("Tech in short".to_string());
        config
    }

    fn feed(limit: usize) -> FeedDefinition {
        FeedDefinition {
            output: "/rss/".to_string(),
            title: "Short Tech".to_string(),
            limit,
        }
    }

    fn post(slug: &str, day: u32) -> Post {
        Post {
            summary: PostSummary {
                slug: slug.to_string(),
                title: format!("Post {slug}"),
                excerpt: format!("About {slug}"),
                ..Default::default()
            },
            html: "<p>Body</p>".to_string(),
            published_at: Some(Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap()),
            tags: vec![Tag {
                name: "Rust".to_string(),
                slug: "rust".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_rss() {
        let newer = post("newer", 2);
        let older = post("older", 1);
        let xml = RssGenerator::new(test_config(), feed(20))
            .generate(&[&newer, &older])
            .unwrap();

        assert!(xml.contains("<rss"));
        assert!(xml.contains("<title>Short Tech</title>"));
        assert!(xml.contains("<description>Tech in short</description>"));
        assert!(xml.contains("https://shorttech.de/newer/"));
        assert!(xml.contains("<category>Rust</category>"));

        let newer_at = xml.find("Post newer").unwrap();
        let older_at = xml.find("Post older").unwrap();
        assert!(newer_at < older_at);
    }

    #[test]
    fn test_rss_limit() {
        let posts: Vec<Post> = (1..=5).map(|day| post(&format!("p{day}"), day)).collect();
        let refs: Vec<&Post> = posts.iter().collect();

        let xml = RssGenerator::new(test_config(), feed(2))
            .generate(&refs)
            .unwrap();

        assert_eq!(xml.matches("<item>").count(), 2);
        assert!(xml.contains("Post p1"));
        assert!(xml.contains("Post p2"));
        assert!(!xml.contains("Post p3"));
    }

    #[test]
    fn test_output_path() {
        let generator = RssGenerator::new(test_config(), feed(20));
        let out = Path::new("public");
        assert_eq!(generator.output_path(out), out.join("rss").join("index.xml"));

        let generator = RssGenerator::new(
            test_config(),
            FeedDefinition {
                output: "/feed.xml".to_string(),
                ..feed(20)
            },
        );
        assert_eq!(generator.output_path(out), out.join("feed.xml"));
    }

    #[test]
    fn test_write_to() {
        let mut buffer = Vec::new();
        RssGenerator::new(test_config(), feed(20))
            .write_to(&[], &mut buffer)
            .unwrap();
        assert!(String::from_utf8(buffer).unwrap().contains("<channel>"));
    }
}
