//! ghostpress Generator Library
//!
//! Static site generation engine for ghostpress.
//!
//! # Modules
//!
//! - [`pipeline`] - Build step assembly from config and credentials
//! - [`source`] - Content sources: Ghost Content API and JSON snapshots
//! - [`links`] - Rewriting absolute CMS links to site-relative paths
//! - [`template`] - HTML template system with variable interpolation
//! - [`html`] - HTML generation for posts, pages and archives
//! - [`rss`] - RSS feed generation
//! - [`sitemap`] - XML sitemap generation
//! - [`manifest`] - Web app manifest generation
//! - [`assets`] - Static asset copying
//! - [`offline`] - Service worker for offline reading
//! - [`build`] - Build orchestration

pub mod assets;
pub mod build;
pub mod html;
pub mod links;
pub mod manifest;
pub mod offline;
pub mod pipeline;
pub mod rss;
pub mod sitemap;
pub mod source;
pub mod template;

pub use assets::AssetProcessor;
pub use build::{BuildError, BuildStats, Builder};
pub use html::{HtmlGenerator, SiteChrome, navigation_html, post_suggestion_html};
pub use links::LinkRewriter;
pub use manifest::WebManifest;
pub use offline::ServiceWorker;
pub use pipeline::{NodeType, Pipeline, Plugin};
pub use rss::RssGenerator;
pub use sitemap::SitemapGenerator;
pub use source::{ContentSource, GhostApiSource, SnapshotSource, SourceError};
pub use template::{Template, TemplateContext, TemplateRegistry};
