//! ghostpress Core Library
//!
//! Core types, configuration, credential handling and error types for the
//! ghostpress static site generator.

pub mod config;
pub mod content;
pub mod credentials;
pub mod error;
pub mod navigation;
pub mod suggestion;
pub mod validate;

pub use config::Config;
pub use content::{Author, Page, Post, PostSummary, ProcessedImage, Settings, SiteContent, Tag};
pub use credentials::{BuildCredentials, BuildMode, CredentialFile, resolve_credentials};
pub use error::{CoreError, Result};
pub use navigation::{LinkKind, NavEntry, NavigationItem, classify_url, navigation_entries};
pub use suggestion::PostCard;
pub use validate::{ValidationReport, validate_content};
