//! Error types for the ghostpress core library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types for ghostpress.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration loading or parsing error.
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Missing or placeholder CMS credentials. Always fatal.
    #[error(
        "GHOST_API_URL and GHOST_CONTENT_API_KEY are required to build. Check the README. ({reason})"
    )]
    Credentials { reason: String },

    /// Credential override file could not be parsed.
    #[error("Credential file error in {path}: {message}")]
    CredentialFile { path: PathBuf, message: String },

    /// Content snapshot could not be decoded.
    #[error("Content error: {0}")]
    Content(String),

    /// File system I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic configuration crate error.
    #[error("Config crate error: {0}")]
    ConfigCrate(#[from] config::ConfigError),
}

impl CoreError {
    /// Create a new configuration error with a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source.
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new credentials error.
    pub fn credentials(reason: impl Into<String>) -> Self {
        Self::Credentials {
            reason: reason.into(),
        }
    }

    /// Create a new credential file error.
    pub fn credential_file(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::CredentialFile {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new content error.
    pub fn content(message: impl Into<String>) -> Self {
        Self::Content(message.into())
    }
}
