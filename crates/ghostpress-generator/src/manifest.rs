//! Web app manifest generation.

use std::path::{Path, PathBuf};

use ghostpress_core::Settings;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::pipeline::ManifestOptions;

/// Manifest file name in the output root.
pub const MANIFEST_FILE: &str = "manifest.webmanifest";

/// Manifest generation errors.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// JSON encoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for manifest operations.
pub type Result<T> = std::result::Result<T, ManifestError>;

/// One manifest icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestIcon {
    pub src: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

/// `manifest.webmanifest` contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebManifest {
    pub name: String,
    pub short_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_url: String,
    pub background_color: String,
    pub theme_color: String,
    pub display: String,
    pub icons: Vec<ManifestIcon>,
}

impl WebManifest {
    /// Build the manifest from CMS settings and the manifest step options.
    ///
    /// `site_title` is used when the settings carry no title.
    #[must_use]
    pub fn new(settings: &Settings, site_title: &str, options: &ManifestOptions) -> Self {
        let name = if settings.title.is_empty() {
            site_title.to_string()
        } else {
            settings.title.clone()
        };

        let file = options.icon.rsplit('/').next().unwrap_or(&options.icon);
        let icons = vec![ManifestIcon {
            src: format!("/{file}"),
            mime_type: mime_type(file).to_string(),
        }];

        Self {
            name,
            short_name: options.short_name.clone(),
            description: settings.description.clone(),
            start_url: options.start_url.clone(),
            background_color: options.background_color.clone(),
            theme_color: options.theme_color.clone(),
            display: options.display.clone(),
            icons,
        }
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the manifest into `output_dir`.
    pub fn write(&self, output_dir: &Path) -> Result<PathBuf> {
        let path = output_dir.join(MANIFEST_FILE);
        std::fs::write(&path, self.to_json()?)?;
        debug!(path = %path.display(), "wrote web manifest");
        Ok(path)
    }
}

fn mime_type(file: &str) -> &'static str {
    match Path::new(file).extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ManifestOptions {
        ManifestOptions {
            short_name: "ST".to_string(),
            start_url: "/".to_string(),
            background_color: "#e9e9e9".to_string(),
            theme_color: "#15171A".to_string(),
            display: "standalone".to_string(),
            icon: "static/favicon.png".to_string(),
            legacy: true,
        }
    }

    #[test]
    fn test_manifest_fields() {
        let settings = Settings {
            title: "Short Tech".to_string(),
            description: Some("Tech in short".to_string()),
            ..Default::default()
        };
        let manifest = WebManifest::new(&settings, "Fallback", &options());

        assert_eq!(manifest.name, "Short Tech");
        assert_eq!(manifest.short_name, "ST");
        assert_eq!(manifest.start_url, "/");
        assert_eq!(manifest.display, "standalone");
        assert_eq!(manifest.icons[0].src, "/favicon.png");
        assert_eq!(manifest.icons[0].mime_type, "image/png");

        let json = manifest.to_json().unwrap();
        assert!(json.contains(r##""theme_color": "#15171A""##));
        assert!(json.contains(r#""type": "image/png""#));
    }

    #[test]
    fn test_manifest_title_fallback() {
        let manifest = WebManifest::new(&Settings::default(), "Fallback", &options());
        assert_eq!(manifest.name, "Fallback");
        assert!(!manifest.to_json().unwrap().contains("description"));
    }

    #[test]
    fn test_write_manifest() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = WebManifest::new(&Settings::default(), "Short Tech", &options())
            .write(dir.path())
            .unwrap();

        assert_eq!(path, dir.path().join("manifest.webmanifest"));
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["background_color"], "#e9e9e9");
    }
}
