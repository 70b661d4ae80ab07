//! CMS credential selection and validation.
//!
//! Credentials come from an optional local override file holding one record
//! per [`BuildMode`], or, when that file is absent, from the
//! `GHOST_API_URL` / `GHOST_CONTENT_API_KEY` environment variables, which
//! only ever provide the production record.
//!
//! Resolution happens once at startup. Any failure is fatal: a build without
//! working credentials cannot produce correct output.

use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, Result};

/// Environment variable holding the CMS API URL.
pub const API_URL_VAR: &str = "GHOST_API_URL";

/// Environment variable holding the CMS content API key.
pub const CONTENT_API_KEY_VAR: &str = "GHOST_CONTENT_API_KEY";

/// Token left in unfilled credential templates.
pub const PLACEHOLDER_KEY: &str = "<key>";

/// Which credential record a run uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Development,
    #[default]
    Production,
}

impl BuildMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(CoreError::config(format!("unknown build mode: {other}"))),
        }
    }
}

/// Access details for the CMS content API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildCredentials {
    #[serde(default, alias = "apiUrl")]
    pub api_url: String,

    #[serde(default, alias = "contentApiKey")]
    pub content_api_key: String,
}

impl BuildCredentials {
    pub fn new(api_url: impl Into<String>, content_api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            content_api_key: content_api_key.into(),
        }
    }
}

/// Credential records keyed by build mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialFile {
    #[serde(default)]
    pub development: Option<BuildCredentials>,

    #[serde(default)]
    pub production: Option<BuildCredentials>,
}

impl CredentialFile {
    /// Read an override file, returning `None` when it does not exist.
    pub fn read_optional(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            debug!(path = %path.display(), "no credential override file");
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let file = toml::from_str(&content)
            .map_err(|e| CoreError::credential_file(path, e.to_string()))?;
        debug!(path = %path.display(), "loaded credential override file");
        Ok(Some(file))
    }

    /// Production-only record built from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Production-only record built from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            development: None,
            production: Some(BuildCredentials {
                api_url: lookup(API_URL_VAR).unwrap_or_default(),
                content_api_key: lookup(CONTENT_API_KEY_VAR).unwrap_or_default(),
            }),
        }
    }

    /// The record for `mode`, if any.
    pub fn select(&self, mode: BuildMode) -> Option<&BuildCredentials> {
        match mode {
            BuildMode::Development => self.development.as_ref(),
            BuildMode::Production => self.production.as_ref(),
        }
    }
}

/// Select the record for `mode` and validate it.
///
/// `overrides` is the parsed override file; `None` falls back to the
/// environment.
pub fn resolve_credentials(
    mode: BuildMode,
    overrides: Option<CredentialFile>,
) -> Result<BuildCredentials> {
    let file = overrides.unwrap_or_else(CredentialFile::from_env);
    resolve_from(mode, &file)
}

/// Select and validate against an already-built credential file.
pub fn resolve_from(mode: BuildMode, file: &CredentialFile) -> Result<BuildCredentials> {
    let credentials = file
        .select(mode)
        .ok_or_else(|| CoreError::credentials(format!("no {mode} credentials configured")))?;

    validate_credentials(credentials)?;
    debug!(%mode, api_url = %credentials.api_url, "resolved CMS credentials");
    Ok(credentials.clone())
}

/// Check that both fields are present and the key is not a placeholder.
pub fn validate_credentials(credentials: &BuildCredentials) -> Result<()> {
    if credentials.api_url.trim().is_empty() {
        return Err(CoreError::credentials("apiUrl is empty"));
    }

    if credentials.content_api_key.trim().is_empty() {
        return Err(CoreError::credentials("contentApiKey is empty"));
    }

    if credentials.content_api_key.contains(PLACEHOLDER_KEY) {
        return Err(CoreError::credentials(
            "contentApiKey is still the placeholder value",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn file_with(mode: BuildMode, credentials: BuildCredentials) -> CredentialFile {
        match mode {
            BuildMode::Development => CredentialFile {
                development: Some(credentials),
                production: None,
            },
            BuildMode::Production => CredentialFile {
                development: None,
                production: Some(credentials),
            },
        }
    }

    #[test]
    fn test_valid_production_credentials() {
        let file = file_with(
            BuildMode::Production,
            BuildCredentials::new("https://x.ghost.io", "22444f78447824223cefc48062"),
        );

        let credentials = resolve_credentials(BuildMode::Production, Some(file)).unwrap();
        assert_eq!(credentials.api_url, "https://x.ghost.io");
    }

    #[test]
    fn test_empty_api_url_is_fatal() {
        let file = file_with(BuildMode::Production, BuildCredentials::new("", "abc"));

        let err = resolve_credentials(BuildMode::Production, Some(file)).unwrap_err();
        assert!(matches!(err, CoreError::Credentials { .. }));
        assert!(err.to_string().contains("apiUrl is empty"));
    }

    #[test]
    fn test_placeholder_key_is_fatal() {
        let file = file_with(
            BuildMode::Production,
            BuildCredentials::new("https://x.ghost.io", "<key>"),
        );

        let err = resolve_credentials(BuildMode::Production, Some(file)).unwrap_err();
        assert!(err.to_string().contains("placeholder"));
        assert!(err.to_string().contains("GHOST_API_URL"));
        assert!(err.to_string().contains("GHOST_CONTENT_API_KEY"));
    }

    #[test]
    fn test_placeholder_inside_key_is_fatal() {
        let credentials = BuildCredentials::new("https://x.ghost.io", "prefix-<key>");
        assert!(validate_credentials(&credentials).is_err());
    }

    #[test]
    fn test_empty_key_is_fatal() {
        let credentials = BuildCredentials::new("https://x.ghost.io", "  ");
        let err = validate_credentials(&credentials).unwrap_err();
        assert!(err.to_string().contains("contentApiKey is empty"));
    }

    #[test]
    fn test_mode_selects_matching_record() {
        let file = CredentialFile {
            development: Some(BuildCredentials::new("http://localhost:2368", "dev-key")),
            production: Some(BuildCredentials::new("https://x.ghost.io", "prod-key")),
        };

        let dev = resolve_from(BuildMode::Development, &file).unwrap();
        let prod = resolve_from(BuildMode::Production, &file).unwrap();
        assert_eq!(dev.content_api_key, "dev-key");
        assert_eq!(prod.content_api_key, "prod-key");
    }

    #[test]
    fn test_missing_record_for_mode_is_fatal() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (API_URL_VAR, "https://x.ghost.io"),
            (CONTENT_API_KEY_VAR, "abc"),
        ]);
        let file = CredentialFile::from_lookup(|name| vars.get(name).map(|v| v.to_string()));

        assert!(resolve_from(BuildMode::Production, &file).is_ok());
        let err = resolve_from(BuildMode::Development, &file).unwrap_err();
        assert!(err.to_string().contains("no development credentials"));
    }

    #[test]
    fn test_env_lookup_with_missing_vars() {
        let file = CredentialFile::from_lookup(|_| None);
        let err = resolve_from(BuildMode::Production, &file).unwrap_err();
        assert!(matches!(err, CoreError::Credentials { .. }));
    }

    #[test]
    fn test_read_override_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(".ghost.toml");
        std::fs::write(
            &path,
            r#"
[development]
apiUrl = "http://localhost:2368"
contentApiKey = "dev-key"

[production]
api_url = "https://x.ghost.io"
content_api_key = "prod-key"
"#,
        )
        .expect("write");

        let file = CredentialFile::read_optional(&path).unwrap().unwrap();
        assert_eq!(
            file.select(BuildMode::Development).unwrap().api_url,
            "http://localhost:2368"
        );
        assert_eq!(
            file.select(BuildMode::Production).unwrap().content_api_key,
            "prod-key"
        );
    }

    #[test]
    fn test_read_missing_override_file() {
        let result = CredentialFile::read_optional(Path::new("/nonexistent/.ghost.toml"));
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_read_malformed_override_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(".ghost.toml");
        std::fs::write(&path, "[production\napi_url = 1").expect("write");

        let err = CredentialFile::read_optional(&path).unwrap_err();
        assert!(matches!(err, CoreError::CredentialFile { .. }));
    }

    #[test]
    fn test_build_mode_parsing() {
        assert_eq!("development".parse::<BuildMode>().unwrap(), BuildMode::Development);
        assert_eq!("PRODUCTION".parse::<BuildMode>().unwrap(), BuildMode::Production);
        assert!("staging".parse::<BuildMode>().is_err());
        assert_eq!(BuildMode::default(), BuildMode::Production);
    }
}
