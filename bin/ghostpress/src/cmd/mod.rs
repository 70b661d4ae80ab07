//! Command implementations.

pub mod build;
pub mod check;

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use ghostpress_core::{BuildCredentials, BuildMode, Config, CredentialFile, resolve_credentials};

/// Default credential override file, next to the config file.
pub const CREDENTIALS_FILE: &str = ".ghost.toml";

/// Options of the `build` command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Output directory, defaulting to `build.output_dir`.
    pub output: Option<PathBuf>,
    /// Read the cached snapshot instead of calling the CMS.
    pub offline: bool,
    /// Read this snapshot instead of calling the CMS.
    pub snapshot: Option<PathBuf>,
}

/// Resolve CMS credentials for `mode`.
///
/// The override file wins when it exists; otherwise the environment is used.
/// Any failure here stops the run before content is fetched.
pub fn load_credentials(credentials_path: &Path, mode: BuildMode) -> Result<BuildCredentials> {
    let overrides = CredentialFile::read_optional(credentials_path)
        .wrap_err("Failed to read credential file")?;
    let credentials =
        resolve_credentials(mode, overrides).wrap_err("Invalid CMS credentials")?;
    tracing::info!(%mode, api_url = %credentials.api_url, "Using CMS credentials");
    Ok(credentials)
}

/// The credential file to read: `explicit` if given, otherwise
/// [`CREDENTIALS_FILE`] next to the config file.
#[must_use]
pub fn credentials_path(config_path: &Path, explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(|| site_path(config_path, CREDENTIALS_FILE), Path::to_path_buf)
}

/// Resolve the site paths of `config` against the config file's directory.
fn resolve_site_paths(config_path: &Path, config: &mut Config) {
    for path in [&mut config.source.cache_path, &mut config.build.output_dir] {
        *path = site_path(config_path, path).to_string_lossy().into_owned();
    }
}

/// Resolve a config-relative path such as `static`.
fn site_path(config_path: &Path, relative: &str) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(relative),
        _ => PathBuf::from(relative),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_load_credentials_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".ghost.toml");
        fs::write(
            &path,
            r#"
[development]
apiUrl = "http://localhost:2368"
contentApiKey = "9fccdb0e4ea5b572e2e5b92942"
"#,
        )
        .unwrap();

        let credentials = load_credentials(&path, BuildMode::Development).unwrap();
        assert_eq!(credentials.api_url, "http://localhost:2368");

        // The file has no production record.
        assert!(load_credentials(&path, BuildMode::Production).is_err());
    }

    #[test]
    fn test_load_credentials_placeholder_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".ghost.toml");
        fs::write(
            &path,
            r#"
[production]
apiUrl = "https://x.ghost.io"
contentApiKey = "<key>"
"#,
        )
        .unwrap();

        let err = load_credentials(&path, BuildMode::Production).unwrap_err();
        assert!(format!("{err:#}").contains("GHOST_API_URL and GHOST_CONTENT_API_KEY"));
    }

    #[test]
    fn test_credentials_path() {
        assert_eq!(
            credentials_path(Path::new("site/config.toml"), None),
            PathBuf::from("site/.ghost.toml")
        );
        assert_eq!(
            credentials_path(Path::new("config.toml"), None),
            PathBuf::from(".ghost.toml")
        );
        assert_eq!(
            credentials_path(Path::new("site/config.toml"), Some(Path::new("/etc/ghost.toml"))),
            PathBuf::from("/etc/ghost.toml")
        );
    }

    #[test]
    fn test_resolve_site_paths() {
        let mut config = Config::new("Short Tech", "https://shorttech.de");
        resolve_site_paths(Path::new("site/config.toml"), &mut config);

        assert_eq!(config.source.cache_path, "site/.cache/content.json");
        assert_eq!(config.build.output_dir, "site/public");
    }

    #[test]
    fn test_site_path() {
        assert_eq!(
            site_path(Path::new("site/config.toml"), "static"),
            PathBuf::from("site/static")
        );
        assert_eq!(
            site_path(Path::new("config.toml"), "static"),
            PathBuf::from("static")
        );
    }
}
