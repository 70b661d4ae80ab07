//! Check command - validate configuration, credentials and content

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, bail};
use ghostpress_core::{BuildMode, Config, SiteContent, ValidationReport, validate_content};

use super::{load_credentials, resolve_site_paths, site_path};

/// Run the check command.
///
/// Validates the configuration, the credentials for `mode` and the content
/// snapshot (`snapshot`, or the cached one when present). Never calls the CMS.
pub fn run(
    config_path: &Path,
    credentials_path: &Path,
    mode: BuildMode,
    snapshot: Option<&Path>,
    strict: bool,
) -> Result<()> {
    tracing::info!(?config_path, %mode, strict, "Checking configuration and content");

    let mut result = ValidationReport::default();

    // Validate configuration
    println!("Checking configuration...");
    let config = match Config::load_with_env(config_path) {
        Ok(mut c) => {
            println!("  ✓ Configuration valid");
            resolve_site_paths(config_path, &mut c);
            Some(c)
        }
        Err(e) => {
            result.errors.push(format!("Configuration error: {e}"));
            println!("  ✗ Configuration invalid: {e}");
            None
        }
    };

    // Validate credentials
    println!("\nChecking {mode} credentials...");
    match load_credentials(credentials_path, mode) {
        Ok(_) => println!("  ✓ Credentials valid"),
        Err(e) => {
            result.errors.push(format!("{e:#}"));
            println!("  ✗ Credentials invalid");
        }
    }

    // Validate content
    let snapshot: Option<PathBuf> = snapshot.map(Path::to_path_buf).or_else(|| {
        config
            .as_ref()
            .map(|c| PathBuf::from(&c.source.cache_path))
            .filter(|p| p.exists())
    });
    match snapshot {
        Some(path) => {
            println!("\nChecking content snapshot {}...", path.display());
            match SiteContent::load(&path) {
                Ok(content) => {
                    let report = validate_content(&content);
                    println!(
                        "  ✓ {} posts, {} pages, {} tags, {} authors",
                        content.posts.len(),
                        content.pages.len(),
                        content.tags.len(),
                        content.authors.len()
                    );
                    result.errors.extend(report.errors);
                    result.warnings.extend(report.warnings);
                }
                Err(e) => result.errors.push(format!("Content error: {e}")),
            }
        }
        None => result
            .warnings
            .push("No content snapshot to check; run a build or pass --snapshot".to_string()),
    }

    // Check static files
    if let Some(ref cfg) = config {
        println!("\nChecking static files...");
        check_static_files(config_path, cfg, &mut result);
    }

    // Print summary
    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    // Determine exit status
    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if result.is_fatal(strict) {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

/// The manifest icon must exist in the static directory.
fn check_static_files(config_path: &Path, config: &Config, result: &mut ValidationReport) {
    let static_dir = site_path(config_path, &config.build.static_dir);
    if !static_dir.is_dir() {
        result.warnings.push(format!(
            "Static directory does not exist: {}",
            static_dir.display()
        ));
        return;
    }

    let icon = static_dir.join(&config.site.site_icon);
    if icon.exists() {
        println!("  ✓ Site icon found");
    } else {
        result
            .warnings
            .push(format!("Site icon not found: {}", icon.display()));
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn write_site(dir: &Path, key: &str) {
        fs::write(
            dir.join("config.toml"),
            "[site]\ntitle = \"Short Tech\"\nsite_url = \"https://shorttech.de\"\n",
        )
        .unwrap();
        fs::write(
            dir.join(".ghost.toml"),
            format!("[production]\napiUrl = \"https://x.ghost.io\"\ncontentApiKey = \"{key}\"\n"),
        )
        .unwrap();
        fs::write(
            dir.join("content.json"),
            r#"{"posts": [{
                "slug": "hello-world",
                "title": "Hello World",
                "excerpt": "First",
                "primary_author": {"name": "Ada", "slug": "ada"}
            }]}"#,
        )
        .unwrap();
        fs::create_dir_all(dir.join("static")).unwrap();
        fs::write(dir.join("static").join("favicon.png"), b"png").unwrap();
    }

    fn check(dir: &Path, strict: bool) -> Result<()> {
        run(
            &dir.join("config.toml"),
            &dir.join(".ghost.toml"),
            BuildMode::Production,
            Some(&dir.join("content.json")),
            strict,
        )
    }

    #[test]
    fn test_check_passes_with_warnings() {
        let dir = tempfile::tempdir().unwrap();
        write_site(dir.path(), "22444f78447824223cefc48062");

        assert!(check(dir.path(), false).is_ok());
    }

    #[test]
    fn test_check_strict_fails_on_warnings() {
        let dir = tempfile::tempdir().unwrap();
        write_site(dir.path(), "22444f78447824223cefc48062");

        let err = check(dir.path(), true).unwrap_err();
        assert!(err.to_string().contains("strict mode"));
    }

    #[test]
    fn test_check_fails_on_placeholder_key() {
        let dir = tempfile::tempdir().unwrap();
        write_site(dir.path(), "<key>");

        let err = check(dir.path(), false).unwrap_err();
        assert!(err.to_string().contains("1 error"));
    }
}
