//! Build command - generates the static site

use std::{path::Path, time::Instant};

use color_eyre::eyre::{Result, WrapErr, eyre};
use ghostpress_core::{BuildMode, Config};
use ghostpress_generator::{Builder, ContentSource, GhostApiSource, Pipeline, SnapshotSource};

use super::{BuildOptions, load_credentials, resolve_site_paths, site_path};

/// Run the build command.
///
/// Resolves credentials, fetches content and writes the site to the output
/// directory.
pub fn run(
    config_path: &Path,
    credentials_path: &Path,
    mode: BuildMode,
    opts: &BuildOptions,
) -> Result<()> {
    let start = Instant::now();
    tracing::info!(?config_path, %mode, ?opts, "Starting build");

    let mut config =
        Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;
    resolve_site_paths(config_path, &mut config);
    tracing::debug!(?config, "Loaded configuration");

    // Credentials gate everything else.
    let credentials = load_credentials(credentials_path, mode)?;
    let pipeline = Pipeline::assemble(&config, &credentials);

    let output = opts
        .output
        .clone()
        .unwrap_or_else(|| config.build.output_dir.clone().into());

    let source = content_source(&config, &pipeline, opts)?;

    let mut builder = Builder::new(config.clone(), pipeline, &output);

    let static_dir = site_path(config_path, &config.build.static_dir);
    if static_dir.is_dir() {
        tracing::info!(dir = %static_dir.display(), "Found static directory, will copy to output");
        builder = builder.with_static_dir(static_dir);
    }

    let stats = builder.build(source.as_ref()).wrap_err("Build failed")?;

    let duration = start.elapsed();

    // Print build statistics
    println!();
    println!("  Build completed successfully!");
    println!();
    println!("  Posts:      {}", stats.posts);
    println!("  Pages:      {}", stats.pages);
    println!("  Archives:   {}", stats.archives);
    println!("  Feeds:      {}", stats.feeds);
    println!("  Sitemaps:   {}", stats.sitemaps);
    println!("  Assets:     {}", stats.assets);
    if stats.warnings > 0 {
        println!("  Warnings:   {}", stats.warnings);
    }
    println!();
    println!("  Duration:   {:.2}s", duration.as_secs_f64());
    println!("  Output:     {}", output.display());
    println!();

    tracing::info!(?stats, ?duration, "Build completed successfully");

    Ok(())
}

/// Pick the content source: an explicit snapshot, the cached snapshot when
/// offline, or the Ghost Content API.
fn content_source(
    config: &Config,
    pipeline: &Pipeline,
    opts: &BuildOptions,
) -> Result<Box<dyn ContentSource>> {
    if let Some(snapshot) = &opts.snapshot {
        tracing::info!(path = %snapshot.display(), "Reading content snapshot");
        return Ok(Box::new(SnapshotSource::new(snapshot)));
    }

    if opts.offline {
        tracing::info!(path = %config.source.cache_path, "Offline build from cached content");
        return Ok(Box::new(SnapshotSource::new(&config.source.cache_path)));
    }

    let options = pipeline
        .content_source()
        .cloned()
        .ok_or_else(|| eyre!("Pipeline has no content source"))?;
    let images = pipeline
        .ghost_images()
        .cloned()
        .ok_or_else(|| eyre!("Pipeline has no image step"))?;

    let source = GhostApiSource::new(options, images).wrap_err("Failed to create CMS client")?;
    Ok(Box::new(source))
}
