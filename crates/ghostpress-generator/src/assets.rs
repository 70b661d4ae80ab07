//! Static asset copying.
//!
//! Everything under the static directory is copied into the output root,
//! keeping relative paths. The site icon referenced by the manifest lives
//! here too.

use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info};

/// Asset processing errors.
#[derive(Debug, Error)]
pub enum AssetError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Path outside the source directory.
    #[error("invalid asset path: {0}")]
    InvalidPath(PathBuf),
}

/// Result type for asset operations.
pub type Result<T> = std::result::Result<T, AssetError>;

/// Copies static files into the output directory.
#[derive(Debug, Default)]
pub struct AssetProcessor {
    copied: Vec<PathBuf>,
}

impl AssetProcessor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy all files from `source_dir` into `dest_dir`.
    ///
    /// A missing source directory is not an error. Returns the number of
    /// files copied.
    pub fn process(&mut self, source_dir: &Path, dest_dir: &Path) -> Result<usize> {
        info!(
            source = %source_dir.display(),
            dest = %dest_dir.display(),
            "copying static assets"
        );

        if !source_dir.exists() {
            debug!("static directory does not exist, skipping");
            return Ok(0);
        }

        self.copy_dir(source_dir, source_dir, dest_dir)?;

        info!(count = self.copied.len(), "assets copied");
        Ok(self.copied.len())
    }

    /// Relative paths of the copied files.
    #[must_use]
    pub fn copied(&self) -> &[PathBuf] {
        &self.copied
    }

    fn copy_dir(&mut self, base_dir: &Path, current_dir: &Path, dest_dir: &Path) -> Result<()> {
        let mut entries: Vec<_> = fs::read_dir(current_dir)?.collect::<std::io::Result<_>>()?;
        entries.sort_by_key(fs::DirEntry::file_name);

        for entry in entries {
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                self.copy_dir(base_dir, &path, dest_dir)?;
                continue;
            }

            let relative = path
                .strip_prefix(base_dir)
                .map_err(|_| AssetError::InvalidPath(path.clone()))?;
            let dest = dest_dir.join(relative);
            copy_file(&path, &dest)?;
            debug!(asset = %relative.display(), "copied asset");
            self.copied.push(relative.to_path_buf());
        }

        Ok(())
    }
}

/// Copy a single file, creating parent directories.
pub fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        ensure_dir(parent)?;
    }
    fs::copy(source, dest)?;
    Ok(())
}

/// Create a directory and its parents if missing.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
