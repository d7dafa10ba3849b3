//! Input discovery for batch runs.
//!
//! Batches work on one folder at a time, non-recursively. Folders are
//! enumerated with `glob` so the same pattern rules apply everywhere.

use std::path::{Path, PathBuf};

use glob::glob;
use tracing::warn;

use crate::output::is_image_file;

/// Error during input discovery.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("input folder '{0}' does not exist")]
    MissingFolder(PathBuf),
    #[error("invalid glob pattern '{0}': {1}")]
    InvalidPattern(String, glob::PatternError),
}

fn entries(dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    if !dir.is_dir() {
        return Err(DiscoveryError::MissingFolder(dir.to_path_buf()));
    }

    let pattern = dir.join("*");
    let pattern_str = glob::Pattern::escape(&dir.to_string_lossy()) + "/*";
    let paths = glob(&pattern_str)
        .map_err(|e| DiscoveryError::InvalidPattern(pattern.to_string_lossy().into_owned(), e))?;

    let mut found = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => found.push(path),
            Err(e) => warn!("error reading path: {}", e),
        }
    }
    found.sort();
    Ok(found)
}

/// Image files directly inside `dir`, sorted by path.
pub fn discover_images(dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    Ok(entries(dir)?.into_iter().filter(|p| p.is_file() && is_image_file(p)).collect())
}

/// Names of the folders directly inside `dir`, sorted.
pub fn subfolders(dir: &Path) -> Result<Vec<String>, DiscoveryError> {
    Ok(entries(dir)?
        .into_iter()
        .filter(|p| p.is_dir())
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect())
}
