//! Sprite/animation metadata export.
//!
//! A sprite sheet is walked as a fixed grid of states, animations, frames
//! and tiles, and described as a nested document that a game-engine asset
//! importer can consume.
//!
//! # Supported Formats
//!
//! - **GB Studio** sprite resources (`.gbsres` JSON)
//!
//! # Example
//!
//! ```ignore
//! use tilesmith::export::{build_sprite_document, GbStudioExporter, SpriteLayout};
//!
//! let layout = SpriteLayout::new("hero");
//! let doc = build_sprite_document(&image, &layout, &mut IdGen::uuid())?;
//! GbStudioExporter::new().export(&doc, Path::new("hero.gbsres"), &ExportOptions::default())?;
//! ```

pub mod gbstudio;
pub mod sprite;

pub use gbstudio::*;
pub use sprite::*;

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::color::ColorError;
use crate::params::ParamError;
use crate::tile::{TileError, TileSize};

/// Common error type for export operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    /// IO error during file reading or writing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Image is not a whole number of tiles
    #[error("image size {width}x{height} is not a multiple of the {tile} tile size")]
    Dimensions { width: u32, height: u32, tile: TileSize },
    /// The grid walk reached past the image edge
    #[error("tile slice at ({x}, {y}) lies outside the {width}x{height} image")]
    OutOfBounds { x: u32, y: u32, width: u32, height: u32 },
    /// Bad layout parameter
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error(transparent)]
    Tile(#[from] TileError),
    #[error(transparent)]
    Color(#[from] ColorError),
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

/// Options for export operations.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Pretty print output (two-space indentation)
    pub pretty: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// Trait for export format implementations.
pub trait Exporter {
    /// Export a sprite document to the specified path.
    fn export(&self, doc: &SpriteDocument, output_path: &Path, options: &ExportOptions) -> Result<()>;

    /// Get the format name for this exporter.
    fn format_name(&self) -> &'static str;

    /// Get the default file extension for this format.
    fn extension(&self) -> &'static str;
}

/// What happened when writing a resource file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Target exists and overwriting was not allowed
    Skipped { path: PathBuf },
    /// File written; `backup` is set when an existing file was replaced
    Written { path: PathBuf, existing: bool, backup: Option<PathBuf> },
}

impl WriteOutcome {
    pub fn path(&self) -> &Path {
        match self {
            WriteOutcome::Skipped { path } | WriteOutcome::Written { path, .. } => path,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, WriteOutcome::Written { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_options_default() {
        assert!(ExportOptions::default().pretty);
    }

    #[test]
    fn test_export_error_display() {
        let io_err =
            ExportError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"));
        assert!(io_err.to_string().contains("IO error"));

        let dims = ExportError::Dimensions { width: 12, height: 16, tile: TileSize::SPRITE_8X16 };
        assert_eq!(dims.to_string(), "image size 12x16 is not a multiple of the 8x16 tile size");
    }

    #[test]
    fn test_write_outcome_path() {
        let skipped = WriteOutcome::Skipped { path: PathBuf::from("a.gbsres") };
        assert_eq!(skipped.path(), Path::new("a.gbsres"));
        assert!(!skipped.is_written());
    }
}
