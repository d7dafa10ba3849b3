//! Core transform types and error definitions
//!
//! Contains the `Transform` trait every image operation implements, the
//! output each application produces and `TransformError` for failures.

use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::color::ColorError;
use crate::export::ExportError;
use crate::output::OutputError;
use crate::params::{ParamError, Params};
use crate::tile::TileError;

/// Errors that can occur while applying a transform
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TransformError {
    /// No transform registered under this name
    #[error("unknown transform: {0}")]
    UnknownTransform(String),

    /// Invalid parameter value
    #[error("invalid parameter for {op}: {message}")]
    InvalidParameter { op: String, message: String },

    /// The input produced nothing to work with
    #[error("{op}: {message}")]
    Empty { op: String, message: String },

    #[error(transparent)]
    Param(#[from] ParamError),

    #[error(transparent)]
    Tile(#[from] TileError),

    #[error(transparent)]
    Color(#[from] ColorError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

impl TransformError {
    pub fn invalid(op: &str, message: impl Into<String>) -> Self {
        TransformError::InvalidParameter { op: op.to_string(), message: message.into() }
    }
}

/// Side output of a transform, shown to the user next to the image
#[derive(Debug, Clone, PartialEq)]
pub enum Extra {
    Message(String),
    Data(serde_json::Value),
}

impl std::fmt::Display for Extra {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Extra::Message(msg) => write!(f, "{}", msg),
            Extra::Data(value) => match serde_json::to_string_pretty(value) {
                Ok(text) => write!(f, "{}", text),
                Err(_) => write!(f, "{}", value),
            },
        }
    }
}

/// Result of applying a transform to one image
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub image: RgbaImage,
    pub extra: Option<Extra>,
    /// False when the transform's product is the extra data, not the image
    pub save_image: bool,
}

impl TransformOutput {
    pub fn image(image: RgbaImage) -> Self {
        Self { image, extra: None, save_image: true }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.extra = Some(Extra::Message(message.into()));
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.extra = Some(Extra::Data(data));
        self
    }

    pub fn without_save(mut self) -> Self {
        self.save_image = false;
        self
    }

    pub fn message(&self) -> Option<&str> {
        match &self.extra {
            Some(Extra::Message(msg)) => Some(msg),
            _ => None,
        }
    }
}

/// Where an image came from and how outputs may be written
#[derive(Debug, Clone, Default)]
pub struct TransformContext {
    pub source: Option<PathBuf>,
    pub overwrite: bool,
    /// Directory for files a transform writes besides the image
    pub output_dir: Option<PathBuf>,
}

impl TransformContext {
    pub fn for_source(source: impl Into<PathBuf>) -> Self {
        Self { source: Some(source.into()), ..Self::default() }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

/// A named image operation
pub trait Transform: Sync {
    /// Registry name, e.g. `mark-unique`
    fn name(&self) -> &'static str;

    /// One-line description for `tilesmith list`
    fn description(&self) -> &'static str;

    fn apply(
        &self,
        image: &RgbaImage,
        params: &Params,
        ctx: &TransformContext,
    ) -> Result<TransformOutput, TransformError>;
}
