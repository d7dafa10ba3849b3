//! Folder batch processing.
//!
//! Applies one transform to every image in an input folder, writing
//! `{stem}{suffix}.{ext}` files into the output folder. Images are handled
//! strictly one after another; a failing image is recorded and the batch
//! moves on.
//!
//! # Example
//!
//! ```ignore
//! use tilesmith::batch::{BatchOptions, BatchRunner};
//! use tilesmith::batch::progress::ConsoleProgress;
//!
//! let options = BatchOptions::new("input/sprites", "output/sprites");
//! let summary = BatchRunner::new(transform, options).run(&ConsoleProgress::new())?;
//! println!("{} processed", summary.processed);
//! ```

pub mod discovery;
pub mod progress;

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

pub use discovery::{discover_images, subfolders, DiscoveryError};
pub use progress::{ConsoleProgress, ImageStatus, NullProgress, ProgressEvent, ProgressReporter};

use crate::output::{self, processed_output_path};
use crate::params::Params;
use crate::transforms::{Extra, Transform, TransformContext, TransformError};

/// Suffix appended to processed image names by default
pub const DEFAULT_SUFFIX: &str = "_processed";

/// Errors that stop a whole batch.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error("cannot create output folder '{path}': {source}")]
    OutputFolder { path: PathBuf, source: std::io::Error },
}

/// Errors for a single image; recorded, never fatal to the batch.
#[derive(Debug, thiserror::Error)]
enum ImageError {
    #[error(transparent)]
    Output(#[from] output::OutputError),
    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Settings for one batch run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub suffix: String,
    /// Replace existing outputs instead of skipping the image
    pub overwrite: bool,
    pub params: Params,
}

impl BatchOptions {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            suffix: DEFAULT_SUFFIX.to_string(),
            overwrite: false,
            params: Params::new(),
        }
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }
}

/// Counts and messages from a finished batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Transform messages, skip notices and errors, per source image
    pub messages: Vec<(PathBuf, String)>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.failed
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Sequential batch runner for one transform.
pub struct BatchRunner<'a> {
    transform: &'a dyn Transform,
    options: BatchOptions,
}

impl<'a> BatchRunner<'a> {
    pub fn new(transform: &'a dyn Transform, options: BatchOptions) -> Self {
        Self { transform, options }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Process every image of the input folder.
    pub fn run(&self, reporter: &dyn ProgressReporter) -> Result<BatchSummary, BatchError> {
        let started = Instant::now();
        let images = discover_images(&self.options.input_dir)?;
        std::fs::create_dir_all(&self.options.output_dir).map_err(|source| BatchError::OutputFolder {
            path: self.options.output_dir.clone(),
            source,
        })?;

        reporter.report(ProgressEvent::BatchStarted {
            transform: self.transform.name().to_string(),
            total_images: images.len(),
        });

        let mut summary = BatchSummary::default();
        for image in &images {
            let name = display_name(image);
            reporter.report(ProgressEvent::ImageStarted { image: name.clone() });
            let image_started = Instant::now();

            let status = match self.process_one(image) {
                Ok(Outcome::Skipped(message)) => {
                    warn!(image = %name, "output exists, skipping");
                    summary.skipped += 1;
                    reporter.report(ProgressEvent::Warning { image: Some(name.clone()), message: message.clone() });
                    summary.messages.push((image.clone(), message));
                    ImageStatus::Skipped
                }
                Ok(Outcome::Processed(message)) => {
                    summary.processed += 1;
                    if let Some(message) = message {
                        reporter.report(ProgressEvent::Warning { image: Some(name.clone()), message: message.clone() });
                        summary.messages.push((image.clone(), message));
                    }
                    ImageStatus::Processed
                }
                Err(err) => {
                    let message = err.to_string();
                    warn!(image = %name, error = %message, "image failed");
                    summary.failed += 1;
                    reporter.report(ProgressEvent::Error { image: Some(name.clone()), message: message.clone() });
                    summary.messages.push((image.clone(), message.clone()));
                    ImageStatus::Failed(message)
                }
            };

            reporter.report(ProgressEvent::ImageCompleted {
                image: name,
                status,
                duration_ms: image_started.elapsed().as_millis() as u64,
            });
        }

        reporter.report(ProgressEvent::BatchCompleted {
            processed: summary.processed,
            skipped: summary.skipped,
            failed: summary.failed,
            duration_ms: started.elapsed().as_millis() as u64,
        });
        info!(
            transform = self.transform.name(),
            processed = summary.processed,
            skipped = summary.skipped,
            failed = summary.failed,
            "batch finished"
        );
        Ok(summary)
    }

    fn process_one(&self, image_path: &Path) -> Result<Outcome, ImageError> {
        let out_path = processed_output_path(image_path, &self.options.output_dir, &self.options.suffix);
        if out_path.exists() && !self.options.overwrite {
            return Ok(Outcome::Skipped(format!(
                "Skipping {}: Output file already exists and force_override is False.",
                display_name(image_path)
            )));
        }

        let image = output::load_image(image_path)?;
        let mut params = self.options.params.clone();
        params.set("fname", &image_path.to_string_lossy());
        let ctx = TransformContext {
            source: Some(image_path.to_path_buf()),
            overwrite: self.options.overwrite,
            output_dir: Some(self.options.output_dir.clone()),
        };

        let result = self.transform.apply(&image, &params, &ctx)?;
        if result.save_image {
            output::save_image(&result.image, &out_path)?;
            info!(input = %image_path.display(), output = %out_path.display(), "processed image");
        }

        let message = result.extra.map(|extra| match extra {
            Extra::Message(msg) => msg,
            data @ Extra::Data(_) => data.to_string(),
        });
        Ok(Outcome::Processed(message))
    }
}

enum Outcome {
    Skipped(String),
    Processed(Option<String>),
}

fn display_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| path.display().to_string())
}
