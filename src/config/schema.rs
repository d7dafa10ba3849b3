//! Configuration schema for `tilesmith.toml`
//!
//! ```toml
//! [project]
//! input = "input"
//! output = "output"
//!
//! [defaults]
//! overwrite = false
//! preview_scale = 4
//! suffix = "_processed"
//! transform = "mark-unique"
//!
//! [transforms.sprite-anim]
//! htiles = 2
//! palettes = [0, 1]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::batch::DEFAULT_SUFFIX;
use crate::params::Params;
use crate::transforms;

/// Largest preview upscale accepted
pub const MAX_PREVIEW_SCALE: u32 = 16;

/// Input and output folders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Folder scanned by batch runs
    #[serde(default = "default_input")]
    pub input: PathBuf,
    /// Folder batch results are written to
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self { input: default_input(), output: default_output() }
    }
}

fn default_input() -> PathBuf {
    PathBuf::from("input")
}

fn default_output() -> PathBuf {
    PathBuf::from("output")
}

/// Default settings applied to all commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Replace existing outputs
    #[serde(default)]
    pub overwrite: bool,
    /// Upscale factor for previews
    #[serde(default = "default_preview_scale")]
    pub preview_scale: u32,
    /// Suffix for processed file names
    #[serde(default = "default_suffix")]
    pub suffix: String,
    /// Transform used when a command names none
    #[serde(default)]
    pub transform: Option<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            overwrite: false,
            preview_scale: default_preview_scale(),
            suffix: default_suffix(),
            transform: None,
        }
    }
}

fn default_preview_scale() -> u32 {
    4
}

fn default_suffix() -> String {
    DEFAULT_SUFFIX.to_string()
}

/// Complete tilesmith.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TilesmithConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Default parameters per transform name
    #[serde(default)]
    pub transforms: BTreeMap<String, toml::Table>,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "defaults.preview_scale")
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tilesmith.toml: '{}' {}", self.field, self.message)
    }
}

impl TilesmithConfig {
    /// Validate the configuration and return every problem found
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut error = |field: String, message: String| errors.push(ConfigValidationError { field, message });

        if self.project.input.as_os_str().is_empty() {
            error("project.input".into(), "must be a non-empty path".into());
        }
        if self.project.output.as_os_str().is_empty() {
            error("project.output".into(), "must be a non-empty path".into());
        }

        if !(1..=MAX_PREVIEW_SCALE).contains(&self.defaults.preview_scale) {
            error(
                "defaults.preview_scale".into(),
                format!("must be between 1 and {}", MAX_PREVIEW_SCALE),
            );
        }

        if let Some(name) = &self.defaults.transform {
            if transforms::find(name).is_none() {
                error("defaults.transform".into(), format!("unknown transform '{}'", name));
            }
        }

        for name in self.transforms.keys() {
            if transforms::find(name).is_none() {
                error(format!("transforms.{}", name), "is not a known transform".into());
            }
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Configured default parameters for a transform (empty if none).
    pub fn params_for(&self, transform: &str) -> Params {
        self.transforms.get(transform).map(Params::from_toml).unwrap_or_default()
    }
}
