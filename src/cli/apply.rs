//! Single-image command implementations (apply, preview)

use std::path::Path;
use std::process::ExitCode;

use tracing::{info, warn};

use crate::config::TilesmithConfig;
use crate::output::{load_image, preview_sheet, save_image, sibling_output_path};
use crate::transforms::{Transform, TransformContext};

use super::{collect_params, lookup_transform, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Upscale factors accepted by the preview command
const PREVIEW_SCALES: [u32; 4] = [1, 2, 4, 8];

/// Execute the apply command
pub fn run_apply(
    config: &TilesmithConfig,
    transform_name: &str,
    input: &Path,
    output: Option<&Path>,
    pairs: &[String],
    params: Option<&str>,
    overwrite: bool,
) -> ExitCode {
    let transform = match lookup_transform(transform_name) {
        Ok(t) => t,
        Err(code) => return code,
    };

    let mut params = match collect_params(config, transform_name, params, pairs) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let image = match load_image(input) {
        Ok(img) => img,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let overwrite = overwrite || config.defaults.overwrite;
    let out_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| sibling_output_path(input, &config.defaults.suffix));

    params.set("fname", &input.to_string_lossy());
    let ctx = TransformContext {
        source: Some(input.to_path_buf()),
        overwrite,
        output_dir: output.and_then(Path::parent).filter(|p| !p.as_os_str().is_empty()).map(Path::to_path_buf),
    };

    let result = match transform.apply(&image, &params, &ctx) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if let Some(extra) = &result.extra {
        println!("{}", extra);
    }

    if !result.save_image {
        return ExitCode::from(EXIT_SUCCESS);
    }

    if out_path.exists() && !overwrite {
        warn!(output = %out_path.display(), "output exists, skipping");
        eprintln!(
            "Skipping {}: Output file already exists and force_override is False.",
            out_path.display()
        );
        return ExitCode::from(EXIT_SUCCESS);
    }

    if let Err(e) = save_image(&result.image, &out_path) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }
    info!(input = %input.display(), output = %out_path.display(), transform = transform.name(), "processed image");
    println!("Saved: {}", out_path.display());
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the preview command
pub fn run_preview(
    config: &TilesmithConfig,
    transform_name: &str,
    input: &Path,
    output: &Path,
    scale: Option<u32>,
    pairs: &[String],
    params: Option<&str>,
) -> ExitCode {
    let scale = scale.unwrap_or(config.defaults.preview_scale);
    if !PREVIEW_SCALES.contains(&scale) {
        eprintln!("Error: --scale must be one of 1, 2, 4 or 8 (got {})", scale);
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let transform = match lookup_transform(transform_name) {
        Ok(t) => t,
        Err(code) => return code,
    };

    let mut params = match collect_params(config, transform_name, params, pairs) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let image = match load_image(input) {
        Ok(img) => img,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    params.set("fname", &input.to_string_lossy());
    let result = match transform.apply(&image, &params, &TransformContext::for_source(input)) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if let Some(extra) = &result.extra {
        println!("{}", extra);
    }

    let sheet = preview_sheet(&image, &result.image, scale);
    if let Err(e) = save_image(&sheet, output) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }
    println!("Saved preview: {} ({}x{})", output.display(), sheet.width(), sheet.height());
    ExitCode::from(EXIT_SUCCESS)
}
