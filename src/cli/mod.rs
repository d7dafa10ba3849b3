//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod apply;
mod batch;
mod list;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::{load_config, TilesmithConfig};
use crate::params::{ParamError, Params};
use crate::transforms::{self, Transform};

/// Process exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Tilesmith - Tile analysis and sprite export for retro game art
#[derive(Parser)]
#[command(name = "tilesmith")]
#[command(about = "Tile analysis, palette quantization and sprite export for 8x8 tile art")]
#[command(version)]
pub struct Cli {
    /// Use this config file instead of searching for tilesmith.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show per-image progress and info logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available transforms
    List,

    /// Apply a transform to a single image
    Apply {
        /// Transform name (see `tilesmith list`)
        transform: String,

        /// Input image
        input: PathBuf,

        /// Output image (default: next to the input with the configured suffix)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Parameter as key=value (repeatable)
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
        param: Vec<String>,

        /// Parameters as one "key=value key2=value" string
        #[arg(long, value_name = "PARAMS")]
        params: Option<String>,

        /// Replace an existing output file
        #[arg(long)]
        overwrite: bool,
    },

    /// Render original and transformed image stacked, upscaled
    Preview {
        /// Transform name (see `tilesmith list`)
        transform: String,

        /// Input image
        input: PathBuf,

        /// Output preview image
        #[arg(short, long)]
        output: PathBuf,

        /// Upscale factor: 1, 2, 4 or 8 (default from config)
        #[arg(long)]
        scale: Option<u32>,

        /// Parameter as key=value (repeatable)
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
        param: Vec<String>,

        /// Parameters as one "key=value key2=value" string
        #[arg(long, value_name = "PARAMS")]
        params: Option<String>,
    },

    /// Apply a transform to every image of a folder
    Batch {
        /// Transform name (default: defaults.transform from config)
        transform: Option<String>,

        /// Input folder (overrides project.input)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output folder (overrides project.output)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Process only this subfolder of the input folder
        #[arg(long, value_name = "NAME")]
        subfolder: Option<String>,

        /// Output name suffix (overrides defaults.suffix)
        #[arg(long)]
        suffix: Option<String>,

        /// Replace existing output files
        #[arg(long)]
        overwrite: bool,

        /// Parameter as key=value (repeatable)
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
        param: Vec<String>,

        /// Parameters as one "key=value key2=value" string
        #[arg(long, value_name = "PARAMS")]
        params: Option<String>,
    },

    /// List subfolders of the input folder
    Folders {
        /// Input folder (overrides project.input)
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    crate::logging::init(cli.verbose);

    if let Commands::List = cli.command {
        return list::run_list();
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match cli.command {
        Commands::List => list::run_list(),
        Commands::Apply { transform, input, output, param, params, overwrite } => apply::run_apply(
            &config,
            &transform,
            &input,
            output.as_deref(),
            &param,
            params.as_deref(),
            overwrite,
        ),
        Commands::Preview { transform, input, output, scale, param, params } => {
            apply::run_preview(&config, &transform, &input, &output, scale, &param, params.as_deref())
        }
        Commands::Batch { transform, input, output, subfolder, suffix, overwrite, param, params } => {
            batch::run_batch(
                config,
                batch::BatchArgs {
                    transform,
                    input,
                    output,
                    subfolder,
                    suffix,
                    overwrite,
                    param,
                    params,
                    verbose: cli.verbose,
                },
            )
        }
        Commands::Folders { input } => batch::run_folders(config, input),
    }
}

/// Look up a transform, printing an error for unknown names.
pub(crate) fn lookup_transform(name: &str) -> Result<&'static dyn Transform, ExitCode> {
    transforms::find(name).ok_or_else(|| {
        eprintln!("Error: Unknown transform '{}'", name);
        eprintln!("Available transforms: {}", transforms::names().join(", "));
        ExitCode::from(EXIT_INVALID_ARGS)
    })
}

/// Parameters for one command: config table, then `--params`, then `-p` flags.
pub(crate) fn collect_params(
    config: &TilesmithConfig,
    transform: &str,
    params: Option<&str>,
    pairs: &[String],
) -> Result<Params, ParamError> {
    let mut merged = config.params_for(transform);
    if let Some(params) = params {
        merged.merge(&Params::parse(params));
    }
    merged.merge(&Params::from_pairs(pairs)?);
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamValue;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_apply_with_params() {
        let cli = Cli::try_parse_from([
            "tilesmith",
            "apply",
            "quantize",
            "in.png",
            "-p",
            "palette=gray",
            "--params",
            "brightness=1,2",
            "-v",
        ])
        .expect("should parse apply");

        assert!(cli.verbose);
        match cli.command {
            Commands::Apply { transform, input, param, params, overwrite, .. } => {
                assert_eq!(transform, "quantize");
                assert_eq!(input, PathBuf::from("in.png"));
                assert_eq!(param, vec!["palette=gray".to_string()]);
                assert_eq!(params.as_deref(), Some("brightness=1,2"));
                assert!(!overwrite);
            }
            _ => panic!("expected apply"),
        }
    }

    #[test]
    fn test_parse_batch_defaults() {
        let cli = Cli::try_parse_from(["tilesmith", "--config", "t.toml", "batch"]).expect("should parse batch");
        assert_eq!(cli.config, Some(PathBuf::from("t.toml")));
        match cli.command {
            Commands::Batch { transform, subfolder, overwrite, .. } => {
                assert!(transform.is_none());
                assert!(subfolder.is_none());
                assert!(!overwrite);
            }
            _ => panic!("expected batch"),
        }
    }

    #[test]
    fn test_preview_requires_output() {
        assert!(Cli::try_parse_from(["tilesmith", "preview", "gaps", "in.png"]).is_err());
    }

    #[test]
    fn test_collect_params_precedence() {
        let config: TilesmithConfig =
            toml::from_str("[transforms.quantize]\npalette = \"gray\"\ncontrast = [1]\n").expect("should parse");

        let params = collect_params(
            &config,
            "quantize",
            Some("palette=dmg brightness=1,2"),
            &["brightness=3".to_string()],
        )
        .expect("should collect params");

        assert_eq!(params.get_str("palette").as_deref(), Some("dmg"));
        assert_eq!(params.get("brightness"), Some(&ParamValue::Int(3)));
        assert!(params.contains("contrast"));
    }

    #[test]
    fn test_collect_params_rejects_malformed_pair() {
        let config = TilesmithConfig::default();
        assert!(collect_params(&config, "gaps", None, &["gap".to_string()]).is_err());
    }
}
