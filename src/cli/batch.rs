//! Folder command implementations (batch, folders)

use std::path::PathBuf;
use std::process::ExitCode;

use crate::batch::{subfolders, BatchOptions, BatchRunner, ConsoleProgress};
use crate::config::{merge_cli_overrides, CliOverrides, TilesmithConfig};

use super::{collect_params, lookup_transform, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Arguments of the batch command
pub struct BatchArgs {
    pub transform: Option<String>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub subfolder: Option<String>,
    pub suffix: Option<String>,
    pub overwrite: bool,
    pub param: Vec<String>,
    pub params: Option<String>,
    pub verbose: bool,
}

/// Execute the batch command
pub fn run_batch(mut config: TilesmithConfig, args: BatchArgs) -> ExitCode {
    let Some(transform_name) = args.transform.or_else(|| config.defaults.transform.clone()) else {
        eprintln!("Error: No transform given and defaults.transform is not set");
        return ExitCode::from(EXIT_INVALID_ARGS);
    };
    let transform = match lookup_transform(&transform_name) {
        Ok(t) => t,
        Err(code) => return code,
    };

    let overrides = CliOverrides {
        input: args.input,
        output: args.output,
        overwrite: args.overwrite.then_some(true),
        suffix: args.suffix,
        ..Default::default()
    };
    merge_cli_overrides(&mut config, &overrides);

    let params = match collect_params(&config, &transform_name, args.params.as_deref(), &args.param) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let (input_dir, output_dir) = match &args.subfolder {
        Some(name) => (config.project.input.join(name), config.project.output.join(name)),
        None => (config.project.input.clone(), config.project.output.clone()),
    };

    let options = BatchOptions::new(input_dir, output_dir)
        .with_overwrite(config.defaults.overwrite)
        .with_suffix(config.defaults.suffix.clone())
        .with_params(params);

    let reporter = ConsoleProgress::new().with_verbose(args.verbose);
    match BatchRunner::new(transform, options).run(&reporter) {
        Ok(summary) if summary.is_success() => ExitCode::from(EXIT_SUCCESS),
        Ok(summary) => {
            eprintln!("Error: {} of {} images failed", summary.failed, summary.total());
            ExitCode::from(EXIT_ERROR)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Execute the folders command
pub fn run_folders(mut config: TilesmithConfig, input: Option<PathBuf>) -> ExitCode {
    merge_cli_overrides(&mut config, &CliOverrides { input, ..Default::default() });

    match subfolders(&config.project.input) {
        Ok(names) => {
            for name in names {
                println!("{}", name);
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
