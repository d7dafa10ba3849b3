//! Configuration loading and discovery for `tilesmith.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::TilesmithConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// File name searched for by [`find_config`]
pub const CONFIG_FILE: &str = "tilesmith.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse tilesmith.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override input folder
    pub input: Option<PathBuf>,
    /// Override output folder
    pub output: Option<PathBuf>,
    /// Override the overwrite flag
    pub overwrite: Option<bool>,
    /// Override preview upscale
    pub preview_scale: Option<u32>,
    /// Override output name suffix
    pub suffix: Option<String>,
}

/// Find tilesmith.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for tilesmith.toml
/// 2. Check XDG_CONFIG_HOME/tilesmith/tilesmith.toml (or ~/.config/tilesmith/tilesmith.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find tilesmith.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("tilesmith").join(CONFIG_FILE);
    config_path.exists().then_some(config_path)
}

/// Find tilesmith.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration.
///
/// An explicit path must exist. Without one, the discovered config is used,
/// or the defaults when there is none. Relative folders in a config file are
/// resolved against the file's directory.
pub fn load_config(path: Option<&Path>) -> Result<TilesmithConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => {
            debug!("no tilesmith.toml found, using defaults");
            Ok(default_config())
        }
    }
}

fn load_config_file(path: &Path) -> Result<TilesmithConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let mut config: TilesmithConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    if let Some(root) = project_root(path) {
        config.project.input = resolve_path(root, &config.project.input);
        config.project.output = resolve_path(root, &config.project.output);
    }
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Configuration used when no tilesmith.toml is found.
pub fn default_config() -> TilesmithConfig {
    TilesmithConfig::default()
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut TilesmithConfig, overrides: &CliOverrides) {
    if let Some(ref input) = overrides.input {
        config.project.input = input.clone();
    }
    if let Some(ref output) = overrides.output {
        config.project.output = output.clone();
    }
    if let Some(overwrite) = overrides.overwrite {
        config.defaults.overwrite = overwrite;
    }
    if let Some(scale) = overrides.preview_scale {
        config.defaults.preview_scale = scale;
    }
    if let Some(ref suffix) = overrides.suffix {
        config.defaults.suffix = suffix.clone();
    }
}

/// Get the project root directory from a config file path.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent().filter(|p| !p.as_os_str().is_empty())
}

/// Resolve a path relative to the project root.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &Path, contents: &str) -> PathBuf {
        let config_path = dir.join(CONFIG_FILE);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(contents.as_bytes())
            .expect("should write config content");
        config_path
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "");
        assert_eq!(find_config_from(temp.path().to_path_buf()), Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "");
        let subdir = temp.path().join("input").join("sprites");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        assert_eq!(find_config_from(subdir), Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        assert_eq!(find_config_from(temp.path().to_path_buf()), None);
    }

    #[test]
    fn test_load_config_resolves_folders() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(
            temp.path(),
            r#"
[project]
input = "assets"
output = "/abs/out"

[defaults]
preview_scale = 8
"#,
        );

        let config = load_config(Some(&config_path)).expect("should load valid config");
        assert_eq!(config.project.input, temp.path().join("assets"));
        assert_eq!(config.project.output, PathBuf::from("/abs/out"));
        assert_eq!(config.defaults.preview_scale, 8);
    }

    #[test]
    fn test_load_config_missing_explicit_file_errors() {
        let temp = TempDir::new().expect("should create temp dir");
        let result = load_config(Some(&temp.path().join("nonexistent.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "this is not valid toml {{{");
        assert!(matches!(load_config(Some(&config_path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "[defaults]\npreview_scale = 99\n");

        let err = load_config(Some(&config_path)).expect_err("should fail validation");
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("  - tilesmith.toml: 'defaults.preview_scale'"));
    }

    #[test]
    #[serial]
    fn test_load_config_discovers_from_cwd() {
        let temp = TempDir::new().expect("should create temp dir");
        write_config(temp.path(), "[defaults]\nsuffix = \"_gb\"\n");
        let nested = temp.path().join("a/b");
        fs::create_dir_all(&nested).expect("should create nested dirs");

        let original = env::current_dir().expect("should read cwd");
        env::set_current_dir(&nested).expect("should enter nested dir");
        let result = load_config(None);
        env::set_current_dir(original).expect("should restore cwd");

        assert_eq!(result.expect("should load discovered config").defaults.suffix, "_gb");
    }

    #[test]
    fn test_merge_cli_overrides() {
        let mut config = default_config();
        let overrides = CliOverrides {
            output: Some(PathBuf::from("dist")),
            overwrite: Some(true),
            preview_scale: Some(2),
            ..Default::default()
        };

        merge_cli_overrides(&mut config, &overrides);
        assert_eq!(config.project.output, PathBuf::from("dist"));
        assert_eq!(config.project.input, PathBuf::from("input"));
        assert!(config.defaults.overwrite);
        assert_eq!(config.defaults.preview_scale, 2);
        assert_eq!(config.defaults.suffix, "_processed");
    }

    #[test]
    fn test_merge_cli_overrides_input_and_suffix() {
        let mut config = default_config();
        let overrides =
            CliOverrides { input: Some(PathBuf::from("art")), suffix: Some(String::new()), ..Default::default() };
        merge_cli_overrides(&mut config, &overrides);
        assert_eq!(config.project.input, PathBuf::from("art"));
        assert_eq!(config.defaults.suffix, "");
    }

    #[test]
    fn test_resolve_path() {
        let root = Path::new("/project");
        assert_eq!(resolve_path(root, Path::new("/other/path")), PathBuf::from("/other/path"));
        assert_eq!(resolve_path(root, Path::new("input")), PathBuf::from("/project/input"));
    }

    #[test]
    fn test_project_root() {
        assert_eq!(project_root(Path::new("/project/tilesmith.toml")), Some(Path::new("/project")));
        assert_eq!(project_root(Path::new("tilesmith.toml")), None);
    }
}
