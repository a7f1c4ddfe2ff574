//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory),
//! then applying environment variable overrides.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use archviz::config::AppConfig;

/// Overrides `limits.max_nodes`.
pub const ENV_MAX_NODES: &str = "ARCHVIZ_MAX_NODES";
/// Overrides `limits.max_edges`.
pub const ENV_MAX_EDGES: &str = "ARCHVIZ_MAX_EDGES";
/// Overrides `output.dir`.
pub const ENV_OUTPUT_DIR: &str = "ARCHVIZ_OUTPUT_DIR";

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (archviz/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// Environment overrides are applied to whichever configuration is found.
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
/// - An environment override holds an invalid value
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, ConfigError> {
    let mut config = find_config(explicit_path)?;
    apply_overrides(&mut config, |key| env::var(key).ok())?;
    Ok(config)
}

fn find_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, ConfigError> {
    // 1. Try the explicitly provided path first if available
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    // 2. Try the local project directory
    let local_config = Path::new("archviz/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    // 3. Try the platform-specific config directory
    if let Some(proj_dirs) = ProjectDirs::from("com", "archviz", "archviz") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    // 4. If no config is found, return default config
    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Applies environment overrides read through `lookup`.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] when a limit override is not a
/// positive integer.
pub fn apply_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(max_nodes) = read_limit(&lookup, ENV_MAX_NODES)? {
        config.limits_mut().set_max_nodes(max_nodes);
    }
    if let Some(max_edges) = read_limit(&lookup, ENV_MAX_EDGES)? {
        config.limits_mut().set_max_edges(max_edges);
    }
    if let Some(dir) = lookup(ENV_OUTPUT_DIR).filter(|dir| !dir.is_empty()) {
        debug!(dir; "Output directory overridden from environment");
        config.output_mut().set_dir(dir);
    }
    Ok(())
}

fn read_limit<F>(lookup: &F, key: &str) -> Result<Option<usize>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => {
            debug!(key, value; "Limit overridden from environment");
            Ok(Some(value))
        }
        _ => Err(ConfigError::Validation(format!(
            "{key} must be a positive integer, got `{raw}`"
        ))),
    }
}

/// Load configuration from a TOML file
///
/// # Errors
///
/// Returns error if:
/// - File doesn't exist
/// - File cannot be read
/// - TOML parsing fails
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;

    toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use archviz::export::BackendKind;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_load_full_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r##"
[limits]
max_nodes = 10

[icons]
allowed_prefixes = ["diagrams.azure."]
annotate_fallback = false
strict_allowlist = ["diagrams.azure.web.AppServices"]

[[icons.extra]]
id = "diagrams.azure.web.Custom"
shape = "hexagon"
fill = "#112233"

[output]
dir = "out/diagrams"
url_prefix = "/img"

[render]
backend = "native"

[model]
provider = "ollama"
model = "llama3"
timeout_secs = 5
"##,
        )
        .unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.limits().max_nodes(), 10);
        assert_eq!(config.limits().max_edges(), 120);
        assert!(!config.icons().resolver().annotate_fallback());
        assert_eq!(config.icons().extra().len(), 1);
        assert_eq!(config.output().dir(), Path::new("out/diagrams"));
        assert_eq!(config.output().url_for("a.png"), "/img/a.png");
        assert_eq!(config.output().download_for("a.png"), "/download/a.png");
        assert_eq!(config.render().backend(), BackendKind::Native);
        assert_eq!(config.model().provider(), "ollama");
        assert_eq!(config.model().timeout().as_secs(), 5);
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = find_config(Some("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile(_)));
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[render]\nbackend = \"svg\"\n").unwrap();
        assert!(matches!(
            load_config_file(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        apply_overrides(
            &mut config,
            lookup(&[
                (ENV_MAX_NODES, "5"),
                (ENV_MAX_EDGES, " 7 "),
                (ENV_OUTPUT_DIR, "/tmp/archviz"),
            ]),
        )
        .unwrap();
        assert_eq!(config.limits().max_nodes(), 5);
        assert_eq!(config.limits().max_edges(), 7);
        assert_eq!(config.output().dir(), Path::new("/tmp/archviz"));
    }

    #[test]
    fn test_invalid_env_override() {
        let mut config = AppConfig::default();
        for bad in ["0", "-1", "many"] {
            let err = apply_overrides(&mut config, lookup(&[(ENV_MAX_NODES, bad)])).unwrap_err();
            assert!(err.to_string().contains(ENV_MAX_NODES), "{err}");
        }
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let mut config = AppConfig::default();
        apply_overrides(&mut config, lookup(&[])).unwrap();
        assert_eq!(config.limits().max_nodes(), 60);
        assert_eq!(config.output().dir(), Path::new("static/diagrams"));
    }
}
