//! Engine configuration discovery.
//!
//! A run uses the `--config` file when given. Otherwise the first existing
//! file among the implicit locations wins, and the built-in defaults apply
//! when there is none.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};

use lanes::config::EngineConfig;

use crate::error::CliError;

/// Checked relative to the working directory.
const LOCAL_CONFIG: &str = "lanes/config.toml";

/// Loads the engine configuration for a run.
///
/// # Errors
///
/// - [`CliError::MissingConfig`] when `explicit_path` names no file.
/// - [`CliError::Toml`] when the chosen file does not parse.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<EngineConfig, CliError> {
    if let Some(path) = explicit_path {
        return read_config(path.as_ref());
    }

    match implicit_paths().into_iter().find(|path| path.is_file()) {
        Some(path) => read_config(&path),
        None => {
            debug!("Using built-in engine configuration");
            Ok(EngineConfig::default())
        }
    }
}

/// Implicit configuration locations, most specific first.
fn implicit_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
    match ProjectDirs::from("io", "Lanes", "lanes") {
        Some(dirs) => paths.push(dirs.config_dir().join("config.toml")),
        None => debug!("No platform configuration directory"),
    }
    paths
}

fn read_config(path: &Path) -> Result<EngineConfig, CliError> {
    if !path.is_file() {
        return Err(CliError::MissingConfig(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    let config = toml::from_str(&content)
        .map_err(|err| CliError::toml("configuration", &content, &err))?;
    info!(path:? = path; "Loaded engine configuration");
    Ok(config)
}
