//! Config file location.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

/// Application directory name under the user config directory.
const APP_DIR: &str = "troverai";
/// Config file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Resolves the config file path.
///
/// `--dir` wins, then `$XDG_CONFIG_HOME/troverai`, then
/// `~/.config/troverai`.
///
/// # Errors
///
/// Returns an error if neither `XDG_CONFIG_HOME` nor `HOME` is set (when
/// `dir` is `None`).
pub fn resolve_config_path(dir: Option<&Path>) -> Result<PathBuf> {
    config_path_from(dir, |key| std::env::var_os(key).map(PathBuf::from))
}

fn config_path_from(
    dir: Option<&Path>,
    lookup: impl Fn(&str) -> Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(dir) = dir {
        return Ok(dir.join(CONFIG_FILE_NAME));
    }

    // An empty or relative XDG_CONFIG_HOME is invalid and ignored.
    let config_home = lookup("XDG_CONFIG_HOME")
        .filter(|p| p.is_absolute())
        .or_else(|| lookup("HOME").map(|home| home.join(".config")));
    let Some(config_home) = config_home else {
        bail!("cannot locate the config directory: HOME is not set (use --dir)");
    };
    Ok(config_home.join(APP_DIR).join(CONFIG_FILE_NAME))
}
