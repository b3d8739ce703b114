use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::GosConfig;

/// Project-level config file name
pub const CONFIG_FILE: &str = "gos.toml";

/// Discovers gos configuration by traversing up the directory tree,
/// falling back to the user's global config
pub fn discover_config(start_dir: &Path) -> Option<PathBuf> {
    let mut current = Some(start_dir);

    while let Some(dir) = current {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.is_file() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    let global_config = global_config_path()?;
    global_config.is_file().then_some(global_config)
}

/// `$XDG_CONFIG_HOME/gos/config.toml`, default `~/.config/gos/config.toml`
pub fn global_config_path() -> Option<PathBuf> {
    let base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => dirs::home_dir()?.join(".config"),
    };
    Some(base.join("gos").join("config.toml"))
}

/// Loads configuration with auto-discovery support
///
/// An explicit path must exist. Without one, the discovered file is used, and
/// when nothing is found the built-in defaults apply.
pub fn load_config_with_discovery(explicit_path: Option<&str>) -> Result<GosConfig> {
    if let Some(config_path) = explicit_path {
        return GosConfig::from_file(config_path);
    }

    let current_dir =
        std::env::current_dir().context("Failed to get current directory for config discovery")?;

    match discover_config(&current_dir) {
        Some(path) => {
            debug!(path = %path.display(), "using config");
            GosConfig::from_file(&path)
        }
        None => {
            debug!("no configuration file found, using defaults");
            Ok(GosConfig::default())
        }
    }
}
