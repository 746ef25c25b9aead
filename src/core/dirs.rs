use crate::core::error::{FlowNavigatorError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "flow-navigator";

fn home_subdir(subdir: &str) -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(subdir))
        .ok_or(FlowNavigatorError::ConfigDirectoryNotFound)
}

/// Where `settings.json` lives. Honors `XDG_CONFIG_HOME` on unix-likes.
pub fn get_config_directory() -> Result<PathBuf> {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => match std::env::var("XDG_CONFIG_HOME") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => home_subdir(".config")?,
        },
        "macos" => home_subdir("Library/Application Support")?,
        _ => dirs::config_dir().ok_or(FlowNavigatorError::ConfigDirectoryNotFound)?,
    };

    Ok(base.join(APP_DIR))
}

/// Root of the per-repository snapshot caches. Honors `XDG_CACHE_HOME`.
pub fn get_cache_directory() -> Result<PathBuf> {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => match std::env::var("XDG_CACHE_HOME") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => home_subdir(".cache")?,
        },
        "macos" => home_subdir("Library/Caches")?,
        _ => dirs::cache_dir().ok_or(FlowNavigatorError::ConfigDirectoryNotFound)?,
    };

    Ok(base.join(APP_DIR))
}
