//! Configuration, log and report locations
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/api-harness/`, `~/.local/share/api-harness/logs/`
//! - macOS: `~/Library/Application Support/api-harness/`
//! - Windows: `%APPDATA%\api-harness\`

use std::io;
use std::path::{Path, PathBuf};

/// Name used for the config and data directories
const APP_NAME: &str = "api-harness";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the path to the default log directory
///
/// Falls back to `./outputs/logs` when no home directory can be determined.
pub fn default_log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("outputs").join("logs"))
}

/// Ensure a directory exists, creating parents as needed
pub fn ensure_dir(dir: &Path) -> io::Result<PathBuf> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(dir.to_path_buf())
}
