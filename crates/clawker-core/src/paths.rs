//! Well-known paths under the clawker home directory.

use dirs::home_dir;
use std::path::PathBuf;

/// Returns the primary clawker directory, or None if the user's home cannot be resolved.
pub fn try_clawker_home() -> Option<PathBuf> {
    if let Ok(val) = std::env::var("CLAWKER_HOME") {
        return Some(PathBuf::from(val));
    }
    home_dir().map(|h| h.join(".local").join("clawker"))
}

/// Returns the canonical clawker home directory (`~/.local/clawker`).
///
/// # Panics
///
/// Panics if neither `CLAWKER_HOME` is set nor the user's home directory can
/// be resolved. On a normal workstation this should never happen.
pub fn clawker_home() -> PathBuf {
    try_clawker_home().expect("Could not determine home directory. Set CLAWKER_HOME to override.")
}

/// Settings file path: ~/.local/clawker/settings.yml
pub fn settings_path() -> PathBuf {
    clawker_home().join("settings.yml")
}

/// Update-check cache path: ~/.local/clawker/update-check.yml
pub fn update_cache_path() -> PathBuf {
    clawker_home().join("update-check.yml")
}

/// Registered projects directory: ~/.local/clawker/projects
pub fn projects_dir() -> PathBuf {
    clawker_home().join("projects")
}

/// Per-container agent socket directory: ~/.local/clawker/sockets
pub fn sockets_dir() -> PathBuf {
    clawker_home().join("sockets")
}

/// Logs directory: ~/.local/clawker/logs
pub fn log_dir() -> PathBuf {
    clawker_home().join("logs")
}
