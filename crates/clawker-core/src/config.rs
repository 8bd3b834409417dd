//! Settings and project configuration.
//!
//! Two YAML files are involved:
//! - `~/.local/clawker/settings.yml` — user-wide defaults (image, agent
//!   command, monitor ports).
//! - `clawker.yml` — per-project overrides, validated by `clawker config
//!   check`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The requested file does not exist. Carries the absolute path so the
    /// message is actionable when the input was relative.
    #[error("Configuration file not found: {}", path.display())]
    NotFound {
        /// Absolute path that was probed.
        path: PathBuf,
    },

    /// The file exists but is not valid YAML for the expected shape.
    #[error("Invalid configuration in {}: {source}", path.display())]
    Invalid {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// Filesystem failure reading or writing a config file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// User-wide settings stored under the clawker home.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Default container image for new agent containers.
    pub default_image: String,
    /// Command launched inside the container as the agent.
    pub agent_command: Vec<String>,
    /// Whether project directories are mounted read-write.
    pub mount_writable: bool,
    /// Host ports reserved for the monitor stack.
    pub monitor_ports: Vec<u16>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_image: "clawker/agent:latest".to_string(),
            agent_command: vec!["claude".to_string()],
            mount_writable: true,
            monitor_ports: vec![3000, 9090],
        }
    }
}

impl Settings {
    /// Load settings from the default location, falling back to defaults
    /// when the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = crate::paths::settings_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load settings from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] (with the absolutized path) when
    /// the file is missing, [`ConfigError::Invalid`] on parse failure.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let abs = absolutize(path);
        if !abs.exists() {
            return Err(ConfigError::NotFound { path: abs });
        }
        let raw = std::fs::read_to_string(&abs)?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Invalid { path: abs, source })
    }

    /// Write default settings to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn init(path: &Path) -> Result<Self, ConfigError> {
        let settings = Self::default();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_yaml::to_string(&settings)
            .expect("default settings always serialize");
        std::fs::write(path, body)?;
        Ok(settings)
    }
}

/// Per-project configuration (`clawker.yml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Project name; defaults to the directory name when empty.
    pub name: String,
    /// Container image override for this project.
    pub image: String,
    /// Environment passed to the agent container.
    pub env: BTreeMap<String, String>,
    /// Host:container port mappings, `"8080:80"` style.
    pub ports: Vec<String>,
    /// Extra bind mounts, `"/host/path:/container/path"` style.
    pub mounts: Vec<String>,
}

impl ProjectConfig {
    /// Load a project config from an explicit path.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Settings::load_from`].
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let abs = absolutize(path);
        if !abs.exists() {
            return Err(ConfigError::NotFound { path: abs });
        }
        let raw = std::fs::read_to_string(&abs)?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Invalid { path: abs, source })
    }

    /// Write the config to `path` as YAML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn store(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_yaml::to_string(self).expect("project config always serializes");
        std::fs::write(path, body)?;
        Ok(())
    }

    /// Validate the config, returning one message per problem found.
    ///
    /// An empty vector means the config is clean. Problems are reported all
    /// at once rather than failing on the first.
    pub fn check(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if !self.image.is_empty() && !self.image.contains(':') {
            problems.push(format!(
                "image '{}' has no tag; pin one explicitly",
                self.image
            ));
        }

        let mut seen_host_ports = Vec::new();
        for spec in &self.ports {
            match parse_port_spec(spec) {
                Some((host, _)) => {
                    if seen_host_ports.contains(&host) {
                        problems.push(format!("host port {host} mapped more than once"));
                    }
                    seen_host_ports.push(host);
                }
                None => problems.push(format!("invalid port mapping '{spec}'")),
            }
        }

        for mount in &self.mounts {
            if mount.splitn(2, ':').count() != 2 {
                problems.push(format!("invalid mount '{mount}', expected host:container"));
            }
        }

        problems
    }
}

/// Parse `"host:container"` into a numeric pair.
pub fn parse_port_spec(spec: &str) -> Option<(u16, u16)> {
    let (host, container) = spec.split_once(':')?;
    Some((host.parse().ok()?, container.parse().ok()?))
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
