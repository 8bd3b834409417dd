//! Host-side plumbing for agent containers.
//!
//! [`SocketBridge`] owns the per-container socket directory that gets bind
//! mounted into the container so the agent can reach host tooling.
//! [`HostProxy`] validates the allow-listed host port forwards used by the
//! monitor stack.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while preparing host plumbing.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// A forward spec was not `host:container` with numeric ports.
    #[error("invalid port forward '{0}', expected host:container")]
    InvalidForward(String),

    /// A requested host port is outside the allowed range.
    #[error("host port {0} is not in the allowed range (1024-65535)")]
    PortNotAllowed(u16),

    /// Filesystem failure creating socket directories.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-container agent socket bridge.
#[derive(Debug, Clone)]
pub struct SocketBridge {
    root: PathBuf,
}

impl SocketBridge {
    /// Bridge rooted at the clawker sockets directory.
    pub fn new() -> Self {
        Self {
            root: crate::paths::sockets_dir(),
        }
    }

    /// Bridge rooted at an explicit directory (tests).
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    /// Host directory holding sockets for `container`.
    pub fn socket_dir(&self, container: &str) -> PathBuf {
        self.root.join(container)
    }

    /// Create the socket directory and return the bind-mount spec for it.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created.
    pub fn prepare(&self, container: &str) -> Result<String, BridgeError> {
        let dir = self.socket_dir(container);
        std::fs::create_dir_all(&dir)?;
        Ok(format!("{}:/run/clawker", dir.display()))
    }

    /// Remove the socket directory for `container`, ignoring absence.
    ///
    /// # Errors
    ///
    /// Returns an error on filesystem failures other than "not found".
    pub fn cleanup(&self, container: &str) -> Result<(), BridgeError> {
        match std::fs::remove_dir_all(self.socket_dir(container)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Default for SocketBridge {
    fn default() -> Self {
        Self::new()
    }
}

/// Validated host port forwards for the monitor stack.
#[derive(Debug, Clone, Default)]
pub struct HostProxy {
    forwards: Vec<(u16, u16)>,
}

impl HostProxy {
    /// Validate `host:container` forward specs into a proxy plan.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed specs or privileged host ports.
    pub fn new(specs: &[String]) -> Result<Self, BridgeError> {
        let mut forwards = Vec::new();
        for spec in specs {
            let (host, container) = crate::config::parse_port_spec(spec)
                .ok_or_else(|| BridgeError::InvalidForward(spec.clone()))?;
            if host < 1024 {
                return Err(BridgeError::PortNotAllowed(host));
            }
            forwards.push((host, container));
        }
        Ok(Self { forwards })
    }

    /// The validated `(host, container)` pairs.
    pub fn forwards(&self) -> &[(u16, u16)] {
        &self.forwards
    }

    /// Forward specs in the runtime's `-p` format.
    pub fn port_args(&self) -> Vec<String> {
        self.forwards
            .iter()
            .map(|(h, c)| format!("{h}:{c}"))
            .collect()
    }
}
