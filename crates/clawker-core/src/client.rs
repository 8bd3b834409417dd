//! Container runtime client.
//!
//! The CLI never talks to the daemon directly; it goes through the
//! [`ContainerClient`] trait so commands can be tested against an in-memory
//! double. The production implementation, [`DockerCli`], shells out to the
//! `docker` binary and parses its JSON output.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// Label attached to every container clawker creates, used to scope listings.
pub const CLAWKER_LABEL: &str = "dev.clawker.managed";

/// Errors surfaced by the container runtime.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The named container or image does not exist.
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// `"container"` or `"image"`.
        kind: &'static str,
        /// The reference that failed to resolve.
        name: String,
    },

    /// The daemon (or the `docker` binary itself) is unreachable.
    #[error("cannot connect to the container daemon")]
    DaemonUnreachable {
        /// Raw detail from the runtime, kept for the rendered suggestion.
        details: String,
    },

    /// The runtime command ran but failed for another reason.
    #[error("container runtime error: {stderr}")]
    CommandFailed {
        /// Trimmed stderr of the failing invocation.
        stderr: String,
    },

    /// The runtime produced output we could not parse.
    #[error("unexpected runtime output: {0}")]
    BadOutput(String),

    /// Process spawn / IO failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Remediation hints for errors the user can act on.
    ///
    /// The CLI renders these as muted lines under the error message.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::DaemonUnreachable { .. } => vec![
                "Check that the container daemon is running.".to_string(),
                "On macOS/Windows, start Docker Desktop; on Linux try 'systemctl start docker'."
                    .to_string(),
            ],
            Self::NotFound { kind, name } => {
                vec![format!("Run 'clawker {kind} list' to see known {kind}s, or check the spelling of '{name}'.")]
            }
            _ => Vec::new(),
        }
    }
}

/// One container as reported by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    /// Runtime identifier (short form).
    pub id: String,
    /// Primary name without the leading slash.
    pub name: String,
    /// Image reference the container was created from.
    pub image: String,
    /// Coarse state: `running`, `paused`, `exited`, ...
    pub state: String,
    /// Human status line (`Up 2 hours`, `Exited (0) ...`).
    pub status: String,
}

/// One image as reported by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSummary {
    /// Image identifier.
    pub id: String,
    /// `repo:tag` reference.
    pub reference: String,
    /// Human-readable size as reported by the runtime.
    pub size: String,
    /// Creation timestamp / age as reported by the runtime.
    pub created: String,
}

/// Options for creating an agent container.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Container name.
    pub name: String,
    /// Image reference.
    pub image: String,
    /// Environment variables.
    pub env: Vec<(String, String)>,
    /// Host:container port mappings.
    pub ports: Vec<String>,
    /// Bind mounts, `host:container` form.
    pub mounts: Vec<String>,
    /// Working directory inside the container.
    pub workdir: Option<String>,
    /// Command to run; empty means the image default.
    pub command: Vec<String>,
}

/// Options for building an image.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Build context directory.
    pub context: PathBuf,
    /// Dockerfile path relative to the context, when not the default.
    pub dockerfile: Option<PathBuf>,
    /// Tag applied to the built image.
    pub tag: String,
}

/// Build progress callback: `(completed_steps, total_steps)`.
pub type BuildProgress<'a> = &'a (dyn Fn(u64, u64) + Send + Sync);

/// Interface to the container runtime.
///
/// This is the only seam between the command surface and the daemon; the
/// factory hands out one shared instance per process.
#[async_trait]
pub trait ContainerClient: Send + Sync {
    /// Verify the daemon is reachable, returning its version string.
    async fn ping(&self) -> Result<String, ClientError>;

    /// List clawker-managed containers (all states).
    async fn list_containers(&self) -> Result<Vec<ContainerSummary>, ClientError>;

    /// Inspect a single container, returning the raw runtime JSON.
    async fn inspect_container(&self, name: &str) -> Result<serde_json::Value, ClientError>;

    /// Create a container, returning its id.
    async fn create_container(&self, opts: &CreateOptions) -> Result<String, ClientError>;

    /// Start a container.
    async fn start_container(&self, name: &str) -> Result<(), ClientError>;

    /// Stop a container.
    async fn stop_container(&self, name: &str) -> Result<(), ClientError>;

    /// Pause a container.
    async fn pause_container(&self, name: &str) -> Result<(), ClientError>;

    /// Resume a paused container.
    async fn unpause_container(&self, name: &str) -> Result<(), ClientError>;

    /// Remove a container.
    async fn remove_container(&self, name: &str, force: bool) -> Result<(), ClientError>;

    /// List local images.
    async fn list_images(&self) -> Result<Vec<ImageSummary>, ClientError>;

    /// Inspect a single image, returning the raw runtime JSON.
    async fn inspect_image(&self, reference: &str) -> Result<serde_json::Value, ClientError>;

    /// Build an image, reporting step progress through `progress`.
    async fn build_image(
        &self,
        opts: &BuildOptions,
        progress: BuildProgress<'_>,
    ) -> Result<String, ClientError>;

    /// Remove an image.
    async fn remove_image(&self, reference: &str, force: bool) -> Result<(), ClientError>;
}

/// Production client that drives the `docker` binary.
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: PathBuf,
}

impl DockerCli {
    /// Locate the `docker` binary on PATH.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::DaemonUnreachable`] when no binary is found;
    /// from the user's point of view there is no runtime to talk to.
    pub fn discover() -> Result<Self, ClientError> {
        let binary = which::which("docker").map_err(|e| ClientError::DaemonUnreachable {
            details: format!("docker binary not found on PATH: {e}"),
        })?;
        Ok(Self { binary })
    }

    /// Build a client around an explicit binary path (tests point this at a
    /// stub script).
    pub fn with_binary(binary: PathBuf) -> Self {
        Self { binary }
    }

    /// Argument vector for `create`, exposed for unit tests.
    fn create_args(opts: &CreateOptions) -> Vec<String> {
        let mut args = vec![
            "create".to_string(),
            "--name".to_string(),
            opts.name.clone(),
            "--label".to_string(),
            format!("{CLAWKER_LABEL}=true"),
        ];
        for (k, v) in &opts.env {
            args.push("-e".to_string());
            args.push(format!("{k}={v}"));
        }
        for port in &opts.ports {
            args.push("-p".to_string());
            args.push(port.clone());
        }
        for mount in &opts.mounts {
            args.push("-v".to_string());
            args.push(mount.clone());
        }
        if let Some(workdir) = &opts.workdir {
            args.push("-w".to_string());
            args.push(workdir.clone());
        }
        args.push(opts.image.clone());
        args.extend(opts.command.iter().cloned());
        args
    }

    async fn run(&self, args: &[&str]) -> Result<String, ClientError> {
        tracing::debug!(?args, "docker invocation");
        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }
        Err(classify_failure(&stderr, args))
    }

    async fn run_owned(&self, args: &[String]) -> Result<String, ClientError> {
        let borrowed: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(&borrowed).await
    }
}

/// Map a non-zero docker exit onto the error taxonomy.
fn classify_failure(stderr: &str, args: &[&str]) -> ClientError {
    let lower = stderr.to_lowercase();
    if lower.contains("cannot connect to the docker daemon")
        || lower.contains("connection refused")
        || lower.contains("is the docker daemon running")
    {
        return ClientError::DaemonUnreachable {
            details: stderr.to_string(),
        };
    }
    if lower.contains("no such container") {
        return ClientError::NotFound {
            kind: "container",
            name: args.last().unwrap_or(&"").to_string(),
        };
    }
    if lower.contains("no such image") || lower.contains("no such object") {
        return ClientError::NotFound {
            kind: "image",
            name: args.last().unwrap_or(&"").to_string(),
        };
    }
    ClientError::CommandFailed {
        stderr: stderr.to_string(),
    }
}

/// Shape of one `docker ps --format json` line.
#[derive(Debug, Deserialize)]
struct PsLine {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Names")]
    names: String,
    #[serde(rename = "Image")]
    image: String,
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "Status")]
    status: String,
}

/// Shape of one `docker images --format json` line.
#[derive(Debug, Deserialize)]
struct ImageLine {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Repository")]
    repository: String,
    #[serde(rename = "Tag")]
    tag: String,
    #[serde(rename = "Size")]
    size: String,
    #[serde(rename = "CreatedSince")]
    created: String,
}

#[async_trait]
impl ContainerClient for DockerCli {
    async fn ping(&self) -> Result<String, ClientError> {
        let out = self
            .run(&["version", "--format", "{{.Server.Version}}"])
            .await?;
        Ok(out.trim().to_string())
    }

    async fn list_containers(&self) -> Result<Vec<ContainerSummary>, ClientError> {
        let out = self
            .run(&[
                "ps",
                "-a",
                "--filter",
                &format!("label={CLAWKER_LABEL}"),
                "--format",
                "json",
            ])
            .await?;
        let mut containers = Vec::new();
        for line in out.lines().filter(|l| !l.trim().is_empty()) {
            let parsed: PsLine = serde_json::from_str(line)
                .map_err(|e| ClientError::BadOutput(format!("ps line: {e}")))?;
            containers.push(ContainerSummary {
                id: parsed.id,
                name: parsed.names.trim_start_matches('/').to_string(),
                image: parsed.image,
                state: parsed.state,
                status: parsed.status,
            });
        }
        Ok(containers)
    }

    async fn inspect_container(&self, name: &str) -> Result<serde_json::Value, ClientError> {
        let out = self.run(&["container", "inspect", name]).await?;
        let mut parsed: Vec<serde_json::Value> = serde_json::from_str(&out)
            .map_err(|e| ClientError::BadOutput(format!("inspect: {e}")))?;
        parsed.pop().ok_or_else(|| ClientError::NotFound {
            kind: "container",
            name: name.to_string(),
        })
    }

    async fn create_container(&self, opts: &CreateOptions) -> Result<String, ClientError> {
        let args = Self::create_args(opts);
        let out = self.run_owned(&args).await?;
        Ok(out.trim().to_string())
    }

    async fn start_container(&self, name: &str) -> Result<(), ClientError> {
        self.run(&["start", name]).await.map(|_| ())
    }

    async fn stop_container(&self, name: &str) -> Result<(), ClientError> {
        self.run(&["stop", name]).await.map(|_| ())
    }

    async fn pause_container(&self, name: &str) -> Result<(), ClientError> {
        self.run(&["pause", name]).await.map(|_| ())
    }

    async fn unpause_container(&self, name: &str) -> Result<(), ClientError> {
        self.run(&["unpause", name]).await.map(|_| ())
    }

    async fn remove_container(&self, name: &str, force: bool) -> Result<(), ClientError> {
        if force {
            self.run(&["rm", "-f", name]).await.map(|_| ())
        } else {
            self.run(&["rm", name]).await.map(|_| ())
        }
    }

    async fn list_images(&self) -> Result<Vec<ImageSummary>, ClientError> {
        let out = self.run(&["images", "--format", "json"]).await?;
        let mut images = Vec::new();
        for line in out.lines().filter(|l| !l.trim().is_empty()) {
            let parsed: ImageLine = serde_json::from_str(line)
                .map_err(|e| ClientError::BadOutput(format!("images line: {e}")))?;
            images.push(ImageSummary {
                id: parsed.id,
                reference: format!("{}:{}", parsed.repository, parsed.tag),
                size: parsed.size,
                created: parsed.created,
            });
        }
        Ok(images)
    }

    async fn inspect_image(&self, reference: &str) -> Result<serde_json::Value, ClientError> {
        let out = self.run(&["image", "inspect", reference]).await?;
        let mut parsed: Vec<serde_json::Value> = serde_json::from_str(&out)
            .map_err(|e| ClientError::BadOutput(format!("image inspect: {e}")))?;
        parsed.pop().ok_or_else(|| ClientError::NotFound {
            kind: "image",
            name: reference.to_string(),
        })
    }

    async fn build_image(
        &self,
        opts: &BuildOptions,
        progress: BuildProgress<'_>,
    ) -> Result<String, ClientError> {
        let mut args: Vec<String> = vec!["build".to_string(), "-t".to_string(), opts.tag.clone()];
        if let Some(dockerfile) = &opts.dockerfile {
            args.push("-f".to_string());
            args.push(dockerfile.display().to_string());
        }
        args.push(opts.context.display().to_string());

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Classic builder prints "Step x/y" on stdout; BuildKit prints
        // "#n ..." on stderr. We track whichever appears.
        let stdout = child.stdout.take().expect("stdout piped");
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if let Some((step, total)) = parse_build_step(&line) {
                progress(step, total);
            }
        }

        let output = child.wait_with_output().await?;
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            let args_ref: Vec<&str> = args.iter().map(String::as_str).collect();
            return Err(classify_failure(&stderr, &args_ref));
        }
        Ok(opts.tag.clone())
    }

    async fn remove_image(&self, reference: &str, force: bool) -> Result<(), ClientError> {
        if force {
            self.run(&["rmi", "-f", reference]).await.map(|_| ())
        } else {
            self.run(&["rmi", reference]).await.map(|_| ())
        }
    }
}

/// Parse `"Step 3/7 : RUN ..."` into `(3, 7)`.
fn parse_build_step(line: &str) -> Option<(u64, u64)> {
    let rest = line.strip_prefix("Step ")?;
    let (frac, _) = rest.split_once(' ')?;
    let (step, total) = frac.split_once('/')?;
    Some((step.parse().ok()?, total.parse().ok()?))
}
