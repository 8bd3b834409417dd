//! Error classification for the command surface.
//!
//! Every subcommand returns `Result<(), CliError>`; `main` renders exactly
//! one thing per class. Flag errors print clap's own message plus a help
//! footer, silent errors print nothing (the command already reported the
//! failure inline), exit errors carry a code plus an optional cause to
//! render, and everything else becomes a single `✗ message` line with
//! optional remediation hints.

use clawker_core::bridge::BridgeError;
use clawker_core::client::ClientError;
use clawker_core::config::ConfigError;
use clawker_core::git::GitError;

/// A classified command failure.
#[derive(Debug)]
pub enum CliError {
    /// Argument parsing failed; clap renders the message, `main` appends
    /// the help footer.
    Flag(clap::Error),
    /// The command already printed its own failure output.
    Silent,
    /// Exit with a specific code, reporting the cause first if one is
    /// attached.
    Exit {
        /// The process exit code.
        code: u8,
        /// Rendered as `✗ {message}` before exiting, when present.
        source: Option<anyhow::Error>,
    },
    /// A generic failure, rendered as `✗ {message}`.
    Other(anyhow::Error),
}

impl CliError {
    /// The process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Exit { code, .. } => *code,
            Self::Flag(e) => {
                // `--help`/`--version` arrive as "errors" but exit 0.
                if e.use_stderr() { 1 } else { 0 }
            }
            Self::Silent | Self::Other(_) => 1,
        }
    }

    /// Remediation hints to render under the error line.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Other(e) => match e.downcast_ref::<ClientError>() {
                Some(client_err) => client_err.suggestions(),
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flag(e) => write!(f, "{e}"),
            Self::Silent => write!(f, "silent failure"),
            Self::Exit { code, source } => match source {
                Some(source) => write!(f, "{source}"),
                None => write!(f, "exit with code {code}"),
            },
            Self::Other(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<clap::Error> for CliError {
    fn from(e: clap::Error) -> Self {
        Self::Flag(e)
    }
}

impl From<anyhow::Error> for CliError {
    fn from(e: anyhow::Error) -> Self {
        Self::Other(e)
    }
}

impl From<ClientError> for CliError {
    fn from(e: ClientError) -> Self {
        Self::Other(e.into())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Other(e.into())
    }
}

impl From<GitError> for CliError {
    fn from(e: GitError) -> Self {
        Self::Other(e.into())
    }
}

impl From<BridgeError> for CliError {
    fn from(e: BridgeError) -> Self {
        Self::Other(e.into())
    }
}

impl From<crate::prompter::PromptError> for CliError {
    fn from(e: crate::prompter::PromptError) -> Self {
        Self::Other(e.into())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::Other(e.into())
    }
}
