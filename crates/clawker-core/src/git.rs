//! Git worktree management.
//!
//! Clawker runs one agent per worktree; this module wraps the handful of
//! `git worktree` operations the CLI needs, parsing the porcelain output.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

/// Errors raised by git operations.
#[derive(Error, Debug)]
pub enum GitError {
    /// `git` is not installed or not on PATH.
    #[error("git binary not found on PATH")]
    MissingBinary,

    /// The command ran but git rejected it.
    #[error("git error: {stderr}")]
    CommandFailed {
        /// Trimmed stderr of the failing invocation.
        stderr: String,
    },

    /// Process spawn / IO failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One worktree as reported by `git worktree list --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worktree {
    /// Checkout path.
    pub path: PathBuf,
    /// Commit the worktree is at.
    pub head: String,
    /// Branch ref, `None` for a detached head.
    pub branch: Option<String>,
}

/// Worktree operations scoped to one repository.
#[derive(Debug, Clone)]
pub struct GitManager {
    binary: PathBuf,
    repo: PathBuf,
}

impl GitManager {
    /// Build a manager for the repository at `repo`.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::MissingBinary`] when git is not installed.
    pub fn discover(repo: &Path) -> Result<Self, GitError> {
        let binary = which::which("git").map_err(|_| GitError::MissingBinary)?;
        Ok(Self {
            binary,
            repo: repo.to_path_buf(),
        })
    }

    /// List worktrees of the repository.
    ///
    /// # Errors
    ///
    /// Returns an error when the repository cannot be queried.
    pub async fn list_worktrees(&self) -> Result<Vec<Worktree>, GitError> {
        let out = self.run(&["worktree", "list", "--porcelain"]).await?;
        Ok(parse_worktree_list(&out))
    }

    /// Add a worktree for `branch` at `path`, creating the branch when it
    /// does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error when git rejects the operation (dirty path, branch
    /// already checked out elsewhere, ...).
    pub async fn add_worktree(&self, path: &Path, branch: &str) -> Result<(), GitError> {
        let path_str = path.display().to_string();
        // -B is not used: never clobber an existing branch from here.
        let result = self
            .run(&["worktree", "add", &path_str, branch])
            .await;
        if let Err(GitError::CommandFailed { stderr }) = &result
            && stderr.contains("invalid reference")
        {
            self.run(&["worktree", "add", "-b", branch, &path_str])
                .await?;
            return Ok(());
        }
        result.map(|_| ())
    }

    /// Remove the worktree at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the worktree is dirty and `force` is false.
    pub async fn remove_worktree(&self, path: &Path, force: bool) -> Result<(), GitError> {
        let path_str = path.display().to_string();
        if force {
            self.run(&["worktree", "remove", "--force", &path_str])
                .await
                .map(|_| ())
        } else {
            self.run(&["worktree", "remove", &path_str]).await.map(|_| ())
        }
    }

    async fn run(&self, args: &[&str]) -> Result<String, GitError> {
        tracing::debug!(?args, "git invocation");
        let output = Command::new(&self.binary)
            .arg("-C")
            .arg(&self.repo)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(GitError::CommandFailed {
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// Parse `git worktree list --porcelain` output.
fn parse_worktree_list(out: &str) -> Vec<Worktree> {
    let mut worktrees = Vec::new();
    let mut current: Option<Worktree> = None;
    for line in out.lines() {
        if let Some(path) = line.strip_prefix("worktree ") {
            if let Some(done) = current.take() {
                worktrees.push(done);
            }
            current = Some(Worktree {
                path: PathBuf::from(path),
                head: String::new(),
                branch: None,
            });
        } else if let Some(head) = line.strip_prefix("HEAD ")
            && let Some(wt) = current.as_mut()
        {
            wt.head = head.to_string();
        } else if let Some(branch) = line.strip_prefix("branch ")
            && let Some(wt) = current.as_mut()
        {
            wt.branch = Some(
                branch
                    .strip_prefix("refs/heads/")
                    .unwrap_or(branch)
                    .to_string(),
            );
        }
    }
    if let Some(done) = current.take() {
        worktrees.push(done);
    }
    worktrees
}
