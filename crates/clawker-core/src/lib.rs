//! clawker-core - shared services behind the clawker CLI
//!
//! Everything the command surface needs that is not terminal rendering lives
//! here: home paths, YAML configuration, the container-runtime client, git
//! worktree plumbing, host socket/port bridging, and the release checker.
//! The CLI crate constructs these through its factory and never directly.

pub mod bridge;
pub mod client;
pub mod config;
pub mod git;
pub mod paths;
pub mod update;
pub mod version;

pub use paths::*;

/// User Agent string for outbound HTTP.
pub const USER_AGENT: &str = concat!("clawker/", env!("CARGO_PKG_VERSION"));
