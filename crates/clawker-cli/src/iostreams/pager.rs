//! Pager lifecycle.
//!
//! While a pager runs, `Out` is redirected into the child's stdin; stopping
//! always restores the original sink and swallows broken-pipe errors, since
//! the user quitting `less` early is not a failure.

use std::process::{Child, Command, Stdio};

/// Resolved pager command, split into argv.
///
/// Precedence: `CLAWKER_PAGER`, then `PAGER`, then the platform default
/// (`less -R` on Unix, `more` on Windows). An empty value disables paging.
pub(super) fn resolve_pager() -> Option<Vec<String>> {
    for var in ["CLAWKER_PAGER", "PAGER"] {
        if let Ok(value) = std::env::var(var) {
            let argv: Vec<String> = value.split_whitespace().map(str::to_string).collect();
            return if argv.is_empty() { None } else { Some(argv) };
        }
    }
    let default = if cfg!(windows) { "more" } else { "less -R" };
    Some(default.split_whitespace().map(str::to_string).collect())
}

/// A running pager child process.
#[derive(Debug)]
pub(super) struct PagerProcess {
    child: Child,
}

impl PagerProcess {
    /// Spawn `argv` with a piped stdin; the caller installs the stdin
    /// handle as the new `Out` sink.
    pub(super) fn spawn(argv: &[String]) -> std::io::Result<(Self, std::process::ChildStdin)> {
        let (program, args) = argv.split_first().expect("pager argv is non-empty");
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .spawn()?;
        let stdin = child.stdin.take().expect("stdin was piped");
        Ok((Self { child }, stdin))
    }

    /// Wait for the pager to exit. Call after the stdin handle has been
    /// dropped so the child sees EOF.
    pub(super) fn wait(mut self) {
        let _ = self.child.wait();
    }
}
