//! Background update notification.
//!
//! The check runs concurrently with the invoked command and never delays
//! it: `main` spawns the task before dispatch, cancels it once the command
//! finishes, and awaits the result channel, which is guaranteed to receive
//! exactly one message. Any failure inside the task degrades to "no
//! notification".

use crate::iostreams::IoStreams;
use crate::iostreams::color::ColorScheme;
use clawker_core::update::{self, Release};
use tokio::sync::oneshot;

/// Handle to the in-flight background check.
pub struct UpdateChecker {
    rx: oneshot::Receiver<Option<Release>>,
    cancel: Option<oneshot::Sender<()>>,
}

impl UpdateChecker {
    /// Start the check for `app_version`.
    pub fn spawn(app_version: &str) -> Self {
        let (tx, rx) = oneshot::channel();
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let version = app_version.to_string();
        tokio::spawn(async move {
            let release = tokio::select! {
                _ = cancel_rx => None,
                release = run_check(&version) => release,
            };
            // The receiver may already be gone; either way exactly one
            // send happens.
            let _ = tx.send(release);
        });
        Self {
            rx,
            cancel: Some(cancel_tx),
        }
    }

    /// Ask the task to stop fetching; it still reports on the channel.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }

    /// Wait for the task's answer.
    pub async fn wait(self) -> Option<Release> {
        self.rx.await.unwrap_or(None)
    }
}

// Gating (dev builds, CI, suppression sentinels, cache freshness) lives in
// `update::check`; a fresh cache can still answer with a newer version.
async fn run_check(version: &str) -> Option<Release> {
    let cache_path = clawker_core::update_cache_path();
    let base_url = std::env::var("CLAWKER_UPDATE_URL")
        .unwrap_or_else(|_| update::DEFAULT_RELEASE_URL.to_string());
    match update::check(version, &cache_path, &base_url).await {
        Ok(release) => release,
        Err(e) => {
            tracing::debug!(error = %e, "update check failed");
            None
        }
    }
}

/// Render the boxed notice for a newer release.
pub fn render_notice(scheme: &ColorScheme, current: &str, release: &Release) -> String {
    let headline = format!(
        "A new release of clawker is available: {current} -> {}",
        release.version
    );
    let url = release.url.clone();
    let width = headline.chars().count().max(url.chars().count());

    let mut out = String::new();
    out.push('\n');
    out.push_str(&scheme.muted(format!("╭{}╮", "─".repeat(width + 4))));
    out.push('\n');
    for line in [headline.as_str(), url.as_str()] {
        let pad = width - line.chars().count();
        out.push_str(&format!(
            "{}  {}{}  {}",
            scheme.muted("│"),
            scheme.highlight(line),
            " ".repeat(pad),
            scheme.muted("│"),
        ));
        out.push('\n');
    }
    out.push_str(&scheme.muted(format!("╰{}╯", "─".repeat(width + 4))));
    out.push('\n');
    out
}

/// Print the notice on ErrOut when a newer release was found.
pub fn print_notice(ios: &IoStreams, current: &str, release: Option<&Release>) {
    let Some(release) = release else { return };
    if !clawker_core::version::is_newer(current, &release.version) {
        return;
    }
    let scheme = ios.color_scheme();
    let _ = ios.err().write_str(&render_notice(&scheme, current, release));
}
