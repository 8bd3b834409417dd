//! Service factory handed to every subcommand.
//!
//! Streams are always available; everything else (settings, runtime client,
//! git, socket bridge) is built on first use and memoized, so `clawker
//! version` never probes for a docker binary. Tests swap the constructor
//! closures before first use to inject fakes.

use crate::iostreams::IoStreams;
use crate::prompter::Prompter;
use clawker_core::bridge::SocketBridge;
use clawker_core::client::{ClientError, ContainerClient, DockerCli};
use clawker_core::config::{ConfigError, Settings};
use clawker_core::git::{GitError, GitManager};
use once_cell::sync::OnceCell;
use std::sync::Arc;

type SettingsCtor = Box<dyn Fn() -> Result<Settings, ConfigError> + Send + Sync>;
type ClientCtor = Box<dyn Fn() -> Result<Arc<dyn ContainerClient>, ClientError> + Send + Sync>;
type GitCtor = Box<dyn Fn() -> Result<GitManager, GitError> + Send + Sync>;

/// Lazily-constructed services shared by all subcommands.
pub struct Factory {
    ios: Arc<IoStreams>,
    app_version: String,
    executable: String,
    prompter: OnceCell<Prompter>,
    settings: OnceCell<Settings>,
    settings_ctor: SettingsCtor,
    client: OnceCell<Arc<dyn ContainerClient>>,
    client_ctor: ClientCtor,
    git: OnceCell<GitManager>,
    git_ctor: GitCtor,
    bridge: OnceCell<SocketBridge>,
}

impl Factory {
    /// Factory wired to the real environment.
    pub fn new(ios: Arc<IoStreams>, app_version: &str, executable: &str) -> Self {
        Self {
            ios,
            app_version: app_version.to_string(),
            executable: executable.to_string(),
            prompter: OnceCell::new(),
            settings: OnceCell::new(),
            settings_ctor: Box::new(Settings::load),
            client: OnceCell::new(),
            client_ctor: Box::new(|| {
                Ok(Arc::new(DockerCli::discover()?) as Arc<dyn ContainerClient>)
            }),
            git: OnceCell::new(),
            git_ctor: Box::new(|| {
                let cwd = std::env::current_dir().map_err(GitError::Io)?;
                GitManager::discover(&cwd)
            }),
            bridge: OnceCell::new(),
        }
    }

    /// Factory over test streams with everything defaulted; swap ctors
    /// before first use.
    pub fn test(ios: Arc<IoStreams>) -> Self {
        let mut factory = Self::new(ios, clawker_core::version::DEV_VERSION, "clawker");
        factory.settings_ctor = Box::new(|| Ok(Settings::default()));
        factory
    }

    /// The stream set.
    pub fn ios(&self) -> &Arc<IoStreams> {
        &self.ios
    }

    /// The running binary's version string.
    pub fn app_version(&self) -> &str {
        &self.app_version
    }

    /// The invoked executable name, used in the help footer.
    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// The interactive prompter.
    pub fn prompter(&self) -> &Prompter {
        self.prompter
            .get_or_init(|| Prompter::new(Arc::clone(&self.ios)))
    }

    /// Global settings, loaded once.
    ///
    /// # Errors
    ///
    /// Returns the settings loader's error; a failed load is retried on
    /// the next call.
    pub fn settings(&self) -> Result<&Settings, ConfigError> {
        self.settings.get_or_try_init(|| (self.settings_ctor)())
    }

    /// The container runtime client, discovered once.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when no runtime binary can be found.
    pub fn client(&self) -> Result<Arc<dyn ContainerClient>, ClientError> {
        self.client
            .get_or_try_init(|| (self.client_ctor)())
            .cloned()
    }

    /// Git worktree manager rooted at the current repository.
    ///
    /// # Errors
    ///
    /// Returns [`GitError`] when git is missing or the cwd is unreadable.
    pub fn git(&self) -> Result<&GitManager, GitError> {
        self.git.get_or_try_init(|| (self.git_ctor)())
    }

    /// The per-container socket bridge.
    pub fn bridge(&self) -> &SocketBridge {
        self.bridge.get_or_init(SocketBridge::new)
    }

    /// Replace the settings constructor (tests; no effect after first use).
    pub fn set_settings_ctor(&mut self, ctor: SettingsCtor) {
        self.settings_ctor = ctor;
    }

    /// Replace the client constructor (tests; no effect after first use).
    pub fn set_client_ctor(&mut self, ctor: ClientCtor) {
        self.client_ctor = ctor;
    }

    /// Replace the git constructor (tests; no effect after first use).
    pub fn set_git_ctor(&mut self, ctor: GitCtor) {
        self.git_ctor = ctor;
    }

    /// Install a pre-built bridge (tests; no effect after first use).
    pub fn set_bridge(&mut self, bridge: SocketBridge) {
        let _ = self.bridge.set(bridge);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_settings_memoized() {
        let (ios, _handles) = IoStreams::test();
        let mut factory = Factory::test(Arc::new(ios));
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        factory.set_settings_ctor(Box::new(|| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            Ok(Settings::default())
        }));
        let first = factory.settings().unwrap().default_image.clone();
        let second = factory.settings().unwrap().default_image.clone();
        assert_eq!(first, second);
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_client_is_retried() {
        let (ios, _handles) = IoStreams::test();
        let mut factory = Factory::test(Arc::new(ios));
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        factory.set_client_ctor(Box::new(|| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            Err(ClientError::DaemonUnreachable {
                details: "down".to_string(),
            })
        }));
        assert!(factory.client().is_err());
        assert!(factory.client().is_err());
        assert_eq!(CALLS.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_prompter_built_once() {
        let (ios, _handles) = IoStreams::test();
        let factory = Factory::test(Arc::new(ios));
        let a = std::ptr::from_ref(factory.prompter());
        let b = std::ptr::from_ref(factory.prompter());
        assert_eq!(a, b);
    }
}
