//! Release checking with a 24-hour on-disk cache.
//!
//! The CLI runs this in the background on every invocation; the cache keeps
//! it from hammering the release endpoint, and a handful of environment
//! sentinels (`CI`, `CLAWKER_NO_UPDATE_NOTIFIER`) suppress it entirely.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default release endpoint; override with `CLAWKER_UPDATE_URL` (tests point
/// this at a local server).
pub const DEFAULT_RELEASE_URL: &str =
    "https://api.github.com/repos/clawker/clawker/releases/latest";

/// Errors raised by the update checker.
#[derive(Error, Debug)]
pub enum UpdateError {
    /// The release endpoint could not be reached or answered non-2xx.
    #[error("release check failed: {0}")]
    Fetch(String),

    /// Cache file could not be read or written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache file exists but is not valid YAML.
    #[error("corrupt update cache: {0}")]
    Corrupt(#[from] serde_yaml::Error),
}

/// Persisted check state, one YAML document under the clawker home.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateCache {
    /// When the endpoint was last queried.
    pub last_checked: DateTime<Utc>,
    /// The newest version the endpoint reported at that time.
    pub latest_version: String,
    /// Release page of that version; empty in caches written by older
    /// builds.
    #[serde(default)]
    pub latest_url: String,
}

impl UpdateCache {
    /// Load the cache, returning `None` when the file is missing or corrupt.
    ///
    /// A corrupt cache is treated as absent: the worst outcome is one extra
    /// network check.
    pub fn load(path: &Path) -> Option<Self> {
        let raw = std::fs::read_to_string(path).ok()?;
        serde_yaml::from_str(&raw).ok()
    }

    /// Persist the cache, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub fn store(&self, path: &Path) -> Result<(), UpdateError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_yaml::to_string(self)?;
        std::fs::write(path, body)?;
        Ok(())
    }

    /// Whether the cache is still fresh at `now` (checked within 24 hours).
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now - self.last_checked < Duration::hours(24)
    }
}

/// A newer published release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Version of the release, without the `v` prefix.
    pub version: String,
    /// Browser URL of the release page.
    pub url: String,
}

/// Decide whether a check should run at all.
///
/// Pure so the suppression matrix is unit-testable; the CLI wires the env
/// reads in [`check_enabled_from_env`].
pub fn check_enabled(
    current_version: &str,
    ci: bool,
    suppressed: bool,
    cache: Option<&UpdateCache>,
    now: DateTime<Utc>,
) -> bool {
    if crate::version::is_dev(current_version) || ci || suppressed {
        return false;
    }
    match cache {
        Some(c) => !c.is_fresh(now),
        None => true,
    }
}

/// Env-driven variant of [`check_enabled`] used by the CLI.
pub fn check_enabled_from_env(current_version: &str, cache: Option<&UpdateCache>) -> bool {
    check_enabled(
        current_version,
        std::env::var_os("CI").is_some(),
        std::env::var_os("CLAWKER_NO_UPDATE_NOTIFIER").is_some(),
        cache,
        Utc::now(),
    )
}

#[derive(Debug, Deserialize)]
struct ReleasePayload {
    tag_name: String,
    html_url: String,
}

/// Query the release endpoint for the latest published version.
///
/// # Errors
///
/// Returns [`UpdateError::Fetch`] on network failure, non-2xx status, or an
/// unparseable payload.
pub async fn fetch_latest(base_url: &str) -> Result<Release, UpdateError> {
    let client = reqwest::Client::new();
    let response = client
        .get(base_url)
        .header("User-Agent", crate::USER_AGENT)
        .send()
        .await
        .map_err(|e| UpdateError::Fetch(e.to_string()))?;

    if !response.status().is_success() {
        return Err(UpdateError::Fetch(format!("HTTP {}", response.status())));
    }

    let payload: ReleasePayload = response
        .json()
        .await
        .map_err(|e| UpdateError::Fetch(e.to_string()))?;

    Ok(Release {
        version: payload.tag_name.trim_start_matches('v').to_string(),
        url: payload.html_url,
    })
}

/// Run a full check: consult the cache, query the endpoint when stale,
/// persist the result, and report a [`Release`] only when it is newer than
/// `current_version`.
///
/// # Errors
///
/// Returns an error on fetch or cache-write failure; callers treat any
/// error as "no notification".
pub async fn check(
    current_version: &str,
    cache_path: &Path,
    base_url: &str,
) -> Result<Option<Release>, UpdateError> {
    let cache = UpdateCache::load(cache_path);
    if !check_enabled_from_env(current_version, cache.as_ref()) {
        // A fresh cache can still carry a notification-worthy version.
        if let Some(c) = cache
            && c.is_fresh(Utc::now())
            && crate::version::is_newer(current_version, &c.latest_version)
        {
            return Ok(Some(Release {
                version: c.latest_version,
                url: c.latest_url,
            }));
        }
        return Ok(None);
    }

    let release = fetch_latest(base_url).await?;
    UpdateCache {
        last_checked: Utc::now(),
        latest_version: release.version.clone(),
        latest_url: release.url.clone(),
    }
    .store(cache_path)?;

    if crate::version::is_newer(current_version, &release.version) {
        Ok(Some(release))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(hours_ago: i64, version: &str) -> UpdateCache {
        UpdateCache {
            last_checked: Utc::now() - Duration::hours(hours_ago),
            latest_version: version.to_string(),
            latest_url: format!("https://example.com/r/{version}"),
        }
    }

    #[test]
    fn test_check_enabled_suppression_matrix() {
        let now = Utc::now();
        // Dev builds never check.
        assert!(!check_enabled("0.0.0-dev", false, false, None, now));
        // CI and the explicit sentinel suppress.
        assert!(!check_enabled("1.0.0", true, false, None, now));
        assert!(!check_enabled("1.0.0", false, true, None, now));
        // No cache: check.
        assert!(check_enabled("1.0.0", false, false, None, now));
    }

    #[test]
    fn test_check_enabled_cache_freshness() {
        let now = Utc::now();
        let fresh = cache(1, "1.1.0");
        let stale = cache(25, "1.1.0");
        assert!(!check_enabled("1.0.0", false, false, Some(&fresh), now));
        assert!(check_enabled("1.0.0", false, false, Some(&stale), now));
    }

    #[test]
    fn test_cache_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update-check.yml");
        let original = cache(0, "1.2.3");
        original.store(&path).unwrap();

        let loaded = UpdateCache::load(&path).unwrap();
        assert_eq!(loaded, original);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("last_checked"));
        assert!(raw.contains("latest_version: 1.2.3"));
    }

    #[test]
    fn test_cache_load_missing_or_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update-check.yml");
        assert!(UpdateCache::load(&path).is_none());

        std::fs::write(&path, ": not yaml ::").unwrap();
        assert!(UpdateCache::load(&path).is_none());
    }

    #[test]
    fn test_cache_without_url_field_still_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update-check.yml");
        std::fs::write(
            &path,
            "last_checked: 2026-01-01T00:00:00Z\nlatest_version: 1.2.3\n",
        )
        .unwrap();
        let loaded = UpdateCache::load(&path).unwrap();
        assert_eq!(loaded.latest_version, "1.2.3");
        assert_eq!(loaded.latest_url, "");
    }

    #[tokio::test]
    async fn test_fresh_cache_with_newer_version_answers_without_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update-check.yml");
        cache(1, "2.0.0").store(&path).unwrap();

        // The base URL is unroutable; a fresh cache must answer on its own.
        let release = check("1.0.0", &path, "http://127.0.0.1:9/releases/latest")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(release.version, "2.0.0");
        assert_eq!(release.url, "https://example.com/r/2.0.0");
    }

    #[tokio::test]
    async fn test_fresh_cache_with_current_version_is_quiet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update-check.yml");
        cache(1, "1.0.0").store(&path).unwrap();

        let release = check("1.0.0", &path, "http://127.0.0.1:9/releases/latest")
            .await
            .unwrap();
        assert!(release.is_none());
    }

    #[tokio::test]
    async fn test_fetch_latest_parses_release() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/releases/latest")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"tag_name":"v1.4.0","html_url":"https://example.com/r/1.4.0"}"#)
            .create_async()
            .await;

        let url = format!("{}/releases/latest", server.url());
        let release = fetch_latest(&url).await.unwrap();
        assert_eq!(release.version, "1.4.0");
        assert_eq!(release.url, "https://example.com/r/1.4.0");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_latest_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/releases/latest")
            .with_status(500)
            .create_async()
            .await;

        let url = format!("{}/releases/latest", server.url());
        let err = fetch_latest(&url).await.unwrap_err();
        assert!(matches!(err, UpdateError::Fetch(_)));
    }
}
