//! Version helpers shared by the CLI and the update checker.

/// Sentinel version reported by development builds.
///
/// Update checks are skipped entirely for this version: a dev build is by
/// definition not something a published release can supersede.
pub const DEV_VERSION: &str = "0.0.0-dev";

/// Returns true when `candidate` is a strictly newer semver than `current`.
///
/// Non-semver inputs (dev builds, git hashes) never compare as newer.
pub fn is_newer(current: &str, candidate: &str) -> bool {
    let current = current.trim_start_matches('v');
    let candidate = candidate.trim_start_matches('v');
    match (
        semver::Version::parse(current),
        semver::Version::parse(candidate),
    ) {
        (Ok(cur), Ok(cand)) => cand > cur,
        _ => false,
    }
}

/// Returns true when `version` is a development build.
pub fn is_dev(version: &str) -> bool {
    version == DEV_VERSION || version.ends_with("-dev")
}
