//! Supported Kubernetes releases and version comparisons.

use crate::constants::orchestrator;
use semver::Version;


/// Kubernetes versions a cluster may be created with.
pub const SUPPORTED_KUBERNETES_VERSIONS: &[&str] = &[
    "1.11.9", "1.11.10", "1.12.7", "1.12.8", "1.13.11", "1.13.12", "1.14.7", "1.14.8",
    "1.15.11", "1.15.12", "1.16.13", "1.16.15", "1.17.13", "1.17.16", "1.18.14", "1.18.17",
    "1.19.7", "1.19.9", "1.20.5", "1.20.9", "1.21.2", "1.21.7", "1.22.4", "1.22.6", "1.23.5",
    "1.23.8", "1.24.9", "1.24.10", "1.25.5", "1.25.6", "1.26.0", "1.26.3", "1.27.1", "1.27.3",
    "1.28.3", "1.28.5", "1.29.0", "1.29.2", "1.30.0", "1.30.1",
];

/// Parses a version, treating anything unparseable as `0.0.0`.
pub fn parse_lenient(version: &str) -> Version {
    Version::parse(version.trim_start_matches('v')).unwrap_or_else(|_| Version::new(0, 0, 0))
}

/// True if `actual >= minimum`. Unparseable inputs compare as `0.0.0`.
pub fn is_version_ge(actual: &str, minimum: &str) -> bool {
    parse_lenient(actual) >= parse_lenient(minimum)
}

/// Highest GA patch of `release` (`major.minor`) in `versions`.
pub fn latest_patch(release: &str, versions: &[&str]) -> Option<String> {
    let mut parts = release.split('.');
    let major: u64 = parts.next()?.parse().ok()?;
    let minor: u64 = parts.next()?.parse().ok()?;
    versions
        .iter()
        .filter_map(|v| Version::parse(v).ok())
        .filter(|v| v.major == major && v.minor == minor && v.pre.is_empty())
        .max()
        .map(|v| v.to_string())
}

fn is_release(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    parts.len() == 2 && parts.iter().all(|p| p.parse::<u64>().is_ok())
}

/// Resolves the orchestrator version a cluster should run.
///
/// An empty version becomes the latest patch of the default release (the
/// Windows release when the cluster has Windows pools). A bare `major.minor`
/// becomes its latest patch. Anything else is returned unchanged.
pub fn get_valid_patch_version(orchestrator_type: &str, version: &str, has_windows: bool) -> String {
    if orchestrator_type != orchestrator::KUBERNETES {
        return version.to_string();
    }
    let release = if version.is_empty() {
        if has_windows {
            orchestrator::DEFAULT_WINDOWS_RELEASE
        } else {
            orchestrator::DEFAULT_RELEASE
        }
    } else if is_release(version) {
        version
    } else {
        return version.to_string();
    };
    latest_patch(release, SUPPORTED_KUBERNETES_VERSIONS).unwrap_or_else(|| version.to_string())
}
