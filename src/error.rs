//! Error types shared by the bootstrap resolver and the VHD cacher.

use std::path::PathBuf;

/// Result type alias for nodebaker operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the library. The binary wraps these with `anyhow`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required flag, environment variable or config value is missing or invalid.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The components manifest could not be parsed or failed validation.
    #[error("malformed components manifest at {location}: {reason}")]
    MalformedManifest { location: String, reason: String },

    /// A container image repo has no `*` tag placeholder.
    #[error("malformed image repo {0:?}: expected exactly one '*' placeholder")]
    MalformedRepo(String),

    /// Two override files resolve to the same override name.
    #[error("override {0:?} has duplicate yaml definitions")]
    DuplicateOverride(String),

    /// An override matcher names a field the entity does not have.
    #[error("unrecognized entity field for override matcher: {0:?}")]
    UnknownMatcherField(String),

    /// An override file could not be read or parsed.
    #[error("reading override {path}: {reason}")]
    MalformedOverride { path: PathBuf, reason: String },

    /// Every failure found while loading an overrides directory.
    #[error("loading overrides: {}", render_list(.0))]
    OverridesAggregate(Vec<Error>),

    /// The Azure Stack metadata endpoint could not be reached.
    #[error("custom cloud metadata endpoint {url} unreachable: {reason}")]
    CustomCloudUnreachable { url: String, reason: String },

    /// The Azure Stack metadata endpoint returned an unusable document.
    #[error("custom cloud metadata from {url} malformed: {reason}")]
    CustomCloudMalformedResponse { url: String, reason: String },

    /// SIG config is missing its subscription, tenant or gallery map.
    #[error("sig config missing expected values: {0}")]
    InvalidSigConfig(String),

    /// SIG config has no gallery for the OS SKU a distro needs.
    #[error("sig gallery configuration for {0} not found")]
    MissingGalleryForSku(String),

    /// The distro has no SIG image definition.
    #[error("no sig image definition for distro {0}")]
    UnsupportedSigDistro(String),

    /// The bootstrap request names a pool the cluster does not have.
    #[error("agent pool {0:?} not found")]
    UnknownAgentPool(String),

    /// The process could not be started at all.
    #[error("failed to spawn {command:?}: {source}")]
    BackendSpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The last attempt exceeded its deadline (exit code 124).
    #[error("command {command:?} timed out after {attempts} attempt(s)\n{output}")]
    CommandTimeout {
        command: String,
        attempts: u32,
        output: String,
    },

    /// The command exited non-zero on every attempt.
    #[error("command {command:?} failed after {attempts} attempt(s)\n{output}")]
    CommandFailed {
        command: String,
        attempts: u32,
        output: String,
    },

    /// One or more pulls or downloads failed.
    #[error("{} cache operation(s) failed: {}", .0.len(), render_list(.0))]
    CacheAggregate(Vec<Error>),

    /// The operation observed its cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

fn render_list(errors: &[Error]) -> String {
    errors
        .iter()
        .map(|e| format!("\n  - {}", e))
        .collect::<Vec<_>>()
        .concat()
}

impl Error {
    /// Flattens aggregates into their constituent errors.
    pub fn constituents(&self) -> Vec<&Error> {
        match self {
            Error::CacheAggregate(errors) | Error::OverridesAggregate(errors) => {
                errors.iter().flat_map(|e| e.constituents()).collect()
            }
            other => vec![other],
        }
    }
}
