use std::time::Duration;

use thiserror::Error;

use crate::coordinate::Coordinate;

#[derive(Error, Debug)]
pub enum ResolveError {
    // Input errors
    #[error("Invalid coordinate \"{input}\": {reason}")]
    CoordinateFormat { input: String, reason: String },

    // Query does not match repository state
    #[error("No matching version for {coordinate}")]
    NoMatchingVersion { coordinate: String },

    #[error("Artifact not found: {coordinate}")]
    ArtifactNotFound { coordinate: String },

    #[error("Ambiguous query {pattern}: matches {}", .candidates.join(", "))]
    AmbiguousQuery { pattern: String, candidates: Vec<String> },

    // Graph errors
    #[error("Cyclic dependency: {}", display_path(.path))]
    CyclicDependency { path: Vec<Coordinate> },

    // Repository errors
    #[error("Repository {repository} unavailable: {reason}")]
    RepositoryUnavailable { repository: String, reason: String },

    #[error("Repository {repository} timed out after {timeout:?} fetching {key}")]
    RepositoryTimeout {
        repository: String,
        key: String,
        timeout: Duration,
    },

    #[error("Repository {repository} rejected {key}: {reason}")]
    RepositoryRejected {
        repository: String,
        key: String,
        reason: String,
    },

    #[error("Malformed descriptor for {coordinate}: {reason}")]
    MalformedDescriptor { coordinate: String, reason: String },

    #[error("Resolution cancelled")]
    Cancelled,

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid version: {0}")]
    Version(#[from] forge_version::VersionParserError),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ResolveError {
    /// Transient repository failures, worth another attempt later
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ResolveError::RepositoryUnavailable { .. } | ResolveError::RepositoryTimeout { .. }
        )
    }

    /// Errors that abort a resolution regardless of the failure mode
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ResolveError::CyclicDependency { .. } | ResolveError::Cancelled
        )
    }

    pub(crate) fn coordinate_format(input: &str, reason: impl Into<String>) -> Self {
        ResolveError::CoordinateFormat {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

fn display_path(path: &[Coordinate]) -> String {
    path.iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub type Result<T> = std::result::Result<T, ResolveError>;
