use async_trait::async_trait;
use thiserror::Error;

use crate::coordinate::{Coordinate, CoordinateGA};
use crate::dependency::{ArtifactHandle, Dependency};

/// Failure reported by a single repository
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Transport or server failure; retried with backoff
    #[error("{0}")]
    Unavailable(String),

    /// The repository gave up waiting on its backend
    #[error("timed out")]
    Timeout,

    /// A descriptor or index could not be parsed; never retried
    #[error("{0}")]
    Malformed(String),

    /// Permanent refusal (client error status, local I/O failure); never retried
    #[error("{0}")]
    Rejected(String),
}

impl RepositoryError {
    pub fn is_transient(&self) -> bool {
        matches!(self, RepositoryError::Unavailable(_) | RepositoryError::Timeout)
    }
}

/// Repository interface - read-only artifact source.
///
/// Every lookup returns `Ok(None)` when the repository does not know the key,
/// which lets the next configured repository answer.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Get a unique name for this repository
    fn name(&self) -> &str;

    /// All published versions of a group+artifact, in repository order.
    /// An empty list means the same as `None`.
    async fn list_versions(&self, ga: &CoordinateGA) -> Result<Option<Vec<String>>, RepositoryError>;

    /// Direct dependencies of an exact version, in declaration order
    async fn fetch_descriptor(&self, coordinate: &Coordinate) -> Result<Option<Vec<Dependency>>, RepositoryError>;

    /// Retrieve the artifact file to local storage
    async fn fetch_artifact(&self, coordinate: &Coordinate) -> Result<Option<ArtifactHandle>, RepositoryError>;
}

/// A value together with the repository that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sourced<T> {
    pub value: T,
    pub origin: String,
}

impl<T> Sourced<T> {
    pub fn new(value: T, origin: impl Into<String>) -> Self {
        Self {
            value,
            origin: origin.into(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sourced<U> {
        Sourced {
            value: f(self.value),
            origin: self.origin,
        }
    }
}
