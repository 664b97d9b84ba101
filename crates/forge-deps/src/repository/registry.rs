use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::traits::{Repository, RepositoryError, Sourced};
use crate::coordinate::{Coordinate, CoordinateGA};
use crate::dependency::{ArtifactHandle, Dependency};
use crate::error::{ResolveError, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);
/// Ceiling of a single backoff sleep
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Ordered list of repositories queried with first-writer-wins shadowing.
///
/// Each repository call runs under a deadline and transient failures are
/// retried with exponential backoff before the next repository is asked.
pub struct RepositoryRegistry {
    /// Repositories in priority order (first = highest priority)
    repositories: Vec<Arc<dyn Repository>>,
    timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self {
            repositories: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Add a repository (will be added with lowest priority)
    pub fn add_repository(&mut self, repo: Arc<dyn Repository>) {
        self.repositories.push(repo);
    }

    pub fn repositories(&self) -> &[Arc<dyn Repository>] {
        &self.repositories
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    pub async fn list_versions(&self, ga: &CoordinateGA) -> Result<Option<Sourced<Vec<String>>>> {
        let key = ga.to_string();
        self.first_answer(&key, |repo| async move {
            repo.list_versions(ga)
                .await
                .map(|versions| versions.filter(|v| !v.is_empty()))
        })
        .await
    }

    pub async fn fetch_descriptor(&self, coordinate: &Coordinate) -> Result<Option<Sourced<Vec<Dependency>>>> {
        let key = coordinate.to_key();
        self.first_answer(&key, |repo| async move { repo.fetch_descriptor(coordinate).await })
            .await
    }

    pub async fn fetch_artifact(&self, coordinate: &Coordinate) -> Result<Option<Sourced<ArtifactHandle>>> {
        let key = coordinate.to_key();
        self.first_answer(&key, |repo| async move { repo.fetch_artifact(coordinate).await })
            .await
    }

    /// Ask each repository in order; the first `Some` wins.
    ///
    /// Malformed and rejected answers fail immediately. Transient failures
    /// move on to the next repository and surface only if nobody answers.
    async fn first_answer<'a, T, F, Fut>(&'a self, key: &str, call: F) -> Result<Option<Sourced<T>>>
    where
        F: Fn(&'a dyn Repository) -> Fut,
        Fut: Future<Output = std::result::Result<Option<T>, RepositoryError>> + 'a,
    {
        let mut last_error = None;

        for repo in &self.repositories {
            let repo: &'a dyn Repository = repo.as_ref();
            match self.call_with_retry(repo, key, || call(repo)).await {
                Ok(Some(value)) => {
                    log::debug!("{} answered by {}", key, repo.name());
                    return Ok(Some(Sourced::new(value, repo.name())));
                }
                Ok(None) => {
                    log::trace!("{} unknown to {}", key, repo.name());
                }
                Err(e) if e.is_transient() => {
                    log::warn!("{}", e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }

    /// Call one repository under the deadline, retrying transient failures
    async fn call_with_retry<T, F, Fut>(&self, repo: &dyn Repository, key: &str, call: F) -> Result<Option<T>>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = std::result::Result<Option<T>, RepositoryError>>,
    {
        let mut attempt = 0;
        loop {
            let error = match tokio::time::timeout(self.timeout, call()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(RepositoryError::Malformed(reason))) => {
                    return Err(ResolveError::MalformedDescriptor {
                        coordinate: key.to_string(),
                        reason,
                    })
                }
                Ok(Err(RepositoryError::Rejected(reason))) => {
                    return Err(ResolveError::RepositoryRejected {
                        repository: repo.name().to_string(),
                        key: key.to_string(),
                        reason,
                    })
                }
                Ok(Err(RepositoryError::Unavailable(reason))) => ResolveError::RepositoryUnavailable {
                    repository: repo.name().to_string(),
                    reason,
                },
                Ok(Err(RepositoryError::Timeout)) | Err(_) => ResolveError::RepositoryTimeout {
                    repository: repo.name().to_string(),
                    key: key.to_string(),
                    timeout: self.timeout,
                },
            };

            if attempt >= self.max_retries {
                return Err(error);
            }

            let delay = self.backoff(attempt);
            log::debug!("{} (retrying in {:?})", error, delay);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

impl RepositoryRegistry {
    /// Exponential backoff: 1s, 2s, 4s, 8s, etc., capped at `MAX_RETRY_DELAY`
    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2_u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.retry_delay.saturating_mul(factor).min(MAX_RETRY_DELAY)
    }
}

impl Default for RepositoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}
