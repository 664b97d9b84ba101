//! Cache-wrapped repository access shared by the graph builder and the facade

use tokio::sync::Semaphore;

use forge_version::{VersionScheme, VersionSpec};

use crate::cache::ResolutionCache;
use crate::coordinate::{Coordinate, CoordinateGA};
use crate::dependency::{ArtifactHandle, Dependency};
use crate::error::{ResolveError, Result};
use crate::repository::{RepositoryRegistry, Sourced};

/// Every repository call goes through the cache, and every cache miss holds
/// one of `permits` while the registry is busy.
#[derive(Clone, Copy)]
pub(crate) struct Fetcher<'a> {
    pub registry: &'a RepositoryRegistry,
    pub cache: &'a ResolutionCache,
    pub scheme: &'a dyn VersionScheme,
    pub permits: &'a Semaphore,
    pub refresh: bool,
}

impl<'a> Fetcher<'a> {
    /// Parse the version field; an absent version reads as `LATEST`
    pub fn spec(&self, coordinate: &Coordinate) -> Result<VersionSpec> {
        match coordinate.version() {
            Some(version) => Ok(self.scheme.parse_spec(version)?),
            None => Ok(VersionSpec::Latest),
        }
    }

    /// Exact, non-snapshot coordinates never change once published
    pub fn is_exact(&self, coordinate: &Coordinate) -> bool {
        matches!(self.spec(coordinate), Ok(VersionSpec::Exact(ref v)) if !self.scheme.is_snapshot(v))
    }

    pub async fn versions(&self, ga: &CoordinateGA) -> Result<Option<Sourced<Vec<String>>>> {
        self.cache
            .versions(ga, self.refresh, move || async move {
                let _permit = self.permits.acquire().await.map_err(|_| ResolveError::Cancelled)?;
                self.registry.list_versions(ga).await
            })
            .await
    }

    /// Pin a symbolic or range version to the newest matching published one
    pub async fn resolve_version(&self, coordinate: &Coordinate) -> Result<Coordinate> {
        let spec = self.spec(coordinate)?;
        if let VersionSpec::Exact(_) = spec {
            return Ok(coordinate.clone());
        }

        let no_match = || ResolveError::NoMatchingVersion {
            coordinate: coordinate.to_string(),
        };
        let versions = self.versions(&coordinate.ga()).await?.ok_or_else(no_match)?;
        let version = self.scheme.select(&spec, &versions.value).ok_or_else(no_match)?;

        log::debug!("{} resolved to version {}", coordinate, version);
        Ok(coordinate.with_version(version))
    }

    /// Direct dependencies of a resolved coordinate; unknown is an error
    pub async fn descriptor(&self, coordinate: &Coordinate) -> Result<Vec<Dependency>> {
        let exact = self.is_exact(coordinate);
        let answer = self
            .cache
            .descriptor(coordinate, exact, self.refresh, move || async move {
                let _permit = self.permits.acquire().await.map_err(|_| ResolveError::Cancelled)?;
                self.registry.fetch_descriptor(coordinate).await
            })
            .await?;

        answer
            .map(|sourced| sourced.value)
            .ok_or_else(|| ResolveError::ArtifactNotFound {
                coordinate: coordinate.to_string(),
            })
    }

    pub async fn artifact(&self, coordinate: &Coordinate) -> Result<Option<Sourced<ArtifactHandle>>> {
        let exact = self.is_exact(coordinate);
        self.cache
            .artifact(coordinate, exact, self.refresh, move || async move {
                let _permit = self.permits.acquire().await.map_err(|_| ResolveError::Cancelled)?;
                self.registry.fetch_artifact(coordinate).await
            })
            .await
    }
}
