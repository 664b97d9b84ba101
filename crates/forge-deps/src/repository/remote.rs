//! Remote repository - Maven layout served over HTTP(S).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::checksum::{self, ChecksumType};
use super::descriptor::Descriptor;
use super::layout;
use super::traits::{Repository, RepositoryError};
use crate::coordinate::{Coordinate, CoordinateGA};
use crate::dependency::{ArtifactHandle, Dependency};
use crate::error::{ResolveError, Result};
use crate::http::{HttpClient, HttpError};

/// `versions.json` published beside the version directories
#[derive(Debug, Deserialize)]
struct VersionsIndex {
    #[serde(default)]
    versions: Vec<String>,
}

/// Repository reachable over HTTP.
///
/// Descriptors are read from `<artifact>-<version>.deps.json`, version lists
/// from `<group>/<artifact>/versions.json`. Artifacts are downloaded below
/// `download_dir` in the same layout and verified against a `.sha256` or
/// `.sha1` sidecar when the server publishes one.
pub struct RemoteRepository {
    name: String,
    base_url: Url,
    client: Arc<HttpClient>,
    download_dir: PathBuf,
}

impl RemoteRepository {
    pub fn new(url: &str, client: Arc<HttpClient>, download_dir: impl Into<PathBuf>) -> Result<Self> {
        let normalized = if url.ends_with('/') {
            url.to_string()
        } else {
            format!("{}/", url)
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| ResolveError::Config(format!("Invalid repository URL {}: {}", url, e)))?;

        Ok(Self {
            name: extract_repo_name(&base_url),
            base_url,
            client,
            download_dir: download_dir.into(),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, relative: &str) -> std::result::Result<String, RepositoryError> {
        self.base_url
            .join(relative)
            .map(String::from)
            .map_err(|e| RepositoryError::Malformed(format!("{}: {}", relative, e)))
    }

    fn local_path(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .fold(self.download_dir.clone(), |path, segment| path.join(segment))
    }

    /// Check the downloaded file against the first published sidecar
    async fn verify_download(&self, url: &str, path: &Path) -> std::result::Result<(), RepositoryError> {
        for checksum_type in ChecksumType::ALL {
            let sidecar_url = format!("{}.{}", url, checksum_type.extension());
            let Some(content) = self.client.get_text(&sidecar_url).await.map_err(map_http_error)? else {
                continue;
            };
            let Some(expected) = checksum::parse_sidecar(&content) else {
                continue;
            };

            let valid = checksum::verify(path, expected, checksum_type)
                .await
                .map_err(|e| RepositoryError::Rejected(format!("{}: {}", path.display(), e)))?;
            if !valid {
                let _ = tokio::fs::remove_file(path).await;
                return Err(RepositoryError::Unavailable(format!("checksum mismatch for {}", url)));
            }
            log::trace!("Verified {} with {}", url, checksum_type.extension());
            return Ok(());
        }
        log::debug!("No checksum published for {}", url);
        Ok(())
    }
}

/// Host (and port) of the repository URL
fn extract_repo_name(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        _ => url.to_string(),
    }
}

/// Only failures worth another attempt become `Unavailable`
fn map_http_error(e: HttpError) -> RepositoryError {
    if e.is_timeout() {
        RepositoryError::Timeout
    } else if let HttpError::JsonParse(reason) = e {
        RepositoryError::Malformed(reason)
    } else if e.is_transient() {
        RepositoryError::Unavailable(e.to_string())
    } else {
        RepositoryError::Rejected(e.to_string())
    }
}

#[async_trait]
impl Repository for RemoteRepository {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_versions(&self, ga: &CoordinateGA) -> std::result::Result<Option<Vec<String>>, RepositoryError> {
        let url = self.url(&layout::versions_index_path(ga))?;
        let index: Option<VersionsIndex> = self.client.get_json(&url).await.map_err(map_http_error)?;
        Ok(index.map(|i| i.versions).filter(|v| !v.is_empty()))
    }

    async fn fetch_descriptor(&self, coordinate: &Coordinate) -> std::result::Result<Option<Vec<Dependency>>, RepositoryError> {
        let Some(version) = coordinate.version() else {
            return Ok(None);
        };
        let url = self.url(&layout::descriptor_path(coordinate, version))?;
        match self.client.get_text(&url).await.map_err(map_http_error)? {
            Some(text) => Descriptor::parse(text.as_bytes()).map(|d| Some(d.dependencies)),
            None => Ok(None),
        }
    }

    async fn fetch_artifact(&self, coordinate: &Coordinate) -> std::result::Result<Option<ArtifactHandle>, RepositoryError> {
        let Some(version) = coordinate.version() else {
            return Ok(None);
        };
        let relative = layout::artifact_path(coordinate, version);
        let url = self.url(&relative)?;
        let dest = self.local_path(&relative);

        log::debug!("Downloading {} to {}", url, dest.display());
        if !self.client.download(&url, &dest).await.map_err(map_http_error)? {
            return Ok(None);
        }
        self.verify_download(&url, &dest).await?;

        Ok(Some(ArtifactHandle::new(dest)))
    }
}
