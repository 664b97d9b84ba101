//! Local repository - a directory tree in Maven layout.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::descriptor::Descriptor;
use super::layout;
use super::traits::{Repository, RepositoryError};
use crate::coordinate::{Coordinate, CoordinateGA};
use crate::dependency::{ArtifactHandle, Dependency};
use crate::error::{ResolveError, Result};

/// Repository backed by a local directory.
///
/// Versions are the subdirectory names below `<group>/<artifact>/`; a
/// version without a descriptor file is reported as unknown.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    name: String,
    root: PathBuf,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            name: format!("local {}", root.display()),
            root,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, relative: &str) -> PathBuf {
        relative.split('/').fold(self.root.clone(), |path, segment| path.join(segment))
    }

    /// Install an artifact and its descriptor into the repository
    pub async fn deploy(&self, coordinate: &Coordinate, dependencies: &[Dependency], content: &[u8]) -> Result<ArtifactHandle> {
        let version = coordinate.version().ok_or_else(|| {
            ResolveError::coordinate_format(&coordinate.to_string(), "deploy needs an exact version")
        })?;

        let artifact = self.resolve(&layout::artifact_path(coordinate, version));
        if let Some(parent) = artifact.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&artifact, content).await?;

        let descriptor = Descriptor::new(dependencies.to_vec()).to_json()?;
        tokio::fs::write(self.resolve(&layout::descriptor_path(coordinate, version)), descriptor).await?;

        log::debug!("Deployed {} to {}", coordinate, artifact.display());
        Ok(ArtifactHandle::new(artifact))
    }
}

fn io_failure(path: &Path, e: io::Error) -> RepositoryError {
    let reason = format!("{}: {}", path.display(), e);
    match e.kind() {
        io::ErrorKind::PermissionDenied => RepositoryError::Rejected(reason),
        _ => RepositoryError::Unavailable(reason),
    }
}

#[async_trait]
impl Repository for LocalRepository {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_versions(&self, ga: &CoordinateGA) -> std::result::Result<Option<Vec<String>>, RepositoryError> {
        let dir = self.resolve(&layout::ga_segments(ga).join("/"));

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_failure(&dir, e)),
        };

        let mut versions = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_failure(&dir, e))? {
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            if !is_dir {
                continue;
            }
            if let Some(version) = entry.file_name().to_str() {
                versions.push(version.to_string());
            }
        }
        versions.sort();

        Ok(if versions.is_empty() { None } else { Some(versions) })
    }

    async fn fetch_descriptor(&self, coordinate: &Coordinate) -> std::result::Result<Option<Vec<Dependency>>, RepositoryError> {
        let Some(version) = coordinate.version() else {
            return Ok(None);
        };
        let path = self.resolve(&layout::descriptor_path(coordinate, version));

        match tokio::fs::read(&path).await {
            Ok(bytes) => Descriptor::parse(&bytes).map(|d| Some(d.dependencies)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_failure(&path, e)),
        }
    }

    async fn fetch_artifact(&self, coordinate: &Coordinate) -> std::result::Result<Option<ArtifactHandle>, RepositoryError> {
        let Some(version) = coordinate.version() else {
            return Ok(None);
        };
        let path = self.resolve(&layout::artifact_path(coordinate, version));

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(Some(ArtifactHandle::new(path))),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_failure(&path, e)),
        }
    }
}
