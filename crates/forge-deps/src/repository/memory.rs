//! In-memory repository - artifacts defined programmatically or inline as JSON.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Deserialize;

use super::traits::{Repository, RepositoryError};
use crate::coordinate::{Coordinate, CoordinateGA};
use crate::dependency::{ArtifactHandle, Dependency};
use crate::error::{ResolveError, Result};

/// Repository holding its whole content in memory.
///
/// Descriptors are shared by every packaging and classifier of a version,
/// as in a Maven layout. Artifact files are only known when registered with
/// [`InMemoryRepository::add_artifact_file`].
///
/// Inline JSON form accepted by [`InMemoryRepository::from_json`]:
///
/// ```json
/// [
///     {
///         "coordinate": "org.example:lib:1.0",
///         "dependencies": [{"coordinate": "org.example:util:2.0", "scope": "runtime"}],
///         "file": "/path/to/lib-1.0.jar"
///     }
/// ]
/// ```
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    name: String,
    versions: IndexMap<CoordinateGA, Vec<String>>,
    descriptors: HashMap<String, Vec<Dependency>>,
    artifacts: HashMap<String, ArtifactHandle>,
}

#[derive(Debug, Deserialize)]
struct InlineArtifact {
    coordinate: Coordinate,
    #[serde(default)]
    dependencies: Vec<Dependency>,
    #[serde(default)]
    file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InlineArtifacts {
    Many(Vec<InlineArtifact>),
    One(InlineArtifact),
}

impl InMemoryRepository {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Load artifacts from an inline definition (single object or array)
    pub fn from_json(name: impl Into<String>, json: &serde_json::Value) -> Result<Self> {
        let name = name.into();
        let inline: InlineArtifacts = serde_json::from_value(json.clone())
            .map_err(|e| ResolveError::Config(format!("Invalid inline repository {}: {}", name, e)))?;
        let entries = match inline {
            InlineArtifacts::Many(entries) => entries,
            InlineArtifacts::One(entry) => vec![entry],
        };

        let mut repo = Self::new(name);
        for entry in entries {
            if entry.coordinate.version().is_none() {
                return Err(ResolveError::Config(format!(
                    "Inline artifact {} has no version",
                    entry.coordinate
                )));
            }
            if let Some(file) = entry.file {
                repo.add_artifact_file(entry.coordinate.clone(), file);
            }
            repo.add_artifact(entry.coordinate, entry.dependencies);
        }
        Ok(repo)
    }

    /// Publish a version and its descriptor. Re-adding replaces the descriptor.
    pub fn add_artifact(&mut self, coordinate: Coordinate, dependencies: Vec<Dependency>) -> &mut Self {
        if let Some(version) = coordinate.version() {
            let versions = self.versions.entry(coordinate.ga()).or_default();
            if !versions.iter().any(|v| v == version) {
                versions.push(version.to_string());
            }
            self.descriptors.insert(coordinate.gav(), dependencies);
        }
        self
    }

    /// Register the local file backing an artifact
    pub fn add_artifact_file(&mut self, coordinate: Coordinate, path: impl Into<PathBuf>) -> &mut Self {
        self.artifacts.insert(coordinate.to_key(), ArtifactHandle::new(path));
        self
    }

    /// Number of distinct group+artifact pairs
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_versions(&self, ga: &CoordinateGA) -> std::result::Result<Option<Vec<String>>, RepositoryError> {
        Ok(self.versions.get(ga).cloned())
    }

    async fn fetch_descriptor(&self, coordinate: &Coordinate) -> std::result::Result<Option<Vec<Dependency>>, RepositoryError> {
        Ok(self.descriptors.get(&coordinate.gav()).cloned())
    }

    async fn fetch_artifact(&self, coordinate: &Coordinate) -> std::result::Result<Option<ArtifactHandle>, RepositoryError> {
        Ok(self.artifacts.get(&coordinate.to_key()).cloned())
    }
}
