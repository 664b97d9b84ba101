//! Shared fixtures for the resolver integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use forge_deps::{
    ArtifactHandle, CancellationFlag, Coordinate, CoordinateGA, Dependency, InMemoryRepository, Repository,
    RepositoryError, Resolver, ResolverConfig,
};

pub const FORGE_EXAMPLE: &str = "org.jboss.forge:example:jar:forge-addon:2.0.0-SNAPSHOT";

pub fn coord(text: &str) -> Coordinate {
    Coordinate::parse(text).unwrap()
}

pub fn dep(text: &str) -> Dependency {
    Dependency::new(coord(text))
}

pub fn ga(text: &str) -> CoordinateGA {
    CoordinateGA::parse(text).unwrap()
}

/// The forge addon example: the addon depends on `example2` and then on
/// `commons-lang` 2.6, while `example2` itself pulls in commons-lang 2.5.
pub fn forge_repository() -> InMemoryRepository {
    let mut repo = InMemoryRepository::new("forge");
    repo.add_artifact(
        coord(FORGE_EXAMPLE),
        vec![
            dep("org.jboss.forge:example2:2.0.0-SNAPSHOT"),
            dep("commons-lang:commons-lang:2.6"),
        ],
    );
    repo.add_artifact(
        coord("org.jboss.forge:example2:2.0.0-SNAPSHOT"),
        vec![dep("commons-lang:commons-lang:2.5")],
    );
    repo.add_artifact(coord("commons-lang:commons-lang:2.5"), vec![]);
    repo.add_artifact(coord("commons-lang:commons-lang:2.6"), vec![]);
    repo
}

/// Descriptors keyed by `g:a:v`, everything else derived
pub fn repository(name: &str, graph: &[(&str, &[&str])]) -> InMemoryRepository {
    let mut repo = InMemoryRepository::new(name);
    for (artifact, dependencies) in graph {
        repo.add_artifact(coord(artifact), dependencies.iter().map(|d| dep(d)).collect());
    }
    repo
}

pub fn resolver(repo: impl Repository + 'static) -> Resolver {
    resolver_with_config(Arc::new(repo), ResolverConfig::default())
}

pub fn resolver_with_config(repo: Arc<dyn Repository>, config: ResolverConfig) -> Resolver {
    Resolver::builder()
        .with_repository(repo)
        .with_config(config)
        .build()
        .unwrap()
}

/// Wraps a repository, counting descriptor fetches per coordinate and
/// optionally slowing down or cancelling on chosen artifacts
pub struct Instrumented {
    inner: InMemoryRepository,
    pub descriptor_calls: Mutex<HashMap<String, usize>>,
    pub version_calls: Mutex<usize>,
    delay: Duration,
    slow: Option<(String, Duration)>,
    cancel_on: Option<(String, CancellationFlag)>,
    malformed: Option<String>,
}

impl Instrumented {
    pub fn new(inner: InMemoryRepository) -> Self {
        Self {
            inner,
            descriptor_calls: Mutex::new(HashMap::new()),
            version_calls: Mutex::new(0),
            delay: Duration::ZERO,
            slow: None,
            cancel_on: None,
            malformed: None,
        }
    }

    /// Delay every descriptor fetch
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Delay descriptor fetches of one artifact id
    pub fn with_slow(mut self, artifact_id: &str, delay: Duration) -> Self {
        self.slow = Some((artifact_id.to_string(), delay));
        self
    }

    /// Raise `flag` while fetching the descriptor of one artifact id
    pub fn with_cancel_on(mut self, artifact_id: &str, flag: CancellationFlag) -> Self {
        self.cancel_on = Some((artifact_id.to_string(), flag));
        self
    }

    /// Answer descriptor fetches of one artifact id with unparseable content
    pub fn with_malformed(mut self, artifact_id: &str) -> Self {
        self.malformed = Some(artifact_id.to_string());
        self
    }

    pub fn calls_for(&self, gav: &str) -> usize {
        self.descriptor_calls.lock().unwrap().get(gav).copied().unwrap_or(0)
    }

    pub fn total_descriptor_calls(&self) -> usize {
        self.descriptor_calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Repository for Instrumented {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn list_versions(&self, ga: &CoordinateGA) -> Result<Option<Vec<String>>, RepositoryError> {
        *self.version_calls.lock().unwrap() += 1;
        self.inner.list_versions(ga).await
    }

    async fn fetch_descriptor(&self, coordinate: &Coordinate) -> Result<Option<Vec<Dependency>>, RepositoryError> {
        *self
            .descriptor_calls
            .lock()
            .unwrap()
            .entry(coordinate.gav())
            .or_insert(0) += 1;

        if let Some((artifact_id, flag)) = &self.cancel_on {
            if coordinate.artifact_id() == artifact_id.as_str() {
                flag.cancel();
            }
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some((artifact_id, delay)) = &self.slow {
            if coordinate.artifact_id() == artifact_id.as_str() {
                tokio::time::sleep(*delay).await;
            }
        }
        if self.malformed.as_deref() == Some(coordinate.artifact_id()) {
            return Err(RepositoryError::Malformed("expected value at line 1 column 1".to_string()));
        }
        self.inner.fetch_descriptor(coordinate).await
    }

    async fn fetch_artifact(&self, coordinate: &Coordinate) -> Result<Option<ArtifactHandle>, RepositoryError> {
        self.inner.fetch_artifact(coordinate).await
    }
}

/// Artifact ids of a node's children, in order
pub fn child_ids(node: &forge_deps::DependencyNode) -> Vec<&str> {
    node.children()
        .iter()
        .map(|c| c.dependency().coordinate().artifact_id())
        .collect()
}
