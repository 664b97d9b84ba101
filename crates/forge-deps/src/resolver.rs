use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;

use forge_version::{DefaultVersionScheme, VersionScheme, VersionSpec};

use crate::cache::{CacheStats, DiskStore, ResolutionCache};
use crate::config::{RepositoryConfig, RepositoryType, ResolverConfig};
use crate::conflict::{ConflictResolver, Substitution};
use crate::coordinate::Coordinate;
use crate::dependency::Dependency;
use crate::error::{ResolveError, Result};
use crate::fetch::Fetcher;
use crate::graph::{self, CancellationFlag, Diagnostic, GraphBuilder};
use crate::http::{HttpClient, HttpClientConfig};
use crate::node::DependencyNode;
use crate::query::DependencyQuery;
use crate::repository::{LocalRepository, RemoteRepository, Repository, RepositoryRegistry};

/// Outcome of a full resolution
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Root of the mediated tree
    pub root: DependencyNode,
    /// Nodes dropped by version mediation, in visit order
    pub substitutions: Vec<Substitution>,
    /// Nodes that failed but were kept; only filled in partial mode
    pub diagnostics: Vec<Diagnostic>,
}

/// Entry point of the resolver.
///
/// A resolver owns the repository registry and one resolution cache; every
/// call on the same resolver shares that cache, so concurrent resolutions
/// never fetch the same key twice.
pub struct Resolver {
    registry: RepositoryRegistry,
    cache: ResolutionCache,
    scheme: Arc<dyn VersionScheme>,
    config: ResolverConfig,
    permits: Semaphore,
}

impl Resolver {
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::new()
    }

    /// Build a resolver with the repositories and settings of `config`
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        ResolverBuilder::new().with_config(config.clone()).build()
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn registry(&self) -> &RepositoryRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop every cached answer, in memory and on disk
    pub async fn refresh(&self) -> Result<()> {
        log::debug!("Clearing resolution cache");
        self.cache.clear().await
    }

    fn fetcher(&self, refresh: bool) -> Fetcher<'_> {
        Fetcher {
            registry: &self.registry,
            cache: &self.cache,
            scheme: self.scheme.as_ref(),
            permits: &self.permits,
            refresh,
        }
    }

    fn is_optional_by_convention(&self, coordinate: &Coordinate) -> bool {
        self.config.is_optional_classifier(coordinate.classifier())
    }

    /// The dependency a query asks for, as the filters see it
    fn query_dependency(&self, query: &DependencyQuery, coordinate: Coordinate) -> Dependency {
        let optional = self.is_optional_by_convention(&coordinate);
        Dependency::new(coordinate)
            .with_scope(query.scope())
            .with_optional(optional)
    }

    /// All published versions of the query's group+artifact, newest first.
    ///
    /// The version of the query coordinate, if any, restricts the list; the
    /// filter is applied last. A known artifact for which nothing passes the
    /// filter gives an empty list.
    pub async fn resolve_versions(&self, query: impl Into<DependencyQuery>) -> Result<Vec<Coordinate>> {
        let query = query.into();
        let fetcher = self.fetcher(query.is_refresh());
        let coordinate = query.coordinate();
        let spec = fetcher.spec(coordinate)?;

        let versions = fetcher
            .versions(&coordinate.ga())
            .await?
            .ok_or_else(|| ResolveError::NoMatchingVersion {
                coordinate: coordinate.to_string(),
            })?;

        let mut versions: Vec<String> = versions
            .value
            .into_iter()
            .filter(|v| self.scheme.matches(&spec, v))
            .collect();
        self.scheme.sort_descending(&mut versions);

        Ok(versions
            .into_iter()
            .map(|v| coordinate.with_version(v))
            .filter(|c| query.accepts(&self.query_dependency(&query, c.clone())))
            .collect())
    }

    /// Resolve the query to a single artifact and make sure its file exists
    pub async fn resolve_artifact(&self, query: impl Into<DependencyQuery>) -> Result<Dependency> {
        let query = query.into();
        let fetcher = self.fetcher(query.is_refresh());
        let pattern = query.coordinate();
        let not_found = || ResolveError::ArtifactNotFound {
            coordinate: pattern.to_string(),
        };

        let candidates: Vec<Coordinate> = match pattern.version() {
            Some(_) => match fetcher.spec(pattern)? {
                VersionSpec::Exact(_) => vec![pattern.clone()],
                _ => vec![fetcher.resolve_version(pattern).await?],
            },
            None => {
                let mut versions = fetcher
                    .versions(&pattern.ga())
                    .await?
                    .ok_or_else(not_found)?
                    .value;
                self.scheme.sort_descending(&mut versions);
                versions.into_iter().map(|v| pattern.with_version(v)).collect()
            }
        };

        let mut matching: Vec<Dependency> = candidates
            .into_iter()
            .map(|c| self.query_dependency(&query, c))
            .filter(|d| query.accepts(d))
            .collect();

        let dependency = match matching.len() {
            0 => return Err(not_found()),
            1 => matching.remove(0),
            _ => {
                return Err(ResolveError::AmbiguousQuery {
                    pattern: pattern.to_string(),
                    candidates: matching.iter().map(|d| d.coordinate().to_string()).collect(),
                })
            }
        };

        let artifact = fetcher
            .artifact(dependency.coordinate())
            .await?
            .ok_or_else(|| ResolveError::ArtifactNotFound {
                coordinate: dependency.coordinate().to_string(),
            })?;

        if !artifact.value.exists() {
            return Err(ResolveError::ArtifactNotFound {
                coordinate: dependency.coordinate().to_string(),
            });
        }

        log::debug!(
            "{} found in {} at {}",
            dependency.coordinate(),
            artifact.origin,
            artifact.value.path().display()
        );
        Ok(dependency.with_artifact(artifact.value))
    }

    /// Every node of the mediated tree accepted by the query filter, root
    /// included. Nodes that failed in partial mode are left out.
    pub async fn resolve_dependencies(&self, query: impl Into<DependencyQuery>) -> Result<HashSet<Dependency>> {
        let query = query.into();
        let resolution = self.resolve(query.clone()).await?;

        Ok(resolution
            .root
            .iter()
            .filter(|node| !node.is_failed())
            .map(|node| node.dependency())
            .filter(|dependency| query.accepts(dependency))
            .cloned()
            .collect())
    }

    /// Root of the mediated dependency tree
    pub async fn resolve_dependency_hierarchy(&self, query: impl Into<DependencyQuery>) -> Result<DependencyNode> {
        Ok(self.resolve(query).await?.root)
    }

    /// Build and mediate the tree, keeping substitutions and diagnostics
    pub async fn resolve(&self, query: impl Into<DependencyQuery>) -> Result<Resolution> {
        self.resolve_with_cancellation(query, &CancellationFlag::new()).await
    }

    pub async fn resolve_with_cancellation(
        &self,
        query: impl Into<DependencyQuery>,
        cancel: &CancellationFlag,
    ) -> Result<Resolution> {
        let query = query.into();
        if cancel.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }

        log::debug!("Resolving {}", query.coordinate());
        let fetcher = self.fetcher(query.is_refresh());
        let coordinate = fetcher.resolve_version(query.coordinate()).await?;
        let root = self
            .query_dependency(&query, coordinate)
            .with_exclusions(query.exclusions().iter().cloned());

        let builder = GraphBuilder::new(
            fetcher,
            &query,
            self.config.failure_mode,
            &self.config.optional_classifiers,
            cancel,
        );
        let mut tree = builder.build(root).await?;

        let diagnostics = graph::diagnostics(&tree);
        let substitutions = ConflictResolver::new(self.scheme.as_ref()).resolve(&mut tree);

        log::debug!(
            "Resolved {} into {} nodes ({} substitutions, {} failures)",
            tree.dependency().coordinate(),
            tree.node_count(),
            substitutions.len(),
            diagnostics.len()
        );

        Ok(Resolution {
            root: tree,
            substitutions,
            diagnostics,
        })
    }
}

/// Builder for [`Resolver`]
pub struct ResolverBuilder {
    repositories: Vec<Arc<dyn Repository>>,
    config: ResolverConfig,
    scheme: Option<Arc<dyn VersionScheme>>,
    cache_dir: Option<PathBuf>,
}

impl ResolverBuilder {
    pub fn new() -> Self {
        Self {
            repositories: Vec::new(),
            config: ResolverConfig::default(),
            scheme: None,
            cache_dir: None,
        }
    }

    /// Add a repository; repositories are queried in the order added
    pub fn with_repository(mut self, repository: Arc<dyn Repository>) -> Self {
        self.repositories.push(repository);
        self
    }

    pub fn with_repositories(mut self, repositories: impl IntoIterator<Item = Arc<dyn Repository>>) -> Self {
        self.repositories.extend(repositories);
        self
    }

    /// Repositories listed in `config` come after the ones added directly
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_version_scheme(mut self, scheme: Arc<dyn VersionScheme>) -> Self {
        self.scheme = Some(scheme);
        self
    }

    /// Back the cache with files below `cache_dir`
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    pub fn build(self) -> Result<Resolver> {
        self.config.validate()?;
        let config = self.config;
        let cache_dir = self.cache_dir.or_else(|| config.cache_dir.clone());

        let mut registry = RepositoryRegistry::new()
            .with_timeout(config.timeout())
            .with_max_retries(config.max_retries)
            .with_retry_delay(config.retry_delay());
        for repository in self.repositories {
            registry.add_repository(repository);
        }

        let mut http_client = None;
        for repo_config in &config.repositories {
            let repository = configured_repository(repo_config, &config, cache_dir.as_ref(), &mut http_client)?;
            log::debug!("Using repository {}", repository.name());
            registry.add_repository(repository);
        }

        if registry.is_empty() {
            log::warn!("Resolver has no repositories; every lookup will come back empty");
        }

        let mut cache = ResolutionCache::new(config.cache_ttl());
        if let Some(dir) = &cache_dir {
            cache = cache.with_disk(DiskStore::open(dir.join("resolution")));
        }

        Ok(Resolver {
            registry,
            cache,
            scheme: self.scheme.unwrap_or_else(|| Arc::new(DefaultVersionScheme)),
            permits: Semaphore::new(config.max_concurrency),
            config,
        })
    }
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn configured_repository(
    repo_config: &RepositoryConfig,
    config: &ResolverConfig,
    cache_dir: Option<&PathBuf>,
    http_client: &mut Option<Arc<HttpClient>>,
) -> Result<Arc<dyn Repository>> {
    match repo_config.repo_type {
        RepositoryType::Local => {
            let mut repository = LocalRepository::new(&repo_config.url);
            if let Some(name) = &repo_config.name {
                repository = repository.with_name(name);
            }
            Ok(Arc::new(repository))
        }
        RepositoryType::Remote => {
            let shared = match http_client.as_ref() {
                Some(client) => client.clone(),
                None => {
                    let client = Arc::new(shared_http_client(config)?);
                    *http_client = Some(client.clone());
                    client
                }
            };
            // credentials are per repository; the connection pool is shared
            let client = match repo_config.auth() {
                Some(auth) => Arc::new(shared.as_ref().clone().with_auth(auth)),
                None => shared,
            };

            let download_dir = match cache_dir {
                Some(dir) => dir.join("artifacts"),
                None => config.download_dir(),
            };
            let mut repository = RemoteRepository::new(&repo_config.url, client, download_dir)?;
            if let Some(name) = &repo_config.name {
                repository = repository.with_name(name);
            }
            Ok(Arc::new(repository))
        }
    }
}

fn shared_http_client(config: &ResolverConfig) -> Result<HttpClient> {
    let mut client_config = HttpClientConfig::new().with_timeout(config.timeout());
    if let Some(proxy) = &config.proxy {
        client_config = client_config.with_proxy(proxy.clone());
    }
    if let Some(cafile) = &config.cafile {
        client_config = client_config.with_cafile(cafile.clone());
    }
    HttpClient::with_config(client_config)
        .map_err(|e| ResolveError::Config(format!("Failed to create HTTP client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;

    fn resolver_with(repo: InMemoryRepository) -> Resolver {
        Resolver::builder()
            .with_repository(Arc::new(repo))
            .build()
            .unwrap()
    }

    fn coord(s: &str) -> Coordinate {
        Coordinate::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_versions_restricted_by_spec() {
        let mut repo = InMemoryRepository::new("memory");
        for v in ["1.0", "1.5", "2.0-SNAPSHOT", "2.0"] {
            repo.add_artifact(coord(&format!("g:a:{}", v)), vec![]);
        }
        let resolver = resolver_with(repo);

        let all = resolver.resolve_versions(coord("g:a")).await.unwrap();
        let all: Vec<_> = all.iter().map(|c| c.version().unwrap()).collect();
        assert_eq!(all, vec!["2.0", "2.0-SNAPSHOT", "1.5", "1.0"]);

        let range = resolver.resolve_versions(coord("g:a:[1.0,2.0)")).await.unwrap();
        assert_eq!(range.len(), 3);

        let release = resolver.resolve_versions(coord("g:a:RELEASE")).await.unwrap();
        assert!(release.iter().all(|c| !c.version().unwrap().ends_with("SNAPSHOT")));
    }

    #[tokio::test]
    async fn test_resolve_artifact_without_file_is_not_found() {
        let mut repo = InMemoryRepository::new("memory");
        repo.add_artifact(coord("g:a:1.0"), vec![]);
        let resolver = resolver_with(repo);

        let err = resolver.resolve_artifact(coord("g:a:1.0")).await.unwrap_err();
        assert!(matches!(err, ResolveError::ArtifactNotFound { .. }));
    }

    #[tokio::test]
    async fn test_builder_rejects_invalid_config() {
        let mut config = ResolverConfig::default();
        config.max_concurrency = 0;
        assert!(Resolver::builder().with_config(config).build().is_err());
    }

    #[tokio::test]
    async fn test_from_config_builds_repositories() {
        let dir = tempfile::tempdir().unwrap();
        let config = ResolverConfig::default()
            .with_cache_dir(dir.path())
            .with_repository(RepositoryConfig::from_location(dir.path().join("repo").to_str().unwrap()))
            .with_repository(RepositoryConfig::from_location("https://repo.example.com/forge"));

        let resolver = Resolver::from_config(&config).unwrap();
        assert_eq!(resolver.registry().repositories().len(), 2);
        assert_eq!(resolver.registry().repositories()[1].name(), "repo.example.com");
        assert!(resolver.cache().disk().is_some());
    }
}
