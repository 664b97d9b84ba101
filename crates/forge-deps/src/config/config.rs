use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::source::ConfigLoader;
use crate::http::HttpAuth;

/// Upper bound accepted for `max-retries`
pub const MAX_RETRIES_LIMIT: u32 = 10;
use crate::error::{ResolveError, Result};

/// What to do when a single node of the tree cannot be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// Fail the whole resolution
    #[default]
    Abort,
    /// Keep the failed node, flagged, and report it as a diagnostic
    Partial,
}

impl FailureMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Some(FailureMode::Abort),
            "partial" => Some(FailureMode::Partial),
            _ => None,
        }
    }
}

/// Repository type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryType {
    /// Directory in Maven layout
    Local,
    /// Maven layout over HTTP(S)
    Remote,
}

/// Configuration for a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(rename = "type")]
    pub repo_type: RepositoryType,
    /// Repository URL or path
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Basic auth credentials for remote repositories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Bearer token; wins over `username`/`password`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl RepositoryConfig {
    /// `http(s)://` locations are remote, anything else is a local path
    pub fn from_location(location: &str) -> Self {
        let repo_type = if location.starts_with("http://") || location.starts_with("https://") {
            RepositoryType::Remote
        } else {
            RepositoryType::Local
        };
        Self {
            repo_type,
            url: location.to_string(),
            name: None,
            username: None,
            password: None,
            token: None,
        }
    }

    /// Credentials sent with every request to this repository
    pub fn auth(&self) -> Option<HttpAuth> {
        if let Some(token) = &self.token {
            return Some(HttpAuth::Bearer(token.clone()));
        }
        self.username.as_ref().map(|username| HttpAuth::Basic {
            username: username.clone(),
            password: self.password.clone().unwrap_or_default(),
        })
    }
}

/// Resolver configuration, read from JSON with kebab-case keys:
///
/// ```json
/// {
///     "repositories": [
///         {"type": "local", "url": "/home/me/.m2/forge"},
///         {"type": "remote", "url": "https://repo.example.com/forge", "name": "example"}
///     ],
///     "cache-ttl": 600,
///     "failure-mode": "partial"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ResolverConfig {
    /// Repositories in priority order
    pub repositories: Vec<RepositoryConfig>,
    /// Disk backing of the resolution cache and download directory
    pub cache_dir: Option<PathBuf>,
    /// Staleness window of non-exact cache entries, in seconds
    pub cache_ttl: u64,
    /// Deadline of a single repository call, in seconds
    pub timeout: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    /// Upper bound on concurrent repository fetches per resolution
    pub max_concurrency: usize,
    pub failure_mode: FailureMode,
    /// Classifiers whose artifacts are always flagged optional
    pub optional_classifiers: Vec<String>,
    /// HTTP(S) proxy for remote repositories
    pub proxy: Option<String>,
    /// Extra PEM root certificate for remote repositories
    pub cafile: Option<PathBuf>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            repositories: Vec::new(),
            cache_dir: None,
            cache_ttl: 600,
            timeout: 30,
            max_retries: 3,
            retry_delay_ms: 1000,
            max_concurrency: 16,
            failure_mode: FailureMode::Abort,
            optional_classifiers: vec!["forge-addon".to_string()],
            proxy: None,
            cafile: None,
        }
    }
}

impl ResolverConfig {
    /// Defaults, overlaid by `config_file` (if any), then by `FORGE_DEPS_*`
    /// environment variables when `use_environment` is set
    pub fn build(config_file: Option<&Path>, use_environment: bool) -> Result<Self> {
        Self::load(config_file, &ConfigLoader::new(use_environment))
    }

    /// Like `build`, reading variables through `loader`
    pub fn load(config_file: Option<&Path>, loader: &ConfigLoader) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => loader.load_config_file(path)?,
            None => Self::default(),
        };
        loader.apply_environment(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(ResolveError::Config("max-concurrency must be at least 1".to_string()));
        }
        if self.timeout == 0 {
            return Err(ResolveError::Config("timeout must be at least 1 second".to_string()));
        }
        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(ResolveError::Config(format!(
                "max-retries must be at most {}, got {}",
                MAX_RETRIES_LIMIT, self.max_retries
            )));
        }
        for repo in &self.repositories {
            if repo.url.trim().is_empty() {
                return Err(ResolveError::Config("repository url is empty".to_string()));
            }
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Where remote repositories put downloaded artifacts
    pub fn download_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| ConfigLoader::new(false).get_cache_dir())
            .join("artifacts")
    }

    /// Whether artifacts with this classifier are optional by convention
    pub fn is_optional_classifier(&self, classifier: Option<&str>) -> bool {
        classifier.is_some_and(|c| self.optional_classifiers.iter().any(|o| o == c))
    }

    pub fn with_repository(mut self, repository: RepositoryConfig) -> Self {
        self.repositories.push(repository);
        self
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    pub fn with_failure_mode(mut self, failure_mode: FailureMode) -> Self {
        self.failure_mode = failure_mode;
        self
    }
}
