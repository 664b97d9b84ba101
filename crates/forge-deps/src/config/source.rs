use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::config::{FailureMode, ResolverConfig};
use crate::error::{ResolveError, Result};

const ENV_PREFIX: &str = "FORGE_DEPS_";

/// Loads configuration from files and `FORGE_DEPS_*` environment variables
#[derive(Debug)]
pub struct ConfigLoader {
    use_environment: bool,
    /// Fixed variables used instead of the process environment
    vars: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    pub fn new(use_environment: bool) -> Self {
        Self {
            use_environment,
            vars: None,
        }
    }

    /// Read variables from `vars` instead of the process environment
    pub fn with_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            use_environment: true,
            vars: Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }

    /// Get a FORGE_DEPS_* variable; `key` is the part after the prefix
    pub fn get_env(&self, key: &str) -> Option<String> {
        if !self.use_environment {
            return None;
        }

        let name = format!("{}{}", ENV_PREFIX, key);
        let value = match &self.vars {
            Some(vars) => vars.get(&name).cloned(),
            None => env::var(&name).ok(),
        };
        value.filter(|s| !s.is_empty())
    }

    fn get_env_parsed<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>> {
        match self.get_env(key) {
            Some(value) => value.trim().parse().map(Some).map_err(|_| {
                ResolveError::Config(format!("{}{} has an invalid value: {}", ENV_PREFIX, key, value))
            }),
            None => Ok(None),
        }
    }

    /// Get the cache directory
    pub fn get_cache_dir(&self) -> PathBuf {
        if let Some(cache) = self.get_env("CACHE_DIR") {
            return PathBuf::from(cache);
        }

        // Use XDG cache dir on Unix, AppData on Windows
        if let Some(proj_dirs) = directories::ProjectDirs::from("org", "jboss", "forge-deps") {
            proj_dirs.cache_dir().to_path_buf()
        } else {
            PathBuf::from(".forge-deps").join("cache")
        }
    }

    /// Load configuration from a JSON file
    pub fn load_config_file<P: AsRef<Path>>(&self, path: P) -> Result<ResolverConfig> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path)
            .map_err(|e| ResolveError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        let config: ResolverConfig = serde_json::from_str(&contents)
            .map_err(|e| ResolveError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Overlay environment variables onto `config`
    pub fn apply_environment(&self, config: &mut ResolverConfig) -> Result<()> {
        if let Some(dir) = self.get_env("CACHE_DIR") {
            config.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(ttl) = self.get_env_parsed("CACHE_TTL")? {
            config.cache_ttl = ttl;
        }
        if let Some(timeout) = self.get_env_parsed("TIMEOUT")? {
            config.timeout = timeout;
        }
        if let Some(retries) = self.get_env_parsed("MAX_RETRIES")? {
            config.max_retries = retries;
        }
        if let Some(proxy) = self.get_env("PROXY") {
            config.proxy = Some(proxy);
        }
        if let Some(mode) = self.get_env("FAILURE_MODE") {
            config.failure_mode = FailureMode::parse(&mode).ok_or_else(|| {
                ResolveError::Config(format!("{}FAILURE_MODE has an invalid value: {}", ENV_PREFIX, mode))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_loader_new() {
        let loader = ConfigLoader::new(true);
        assert!(loader.use_environment);

        let loader = ConfigLoader::new(false);
        assert!(!loader.use_environment);
        assert!(loader.get_env("CACHE_DIR").is_none());
    }

    #[test]
    fn test_get_cache_dir() {
        let loader = ConfigLoader::new(false);
        let cache = loader.get_cache_dir();
        assert!(cache.is_absolute() || cache.ends_with("cache"));

        let loader = ConfigLoader::with_vars([("FORGE_DEPS_CACHE_DIR", "/tmp/forge")]);
        assert_eq!(loader.get_cache_dir(), PathBuf::from("/tmp/forge"));
    }

    #[test]
    fn test_apply_environment() {
        let loader = ConfigLoader::with_vars([
            ("FORGE_DEPS_CACHE_TTL", "60"),
            ("FORGE_DEPS_TIMEOUT", "5"),
            ("FORGE_DEPS_MAX_RETRIES", "0"),
            ("FORGE_DEPS_FAILURE_MODE", "partial"),
            ("FORGE_DEPS_PROXY", "http://proxy.example.com:3128"),
            ("FORGE_DEPS_CACHE_DIR", ""),
        ]);
        let mut config = ResolverConfig::default();
        loader.apply_environment(&mut config).unwrap();

        assert_eq!(config.cache_ttl, 60);
        assert_eq!(config.timeout, 5);
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.failure_mode, FailureMode::Partial);
        assert_eq!(config.proxy.as_deref(), Some("http://proxy.example.com:3128"));
        assert_eq!(config.cache_dir, None);
    }

    #[test]
    fn test_invalid_environment() {
        let mut config = ResolverConfig::default();

        let loader = ConfigLoader::with_vars([("FORGE_DEPS_TIMEOUT", "soon")]);
        assert!(matches!(loader.apply_environment(&mut config), Err(ResolveError::Config(_))));

        let loader = ConfigLoader::with_vars([("FORGE_DEPS_FAILURE_MODE", "ignore")]);
        assert!(loader.apply_environment(&mut config).is_err());
    }

    #[test]
    fn test_missing_file() {
        let loader = ConfigLoader::new(false);
        assert!(loader.load_config_file("/definitely/not/here.json").is_err());
    }
}
