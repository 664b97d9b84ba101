//! Options shared by every command and the resolver they configure

use anyhow::{bail, Context, Result};
use clap::Args;
use std::path::PathBuf;

use forge_deps::config::ConfigLoader;
use forge_deps::{CoordinateGA, FailureMode, RepositoryConfig, Resolver, ResolverConfig};

#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Repository directory or URL, queried in the order given
    #[arg(long = "repo", value_name = "PATH|URL", global = true, action = clap::ArgAction::Append)]
    pub repositories: Vec<String>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Cache directory (defaults to the user cache directory)
    #[arg(long, value_name = "DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Keep failed nodes in the result instead of aborting
    #[arg(long, global = true)]
    pub partial: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl GlobalArgs {
    /// Configuration file and `FORGE_DEPS_*` variables, overridden by flags
    pub fn config(&self) -> Result<ResolverConfig> {
        self.config_with(&ConfigLoader::new(true))
    }

    fn config_with(&self, loader: &ConfigLoader) -> Result<ResolverConfig> {
        let mut config = ResolverConfig::load(self.config.as_deref(), loader)
            .context("Failed to load configuration")?;

        // command line repositories take precedence over configured ones
        let configured = std::mem::take(&mut config.repositories);
        config.repositories = self
            .repositories
            .iter()
            .map(|location| RepositoryConfig::from_location(location))
            .chain(configured)
            .collect();

        let cache_dir = match (&self.cache_dir, &config.cache_dir) {
            (Some(dir), _) | (None, Some(dir)) => dir.clone(),
            (None, None) => loader.get_cache_dir(),
        };
        config.cache_dir = Some(cache_dir);

        if self.partial {
            config.failure_mode = FailureMode::Partial;
        }
        Ok(config)
    }

    /// A resolver for commands that query repositories
    pub fn resolver(&self) -> Result<Resolver> {
        self.resolver_with(&ConfigLoader::new(true))
    }

    fn resolver_with(&self, loader: &ConfigLoader) -> Result<Resolver> {
        let config = self.config_with(loader)?;
        if config.repositories.is_empty() {
            bail!("No repositories configured; pass --repo or list them in a configuration file");
        }
        Resolver::from_config(&config).context("Failed to set up the resolver")
    }
}

/// Parse `--exclude g:a` values
pub fn parse_exclusions(values: &[String]) -> Result<Vec<CoordinateGA>> {
    values
        .iter()
        .map(|value| CoordinateGA::parse(value).with_context(|| format!("Invalid exclusion {}", value)))
        .collect()
}
