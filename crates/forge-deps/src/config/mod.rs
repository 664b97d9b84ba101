//! Resolver configuration
//!
//! # Configuration Sources (in priority order, highest to lowest)
//!
//! 1. Environment variables (`FORGE_DEPS_*`)
//! 2. A JSON configuration file
//! 3. Built-in defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use forge_deps::config::ResolverConfig;
//! use std::path::Path;
//!
//! let config = ResolverConfig::build(Some(Path::new("forge-deps.json")), true).unwrap();
//! println!("Cache TTL: {:?}", config.cache_ttl());
//! ```

#[allow(clippy::module_inception)]
mod config;
mod source;

pub use config::{FailureMode, RepositoryConfig, RepositoryType, ResolverConfig, MAX_RETRIES_LIMIT};
pub use source::ConfigLoader;
