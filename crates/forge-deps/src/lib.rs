//! Artifact dependency resolution
//!
//! Resolves `group:artifact[:packaging[:classifier]]:version` coordinates
//! against an ordered list of repositories into version lists, single
//! artifacts and mediated dependency trees.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use forge_deps::{DependencyQueryBuilder, LocalRepository, Resolver};
//! use forge_deps::query::filters;
//!
//! # async fn run() -> forge_deps::Result<()> {
//! let resolver = Resolver::builder()
//!     .with_repository(Arc::new(LocalRepository::new("/srv/forge-repo")))
//!     .build()?;
//!
//! let query = DependencyQueryBuilder::parse("org.jboss.forge:example:jar:forge-addon:2.0.0")?
//!     .with_filter(filters::classifier("forge-addon"));
//! let tree = resolver.resolve_dependency_hierarchy(query).await?;
//! println!("{}", tree);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod conflict;
pub mod coordinate;
pub mod dependency;
pub mod error;
mod fetch;
pub mod graph;
pub mod http;
pub mod node;
pub mod query;
pub mod repository;
pub mod resolver;

pub use cache::{CacheStats, ResolutionCache};
pub use config::{FailureMode, RepositoryConfig, RepositoryType, ResolverConfig};
pub use conflict::{ConflictResolver, Substitution};
pub use coordinate::{Coordinate, CoordinateBuilder, CoordinateGA};
pub use dependency::{ArtifactHandle, Dependency, ScopeType};
pub use error::{ResolveError, Result};
pub use graph::{CancellationFlag, Diagnostic};
pub use node::DependencyNode;
pub use query::{DependencyFilter, DependencyQuery, DependencyQueryBuilder};
pub use repository::{
    InMemoryRepository, LocalRepository, RemoteRepository, Repository, RepositoryError, RepositoryRegistry,
};
pub use resolver::{Resolution, Resolver, ResolverBuilder};

pub use forge_version::{DefaultVersionScheme, VersionScheme, VersionSpec};
