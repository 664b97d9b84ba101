//! Dependency graph expansion
//!
//! The builder walks descriptors depth-first from the root. Siblings are
//! expanded concurrently but joined in declaration order, so the children of
//! every node keep the order of its descriptor no matter which fetch finishes
//! first. Shared sub-dependencies are de-duplicated by the resolution cache;
//! every node still owns its own copy of its dependency.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::future::{join_all, BoxFuture};
use futures_util::FutureExt;

use crate::config::FailureMode;
use crate::coordinate::{Coordinate, CoordinateGA};
use crate::dependency::Dependency;
use crate::error::{ResolveError, Result};
use crate::fetch::Fetcher;
use crate::node::DependencyNode;
use crate::query::DependencyQuery;

/// Cooperative cancellation shared between a caller and a running resolution.
///
/// Once set, no new repository fetch is issued; fetches already started run
/// to completion so the cache is never left half-populated.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A node that failed but was kept in a partial result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Path from the root to the failed node, both included
    pub path: Vec<Coordinate>,
    pub message: String,
}

impl Diagnostic {
    pub fn coordinate(&self) -> Option<&Coordinate> {
        self.path.last()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<String> = self.path.iter().map(|c| c.to_string()).collect();
        write!(f, "{}: {}", path.join(" -> "), self.message)
    }
}

/// Collect the failed nodes of a tree, pre-order
pub(crate) fn diagnostics(root: &DependencyNode) -> Vec<Diagnostic> {
    fn walk(node: &DependencyNode, path: &mut Vec<Coordinate>, out: &mut Vec<Diagnostic>) {
        path.push(node.dependency().coordinate().clone());
        if let Some(reason) = node.failure() {
            out.push(Diagnostic {
                path: path.clone(),
                message: reason.to_string(),
            });
        }
        for child in node.children() {
            walk(child, path, out);
        }
        path.pop();
    }

    let mut out = Vec::new();
    walk(root, &mut Vec::new(), &mut out);
    out
}

/// Expands a root dependency into a full, unmediated tree
pub(crate) struct GraphBuilder<'a> {
    fetcher: Fetcher<'a>,
    query: &'a DependencyQuery,
    failure_mode: FailureMode,
    optional_classifiers: &'a [String],
    cancel: &'a CancellationFlag,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(
        fetcher: Fetcher<'a>,
        query: &'a DependencyQuery,
        failure_mode: FailureMode,
        optional_classifiers: &'a [String],
        cancel: &'a CancellationFlag,
    ) -> Self {
        Self {
            fetcher,
            query,
            failure_mode,
            optional_classifiers,
            cancel,
        }
    }

    /// Flag artifacts whose classifier is optional by convention
    pub fn apply_optional_convention(&self, dependency: Dependency) -> Dependency {
        let by_classifier = dependency
            .coordinate()
            .classifier()
            .is_some_and(|c| self.optional_classifiers.iter().any(|o| o == c));
        if by_classifier && !dependency.is_optional() {
            dependency.with_optional(true)
        } else {
            dependency
        }
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }
        Ok(())
    }

    /// Build the tree below an already resolved root
    pub async fn build(&self, root: Dependency) -> Result<DependencyNode> {
        let path = vec![root.coordinate().clone()];
        self.expand(root, 0, path, BTreeSet::new()).await
    }

    /// Turn a node failure into a flagged node when partial results are
    /// allowed. The root itself never degrades.
    fn recover(&self, dependency: Dependency, depth: usize, error: ResolveError) -> Result<DependencyNode> {
        if depth > 0 && self.failure_mode == FailureMode::Partial && !error.is_fatal() {
            log::warn!("Skipping {}: {}", dependency.coordinate(), error);
            Ok(DependencyNode::failed(dependency, depth, error.to_string()))
        } else {
            Err(error)
        }
    }

    fn expand<'s>(
        &'s self,
        dependency: Dependency,
        depth: usize,
        path: Vec<Coordinate>,
        inherited: BTreeSet<CoordinateGA>,
    ) -> BoxFuture<'s, Result<DependencyNode>> {
        async move {
            self.check_cancelled()?;

            let declared = match self.fetcher.descriptor(dependency.coordinate()).await {
                Ok(declared) => declared,
                Err(e) => return self.recover(dependency, depth, e),
            };

            let mut exclusions = inherited;
            exclusions.extend(dependency.exclusions().iter().cloned());

            let mut pending = Vec::new();
            for child in declared {
                let ga = child.coordinate().ga();
                if exclusions.iter().any(|pattern| pattern.matches(&ga)) {
                    log::trace!("{} excluded below {}", child.coordinate(), dependency.coordinate());
                    continue;
                }
                pending.push(self.expand_child(child, depth + 1, path.clone(), exclusions.clone()));
            }

            let mut node = DependencyNode::new(dependency, depth);
            for result in join_all(pending).await {
                if let Some(child) = result? {
                    node.children.push(child);
                }
            }
            Ok(node)
        }
        .boxed()
    }

    /// Pin the child's version, then expand it.
    ///
    /// The exclude filter sees the child as it would appear in the tree:
    /// optional convention applied and version pinned. `None` means the
    /// filter dropped it.
    async fn expand_child(
        &self,
        declared: Dependency,
        depth: usize,
        mut path: Vec<Coordinate>,
        exclusions: BTreeSet<CoordinateGA>,
    ) -> Result<Option<DependencyNode>> {
        self.check_cancelled()?;

        let declared = self.apply_optional_convention(declared);
        let coordinate = match self.fetcher.resolve_version(declared.coordinate()).await {
            Ok(coordinate) => coordinate,
            // nothing to pin, judge the declaration as written
            Err(e) if !e.is_fatal() && self.query.excludes(&declared) => return Ok(None),
            Err(e) => return self.recover(declared, depth, e).map(Some),
        };

        let dependency = declared.with_coordinate(coordinate);
        if self.query.excludes(&dependency) {
            log::trace!("{} rejected by exclude filter", dependency.coordinate());
            return Ok(None);
        }

        let ga = dependency.coordinate().ga();
        if path.iter().any(|c| c.ga() == ga) {
            path.push(dependency.coordinate().clone());
            return Err(ResolveError::CyclicDependency { path });
        }

        path.push(dependency.coordinate().clone());
        self.expand(dependency, depth, path, exclusions).await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_flag_is_shared() {
        let flag = CancellationFlag::new();
        let clone = flag.clone();
        assert!(!flag.is_cancelled());
        clone.cancel();
        assert!(flag.is_cancelled());
    }

    #[test]
    fn test_diagnostics_walk() {
        let dep = |s: &str| Dependency::new(Coordinate::parse(s).unwrap());
        let mut root = DependencyNode::new(dep("g:root:1.0"), 0);
        let mut a = DependencyNode::new(dep("g:a:1.0"), 1);
        a.children.push(DependencyNode::failed(dep("g:b:1.0"), 2, "timed out".to_string()));
        root.children.push(a);
        root.children.push(DependencyNode::new(dep("g:c:1.0"), 1));

        let found = diagnostics(&root);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].coordinate().unwrap().artifact_id(), "b");
        assert_eq!(
            found[0].to_string(),
            "g:root:jar:1.0 -> g:a:jar:1.0 -> g:b:jar:1.0: timed out"
        );
    }
}
