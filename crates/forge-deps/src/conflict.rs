//! Nearest-wins version mediation

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::fmt;

use forge_version::VersionScheme;

use crate::coordinate::{Coordinate, CoordinateGA};
use crate::node::DependencyNode;

/// A pruned node and the version that replaced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub pruned: Coordinate,
    pub winner: Coordinate,
    /// Depth at which the pruned node was declared
    pub depth: usize,
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} replaced by {}", self.pruned, self.winner)
    }
}

/// Mediates conflicting versions of one group+artifact in a built tree.
///
/// Nodes are visited level by level, siblings in declaration order. The
/// first node seen for a group+artifact fixes its version; later nodes with
/// the same version stay, later nodes with another version are dropped with
/// their whole subtree. Versions are equal when the scheme says so, so
/// `1.0` and `1.0.0` do not conflict.
pub struct ConflictResolver<'a> {
    scheme: &'a dyn VersionScheme,
    winners: HashMap<CoordinateGA, Coordinate>,
    substitutions: Vec<Substitution>,
}

impl<'a> ConflictResolver<'a> {
    pub fn new(scheme: &'a dyn VersionScheme) -> Self {
        Self {
            scheme,
            winners: HashMap::new(),
            substitutions: Vec::new(),
        }
    }

    /// Mediate `root` in place and return what was pruned, in visit order
    pub fn resolve(mut self, root: &mut DependencyNode) -> Vec<Substitution> {
        self.select_winners(root);
        self.prune(root);
        if !self.substitutions.is_empty() {
            log::debug!("Pruned {} conflicting nodes", self.substitutions.len());
        }
        self.substitutions
    }

    fn select_winners(&mut self, root: &DependencyNode) {
        let mut queue = VecDeque::from([root]);
        while let Some(node) = queue.pop_front() {
            let coordinate = node.dependency().coordinate();
            let winner = self
                .winners
                .entry(coordinate.ga())
                .or_insert_with(|| coordinate.clone())
                .clone();

            if !self.same_version(&winner, coordinate) {
                log::trace!("{} loses to {}", coordinate, winner);
                self.substitutions.push(Substitution {
                    pruned: coordinate.clone(),
                    winner: winner.clone(),
                    depth: node.depth(),
                });
                continue;
            }
            queue.extend(node.children());
        }
    }

    /// A node survives when it and all of its ancestors carry winning versions
    fn prune(&self, node: &mut DependencyNode) {
        node.children.retain(|child| {
            let coordinate = child.dependency().coordinate();
            self.winners
                .get(&coordinate.ga())
                .is_some_and(|winner| self.same_version(winner, coordinate))
        });
        for child in &mut node.children {
            self.prune(child);
        }
    }

    fn same_version(&self, a: &Coordinate, b: &Coordinate) -> bool {
        match (a.version(), b.version()) {
            (Some(a), Some(b)) => self.scheme.compare(a, b) == Ordering::Equal,
            (a, b) => a == b,
        }
    }
}
