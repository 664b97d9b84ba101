//! Resolved dependency trees

use std::fmt;

use crate::coordinate::CoordinateGA;
use crate::dependency::Dependency;

/// One node of a resolved tree.
///
/// A node owns its children; the tree carries no parent pointers. Children
/// keep the declaration order of the parent's descriptor.
#[derive(Debug, Clone)]
pub struct DependencyNode {
    pub(crate) dependency: Dependency,
    pub(crate) children: Vec<DependencyNode>,
    pub(crate) depth: usize,
    pub(crate) failure: Option<String>,
}

impl DependencyNode {
    pub(crate) fn new(dependency: Dependency, depth: usize) -> Self {
        Self {
            dependency,
            children: Vec::new(),
            depth,
            failure: None,
        }
    }

    pub(crate) fn failed(dependency: Dependency, depth: usize, reason: String) -> Self {
        Self {
            failure: Some(reason),
            ..Self::new(dependency, depth)
        }
    }

    pub fn dependency(&self) -> &Dependency {
        &self.dependency
    }

    pub fn children(&self) -> &[DependencyNode] {
        &self.children
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_optional(&self) -> bool {
        self.dependency.is_optional()
    }

    /// Whether expanding this node failed (partial results only)
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Pre-order traversal, children in declaration order
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    /// First node (pre-order) whose group+artifact matches
    pub fn find(&self, ga: &CoordinateGA) -> Option<&DependencyNode> {
        self.iter().find(|node| ga.matches(&node.dependency.coordinate().ga()))
    }

    /// Every dependency in the tree, pre-order
    pub fn dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.iter().map(|node| &node.dependency)
    }

    /// Number of nodes including this one
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        write!(f, "{}{}", "  ".repeat(indent), self.dependency)?;
        if let Some(reason) = &self.failure {
            write!(f, " [FAILED: {}]", reason)?;
        }
        writeln!(f)?;
        for child in &self.children {
            child.render(f, indent + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for DependencyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, 0)
    }
}

impl<'a> IntoIterator for &'a DependencyNode {
    type Item = &'a DependencyNode;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Pre-order iterator over a tree
pub struct Iter<'a> {
    stack: Vec<&'a DependencyNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a DependencyNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::Coordinate;

    fn node(text: &str, depth: usize, children: Vec<DependencyNode>) -> DependencyNode {
        let mut n = DependencyNode::new(Dependency::new(Coordinate::parse(text).unwrap()), depth);
        n.children = children;
        n
    }

    fn sample() -> DependencyNode {
        node(
            "g:root:1.0",
            0,
            vec![
                node("g:a:1.0", 1, vec![node("g:c:1.0", 2, vec![])]),
                node("g:b:1.0", 1, vec![]),
            ],
        )
    }

    #[test]
    fn test_preorder_iteration() {
        let tree = sample();
        let ids: Vec<&str> = tree
            .iter()
            .map(|n| n.dependency().coordinate().artifact_id())
            .collect();
        assert_eq!(ids, vec!["root", "a", "c", "b"]);
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn test_find() {
        let tree = sample();
        let found = tree.find(&CoordinateGA::new("g", "c")).unwrap();
        assert_eq!(found.depth(), 2);
        assert!(tree.find(&CoordinateGA::new("g", "zzz")).is_none());
    }

    #[test]
    fn test_render_indents_by_depth() {
        let mut tree = sample();
        tree.children[1] = DependencyNode::failed(
            Dependency::new(Coordinate::parse("g:b:1.0").unwrap()).with_optional(true),
            1,
            "timed out".to_string(),
        );
        let rendered = tree.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "g:root:jar:1.0 (compile)");
        assert_eq!(lines[1], "  g:a:jar:1.0 (compile)");
        assert_eq!(lines[2], "    g:c:jar:1.0 (compile)");
        assert_eq!(lines[3], "  g:b:jar:1.0 (compile) (optional) [FAILED: timed out]");
    }
}
