//! Dependency edges between resource definitions.

use stratus_core::LogicalName;

/// What a dependency edge carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// The dependent substitutes the target's identifier into a property
    ValueRef,
    /// The dependent substitutes a computed attribute of the target
    AttributeRef,
    /// Creation order only, no value substitution
    OrderOnly,
}

/// A directed edge: `from` depends on `to`.
///
/// Multiple edges between the same pair are permitted (they may carry
/// different kinds); they collapse to a single ordering constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyEdge {
    /// The dependent resource
    pub from: LogicalName,
    /// The resource depended upon
    pub to: LogicalName,
    /// What the edge carries
    pub kind: EdgeKind,
}

impl DependencyEdge {
    /// Create a new edge
    #[must_use]
    pub fn new(from: LogicalName, to: LogicalName, kind: EdgeKind) -> Self {
        Self { from, to, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> LogicalName {
        LogicalName::new(s).unwrap()
    }

    #[test]
    fn test_edge_new() {
        let edge = DependencyEdge::new(name("B"), name("A"), EdgeKind::ValueRef);
        assert_eq!(edge.from, name("B"));
        assert_eq!(edge.to, name("A"));
        assert_eq!(edge.kind, EdgeKind::ValueRef);
    }
}
