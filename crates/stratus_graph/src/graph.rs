//! The dependency graph and its deterministic total order.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexSet;
use stratus_core::LogicalName;

use crate::edge::{DependencyEdge, EdgeKind};

/// Error from graph operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Node added twice
    #[error("node already exists: {name}")]
    DuplicateNode {
        /// The colliding logical name
        name: LogicalName,
    },
    /// Edge endpoint is not a node
    #[error("unknown node in edge: {name}")]
    UnknownNode {
        /// The missing logical name
        name: LogicalName,
    },
    /// No valid order exists
    #[error("dependency cycle: {}", format_path(.path))]
    Cycle {
        /// Minimal cycle, in dependency order
        path: Vec<LogicalName>,
    },
}

fn format_path(path: &[LogicalName]) -> String {
    path.iter()
        .map(LogicalName::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl From<GraphError> for stratus_core::CompileError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::Cycle { path } => Self::DependencyCycle { path },
            GraphError::DuplicateNode { name } => Self::DuplicateLogicalName { name },
            GraphError::UnknownNode { name } => Self::DanglingReference {
                resource: name.clone(),
                field: "DependsOn".to_string(),
                target: name,
            },
        }
    }
}

/// One node per resource definition plus all dependency edges.
///
/// A derived, disposable artifact of a single compilation pass.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: IndexSet<LogicalName>,
    edges: Vec<DependencyEdge>,
}

impl DependencyGraph {
    /// Create an empty graph
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: IndexSet::new(),
            edges: Vec::new(),
        }
    }

    /// Add a node
    ///
    /// # Errors
    ///
    /// Returns error if the node already exists.
    pub fn add_node(&mut self, name: LogicalName) -> Result<(), GraphError> {
        if !self.nodes.insert(name.clone()) {
            return Err(GraphError::DuplicateNode { name });
        }
        Ok(())
    }

    /// Add an edge; endpoints must already be nodes
    ///
    /// # Errors
    ///
    /// Returns error if either endpoint is unknown, or `Cycle` if the
    /// edge points at its own origin (a one-node cycle).
    pub fn add_edge(&mut self, edge: DependencyEdge) -> Result<(), GraphError> {
        for endpoint in [&edge.from, &edge.to] {
            if !self.nodes.contains(endpoint) {
                return Err(GraphError::UnknownNode {
                    name: endpoint.clone(),
                });
            }
        }
        if edge.from == edge.to {
            return Err(GraphError::Cycle {
                path: vec![edge.from],
            });
        }
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
        Ok(())
    }

    /// Number of nodes
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct edges
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Unique ordering constraints: node -> set of its dependencies
    fn constraints(&self) -> BTreeMap<&LogicalName, BTreeSet<&LogicalName>> {
        let mut deps: BTreeMap<&LogicalName, BTreeSet<&LogicalName>> =
            self.nodes.iter().map(|n| (n, BTreeSet::new())).collect();
        for edge in &self.edges {
            if let Some(set) = deps.get_mut(&edge.from) {
                set.insert(&edge.to);
            }
        }
        deps
    }

    /// Targets of order-only edges from `name` that no value or
    /// attribute edge already expresses, sorted lexicographically.
    /// These become the resource's `DependsOn` list.
    #[must_use]
    pub fn depends_on_for(&self, name: &LogicalName) -> Vec<LogicalName> {
        let expressed: BTreeSet<&LogicalName> = self
            .edges
            .iter()
            .filter(|e| &e.from == name && e.kind != EdgeKind::OrderOnly)
            .map(|e| &e.to)
            .collect();
        self.edges
            .iter()
            .filter(|e| &e.from == name && e.kind == EdgeKind::OrderOnly)
            .map(|e| &e.to)
            .filter(|to| !expressed.contains(*to))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Deterministic total order consistent with every edge.
    ///
    /// Kahn's algorithm over a `BTreeSet` ready set: whenever several
    /// nodes have no unsatisfied dependencies, the lexicographically
    /// smallest logical name goes first.
    ///
    /// # Errors
    ///
    /// Returns `Cycle` with a minimal cycle path if no order exists.
    pub fn topo_order(&self) -> Result<Vec<LogicalName>, GraphError> {
        let mut pending = self.constraints();
        let mut dependents: BTreeMap<&LogicalName, Vec<&LogicalName>> = BTreeMap::new();
        for (node, deps) in &pending {
            for dep in deps {
                dependents.entry(*dep).or_default().push(*node);
            }
        }

        let mut ready: BTreeSet<&LogicalName> = pending
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(node, _)| *node)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(&next) = ready.iter().next() {
            ready.remove(next);
            pending.remove(next);
            order.push(next.clone());
            for dependent in dependents.get(next).into_iter().flatten() {
                if let Some(deps) = pending.get_mut(*dependent) {
                    deps.remove(next);
                    if deps.is_empty() {
                        ready.insert(*dependent);
                    }
                }
            }
        }

        if order.len() < self.nodes.len() {
            let path = self.find_cycle(&pending);
            tracing::debug!(?path, "dependency cycle detected");
            return Err(GraphError::Cycle { path });
        }
        Ok(order)
    }

    /// Extract one cycle from the unresolvable remainder, starting the
    /// search at the lexicographically smallest remaining node so the
    /// reported path is stable across runs.
    fn find_cycle(
        &self,
        pending: &BTreeMap<&LogicalName, BTreeSet<&LogicalName>>,
    ) -> Vec<LogicalName> {
        let mut stack: Vec<&LogicalName> = Vec::new();
        let mut on_stack: BTreeSet<&LogicalName> = BTreeSet::new();
        let mut visited: BTreeSet<&LogicalName> = BTreeSet::new();

        fn dfs<'a>(
            node: &'a LogicalName,
            pending: &BTreeMap<&'a LogicalName, BTreeSet<&'a LogicalName>>,
            stack: &mut Vec<&'a LogicalName>,
            on_stack: &mut BTreeSet<&'a LogicalName>,
            visited: &mut BTreeSet<&'a LogicalName>,
        ) -> Option<Vec<LogicalName>> {
            stack.push(node);
            on_stack.insert(node);
            visited.insert(node);
            for dep in pending.get(node).into_iter().flatten() {
                if on_stack.contains(dep) {
                    let pos = stack.iter().position(|n| n == dep).unwrap_or(0);
                    return Some(stack[pos..].iter().map(|n| (*n).clone()).collect());
                }
                if !visited.contains(dep) && pending.contains_key(dep) {
                    if let Some(cycle) = dfs(dep, pending, stack, on_stack, visited) {
                        return Some(cycle);
                    }
                }
            }
            stack.pop();
            on_stack.remove(node);
            None
        }

        for node in pending.keys() {
            if !visited.contains(node) {
                if let Some(cycle) =
                    dfs(node, pending, &mut stack, &mut on_stack, &mut visited)
                {
                    return cycle;
                }
            }
        }
        Vec::new()
    }
}
