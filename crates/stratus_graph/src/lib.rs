//! STRATUS Dependency Graph
//!
//! Accumulates the edges the reference resolver finds, detects cycles,
//! and produces the deterministic total order the renderer emits
//! resources in. Ties between ready nodes break by logical-name
//! lexicographic order, never by insertion or hash iteration, so the
//! same stack orders identically across runs and processes.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod edge;
pub mod graph;

pub use edge::{DependencyEdge, EdgeKind};
pub use graph::{DependencyGraph, GraphError};
