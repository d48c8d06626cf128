//! Structural invariants of the skeleton graph.
//!
//! The checks here never repair anything; they report the first violation
//! found. [`validate_structure`] is linear in the graph size and is what the
//! skeleton runs after each update. [`validate_completeness`] additionally
//! compares every pair of vertices and is quadratic.

use crate::core::adjacency::is_neighbour;
use crate::core::algorithms::locate::vertex_at;
use crate::core::collections::StorageMap;
use crate::core::skeleton_graph::{NodeKey, SkeletonGraph, VertexKey};
use crate::core::vertex::WeightSpaceVertex;
use thiserror::Error;

/// Invariant violations detected by the skeleton audit.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SkeletonValidationError {
    /// A node references a vertex the arena does not hold.
    #[error("Node {node:?} references a missing vertex")]
    MissingVertex {
        /// The node with the dangling reference.
        node: NodeKey,
    },
    /// A vertex does not point back at the node that represents it.
    #[error("Vertex {vertex:?} points at node {found:?} instead of {node:?}")]
    BrokenBackReference {
        /// The node representing the vertex.
        node: NodeKey,
        /// The vertex key.
        vertex: VertexKey,
        /// The node the vertex points at.
        found: Option<NodeKey>,
    },
    /// A vertex is not defined by exactly `p` facets.
    #[error("Node {node:?} has {actual} defining facets, expected {expected}")]
    WrongFacetCount {
        /// The offending node.
        node: NodeKey,
        /// Number of objectives.
        expected: usize,
        /// Number of defining facets found.
        actual: usize,
    },
    /// `u` lists `v` as neighbour but not the other way around.
    #[error("Adjacency of {u:?} and {v:?} is not symmetric")]
    AsymmetricAdjacency {
        /// Node listing the neighbour.
        u: NodeKey,
        /// Neighbour missing the back link.
        v: NodeKey,
    },
    /// An untested node is not part of the graph.
    #[error("Untested node {node:?} is not part of the graph")]
    DanglingUntested {
        /// The dangling node.
        node: NodeKey,
    },
    /// An edge joins two vertices that are not combinatorially adjacent.
    #[error("Edge {u:?}-{v:?} joins vertices sharing {shared} facets, expected {expected}")]
    NonAdjacentEdge {
        /// First endpoint.
        u: NodeKey,
        /// Second endpoint.
        v: NodeKey,
        /// Number of shared defining facets.
        shared: usize,
        /// Required number of shared facets (`p - 1`).
        expected: usize,
    },
    /// Two adjacent vertices are not joined by an edge.
    #[error("Adjacent nodes {u:?} and {v:?} are not joined by an edge")]
    MissingEdge {
        /// First node.
        u: NodeKey,
        /// Second node.
        v: NodeKey,
    },
}

fn vertex_checked<'a>(
    graph: &SkeletonGraph,
    vertices: &'a StorageMap<VertexKey, WeightSpaceVertex>,
    node: NodeKey,
) -> Result<&'a WeightSpaceVertex, SkeletonValidationError> {
    vertex_at(graph, vertices, node).map_err(|_| SkeletonValidationError::MissingVertex { node })
}

/// Returns `true` if every edge joins two combinatorially adjacent vertices.
#[must_use]
pub fn edges_are_adjacent(
    graph: &SkeletonGraph,
    vertices: &StorageMap<VertexKey, WeightSpaceVertex>,
) -> bool {
    graph.edges().all(|edge| {
        let (u, v) = edge.endpoints();
        matches!(
            (vertex_at(graph, vertices, u), vertex_at(graph, vertices, v)),
            (Ok(a), Ok(b)) if is_neighbour(a, b)
        )
    })
}

/// Checks node/vertex mappings, facet counts, adjacency symmetry, the
/// untested set and the adjacency of every edge.
///
/// # Errors
///
/// Returns the first [`SkeletonValidationError`] encountered.
pub fn validate_structure(
    graph: &SkeletonGraph,
    vertices: &StorageMap<VertexKey, WeightSpaceVertex>,
    objectives: usize,
) -> Result<(), SkeletonValidationError> {
    for (node, entry) in graph.nodes() {
        let vertex = vertex_checked(graph, vertices, node)?;
        if vertex.node() != Some(node) {
            return Err(SkeletonValidationError::BrokenBackReference {
                node,
                vertex: entry.vertex(),
                found: vertex.node(),
            });
        }
        if vertex.defining_facets().len() != objectives {
            return Err(SkeletonValidationError::WrongFacetCount {
                node,
                expected: objectives,
                actual: vertex.defining_facets().len(),
            });
        }
        for &neighbor in entry.neighbors() {
            if !graph.neighbors(neighbor).contains(&node) {
                return Err(SkeletonValidationError::AsymmetricAdjacency { u: node, v: neighbor });
            }
        }
    }

    if let Some(node) = graph.untested().find(|&node| !graph.contains_node(node)) {
        return Err(SkeletonValidationError::DanglingUntested { node });
    }

    for edge in graph.edges() {
        let (u, v) = edge.endpoints();
        let a = vertex_checked(graph, vertices, u)?;
        let b = vertex_checked(graph, vertices, v)?;
        if !is_neighbour(a, b) {
            return Err(SkeletonValidationError::NonAdjacentEdge {
                u,
                v,
                shared: a.shared_facet_count(b),
                expected: objectives.saturating_sub(1),
            });
        }
    }
    Ok(())
}

/// Checks that every pair of adjacent vertices is joined by an edge.
///
/// # Errors
///
/// Returns [`SkeletonValidationError::MissingEdge`] for the first unjoined
/// adjacent pair, or [`SkeletonValidationError::MissingVertex`].
pub fn validate_completeness(
    graph: &SkeletonGraph,
    vertices: &StorageMap<VertexKey, WeightSpaceVertex>,
) -> Result<(), SkeletonValidationError> {
    let nodes = graph
        .nodes()
        .map(|(node, _)| vertex_checked(graph, vertices, node).map(|v| (node, v)))
        .collect::<Result<Vec<_>, _>>()?;
    for (j, &(v, b)) in nodes.iter().enumerate() {
        for &(u, a) in &nodes[..j] {
            if is_neighbour(a, b) && !graph.contains_edge(u, v) {
                return Err(SkeletonValidationError::MissingEdge { u, v });
            }
        }
    }
    Ok(())
}
