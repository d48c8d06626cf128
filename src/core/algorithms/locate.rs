//! Locating the part of the skeleton cut away by a new facet.
//!
//! Two queries are provided:
//!
//! - [`find_obsolete_node`]: a linear scan for *any* node violating a facet
//!   under a given [`Tolerance`]. This is the seed search of the thorough
//!   update paths.
//! - [`find_obsolete_region`]: a breadth-first flood fill from a known
//!   obsolete seed that collects every obsolete node reachable through
//!   obsolete nodes, plus the cut edges leaving that region.
//!
//! # Algorithm
//!
//! The set of vertices violating a facet is connected in the skeleton of a
//! convex polyhedron, so the flood fill only ever visits the excised region
//! and its one-edge neighbourhood. Every neighbour of an obsolete node is
//! tested with the **strict** predicate: obsolete neighbours are enqueued,
//! surviving neighbours record a cut edge `(obsolete, surviving)`.
//!
//! Both functions are read-only; the caller applies the result.

use crate::core::collections::{CutEdgeBuffer, NodeKeyBuffer, NodeSecondaryMap, StorageMap};
use crate::core::facet::Facet;
use crate::core::skeleton_graph::{NodeKey, SkeletonGraph, VertexKey};
use crate::core::vertex::WeightSpaceVertex;
use crate::geometry::predicates::{Tolerance, is_obsolete};
use std::collections::VecDeque;

/// Error during obsolete region search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum LocateError {
    /// The seed node is not part of the graph.
    #[error("Seed node {node:?} is not part of the skeleton graph")]
    MissingSeed {
        /// The missing seed
        node: NodeKey,
    },

    /// A graph node points at a vertex the arena no longer holds.
    #[error("Node {node:?} references missing vertex {vertex:?}")]
    MissingVertex {
        /// The node with the dangling reference
        node: NodeKey,
        /// The missing vertex key, if the node itself exists
        vertex: Option<VertexKey>,
    },
}

/// Obsolete nodes found by [`find_obsolete_region`] and the edges leaving them.
#[derive(Debug, Clone, Default)]
pub struct ObsoleteRegion {
    nodes: NodeKeyBuffer,
    members: NodeSecondaryMap<()>,
    cut_edges: CutEdgeBuffer,
}

impl ObsoleteRegion {
    /// Obsolete nodes in discovery order; the seed comes first.
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[NodeKey] {
        &self.nodes
    }

    /// Cut edges as `(obsolete, surviving)` pairs.
    #[inline]
    #[must_use]
    pub fn cut_edges(&self) -> &[(NodeKey, NodeKey)] {
        &self.cut_edges
    }

    /// Returns `true` if `node` was found obsolete.
    #[inline]
    #[must_use]
    pub fn contains(&self, node: NodeKey) -> bool {
        self.members.contains_key(node)
    }

    /// Number of obsolete nodes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no node was found obsolete.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn insert(&mut self, node: NodeKey) {
        self.members.insert(node, ());
        self.nodes.push(node);
    }
}

/// Resolves the vertex behind a graph node.
pub(crate) fn vertex_at<'a>(
    graph: &SkeletonGraph,
    vertices: &'a StorageMap<VertexKey, WeightSpaceVertex>,
    node: NodeKey,
) -> Result<&'a WeightSpaceVertex, LocateError> {
    let vertex = graph.vertex_of(node);
    vertex
        .and_then(|key| vertices.get(key))
        .ok_or(LocateError::MissingVertex { node, vertex })
}

/// Returns the first node (in graph storage order) whose vertex `facet` makes
/// obsolete under `tolerance`, or `None` if the facet cuts nothing off.
///
/// Nodes whose vertex is missing from the arena are skipped; the invariant
/// audit reports them separately.
#[must_use]
pub fn find_obsolete_node(
    graph: &SkeletonGraph,
    vertices: &StorageMap<VertexKey, WeightSpaceVertex>,
    facet: &Facet,
    tolerance: Tolerance,
) -> Option<NodeKey> {
    graph.nodes().find_map(|(node, entry)| {
        vertices
            .get(entry.vertex())
            .filter(|vertex| is_obsolete(facet, vertex, tolerance))
            .map(|_| node)
    })
}

/// Flood-fills the obsolete region of `facet` starting from `seed`.
///
/// The seed is taken as obsolete without re-testing it; callers establish
/// that with a tolerant test, which implies the strict one. Every other node
/// is classified with [`Tolerance::Strict`].
///
/// # Errors
///
/// Returns [`LocateError::MissingSeed`] if `seed` is not a graph node and
/// [`LocateError::MissingVertex`] if a visited node has no vertex.
pub fn find_obsolete_region(
    graph: &SkeletonGraph,
    vertices: &StorageMap<VertexKey, WeightSpaceVertex>,
    facet: &Facet,
    seed: NodeKey,
) -> Result<ObsoleteRegion, LocateError> {
    if !graph.contains_node(seed) {
        return Err(LocateError::MissingSeed { node: seed });
    }

    let mut region = ObsoleteRegion::default();
    region.insert(seed);

    // FIFO so that nodes are processed in discovery order
    let mut queue = VecDeque::from([seed]);

    while let Some(current) = queue.pop_front() {
        for &neighbor in graph.neighbors(current) {
            if region.contains(neighbor) {
                continue;
            }
            let vertex = vertex_at(graph, vertices, neighbor)?;
            if is_obsolete(facet, vertex, Tolerance::Strict) {
                region.insert(neighbor);
                queue.push_back(neighbor);
            } else {
                region.cut_edges.push((current, neighbor));
            }
        }
    }

    Ok(region)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::facet::FacetId;

    /// Path graph over the given vertices, in order.
    fn path(
        vertices: Vec<WeightSpaceVertex>,
    ) -> (
        SkeletonGraph,
        StorageMap<VertexKey, WeightSpaceVertex>,
        Vec<NodeKey>,
    ) {
        let mut arena = StorageMap::with_key();
        let mut graph = SkeletonGraph::new();
        let nodes: Vec<NodeKey> = vertices
            .into_iter()
            .map(|v| graph.add_node(arena.insert(v), true))
            .collect();
        for pair in nodes.windows(2) {
            graph.add_edge(pair[0], pair[1]);
        }
        (graph, arena, nodes)
    }

    fn two_corners(first: [f64; 2]) -> Vec<WeightSpaceVertex> {
        vec![
            WeightSpaceVertex::corner(0, 2, first[0], FacetId(2)),
            WeightSpaceVertex::corner(1, 2, first[1], FacetId(2)),
        ]
    }

    #[test]
    fn test_find_obsolete_node_respects_tolerance() {
        let (graph, arena, nodes) = path(two_corners([3.0, 5.0]));

        let cutting = Facet::from_point(&[5.0, 1.0]).unwrap();
        assert_eq!(
            find_obsolete_node(&graph, &arena, &cutting, Tolerance::Tolerant(1e-9)),
            Some(nodes[1])
        );

        let grazing = Facet::from_point(&[3.0 - 1e-12, 8.0]).unwrap();
        assert_eq!(
            find_obsolete_node(&graph, &arena, &grazing, Tolerance::Tolerant(1e-9)),
            None
        );
        assert_eq!(
            find_obsolete_node(&graph, &arena, &grazing, Tolerance::Strict),
            Some(nodes[0])
        );
    }

    #[test]
    fn test_region_records_cut_edges() {
        let (graph, arena, nodes) = path(two_corners([3.0, 5.0]));
        let facet = Facet::from_point(&[5.0, 1.0]).unwrap();

        let region = find_obsolete_region(&graph, &arena, &facet, nodes[1]).unwrap();
        assert_eq!(region.nodes(), &[nodes[1]]);
        assert_eq!(region.cut_edges(), &[(nodes[1], nodes[0])]);
        assert!(region.contains(nodes[1]));
        assert!(!region.contains(nodes[0]));
    }

    #[test]
    fn test_region_spreads_through_obsolete_neighbours() {
        let (graph, arena, nodes) = path(two_corners([3.0, 5.0]));
        let facet = Facet::from_point(&[1.0, 1.0]).unwrap();

        let region = find_obsolete_region(&graph, &arena, &facet, nodes[0]).unwrap();
        assert_eq!(region.len(), 2);
        assert_eq!(region.nodes(), &[nodes[0], nodes[1]]);
        assert!(region.cut_edges().is_empty());
    }

    #[test]
    fn test_region_rejects_missing_seed() {
        let (mut graph, arena, nodes) = path(two_corners([3.0, 5.0]));
        graph.remove_node(nodes[0]);
        let facet = Facet::from_point(&[1.0, 1.0]).unwrap();

        let err = find_obsolete_region(&graph, &arena, &facet, nodes[0]).unwrap_err();
        assert_eq!(err, LocateError::MissingSeed { node: nodes[0] });
    }
}
