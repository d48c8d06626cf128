//! Incremental skeleton update after a cutting facet.
//!
//! This module re-triangulates the skeleton graph once a new facet is known
//! to cut off at least one vertex:
//! 1. Flood-fill the obsolete region from a seed (strict test)
//! 2. Drop the obsolete nodes from the untested set
//! 3. Create one intermediate vertex per cut edge, linked to the surviving endpoint
//! 4. Move obsolete vertices with a vertical edge onto the new facet in place
//!    (point cuts only)
//! 5. Connect every adjacent pair among the new and updated vertices
//! 6. Remove the remaining obsolete nodes
//!
//! Steps 3 and 4 must run in this order: intermediate vertices are derived
//! from the moved vertex's position *before* it moves.
//!
//! Vertical edges (where `p - 1` boundary or ray facets meet) are unbounded
//! below and never stored in the graph; step 4 stands in for cutting them.

use crate::core::adjacency::adjacent_pairs;
use crate::core::algorithms::locate::{LocateError, find_obsolete_region, vertex_at};
use crate::core::collections::{NodeKeyBuffer, SmallBuffer, StorageMap, UPDATE_BUFFER_SIZE};
use crate::core::config::VertexRetention;
use crate::core::facet::{Facet, FacetId, FacetKind, FacetStore};
use crate::core::skeleton_graph::{NodeKey, SkeletonGraph, VertexKey};
use crate::core::vertex::{VertexError, WeightSpaceVertex};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Error during a skeleton update.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum CutError {
    /// Obsolete region search failed
    #[error("Obsolete region error: {0}")]
    Locate(#[from] LocateError),

    /// A new or updated vertex could not be derived
    #[error("Vertex construction failed: {0}")]
    Vertex(#[from] VertexError),
}

/// Bookkeeping of a single skeleton update (or of a batch of them).
///
/// # Examples
///
/// ```rust
/// use weight_space::core::algorithms::incremental_cut::UpdateStats;
///
/// let mut total = UpdateStats::default();
/// total += UpdateStats { new_vertices: 2, processed_vertices: 1 };
/// total += UpdateStats { new_vertices: 1, processed_vertices: 3 };
/// assert_eq!(total, UpdateStats { new_vertices: 3, processed_vertices: 4 });
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpdateStats {
    /// Vertices newly marked untested.
    pub new_vertices: usize,
    /// Obsolete vertices scanned (1 for a rejected fast-path candidate).
    pub processed_vertices: usize,
}

impl AddAssign for UpdateStats {
    fn add_assign(&mut self, rhs: Self) {
        self.new_vertices += rhs.new_vertices;
        self.processed_vertices += rhs.processed_vertices;
    }
}

/// Links a freshly inserted vertex to its graph node.
fn attach(
    graph: &mut SkeletonGraph,
    vertices: &mut StorageMap<VertexKey, WeightSpaceVertex>,
    vertex: WeightSpaceVertex,
    mark_untested: bool,
) -> NodeKey {
    let vertex_key = vertices.insert(vertex);
    let node = graph.add_node(vertex_key, mark_untested);
    if let Some(v) = vertices.get_mut(vertex_key) {
        v.node = Some(node);
    }
    node
}

/// Cuts the skeleton with `facet`, starting from the obsolete node `seed`.
///
/// `facet` must already be stored in `facets` under `facet_id`. After a
/// successful call every graph vertex satisfies `facet`, the new vertices lie
/// on it, and every pair of adjacent new or updated vertices is joined by an
/// edge.
///
/// # Errors
///
/// Returns [`CutError::Locate`] if the seed or a vertex reference is missing
/// and [`CutError::Vertex`] if a cut edge turns out not to be bracketed by the
/// facet.
pub fn apply_cut(
    graph: &mut SkeletonGraph,
    vertices: &mut StorageMap<VertexKey, WeightSpaceVertex>,
    facets: &FacetStore,
    facet_id: FacetId,
    facet: &Facet,
    seed: NodeKey,
    retention: VertexRetention,
) -> Result<UpdateStats, CutError> {
    let region = find_obsolete_region(graph, vertices, facet, seed)?;
    for &node in region.nodes() {
        graph.unmark_untested(node);
    }
    tracing::debug!(
        facet = %facet_id,
        obsolete = region.len(),
        cut_edges = region.cut_edges().len(),
        "cutting skeleton"
    );

    let mut stats = UpdateStats {
        new_vertices: 0,
        processed_vertices: region.len(),
    };
    let mut new_nodes = NodeKeyBuffer::new();

    // Intermediate vertices on the cut edges
    for &(obsolete, surviving) in region.cut_edges() {
        let vertex = WeightSpaceVertex::intermediate(
            vertex_at(graph, vertices, obsolete)?,
            vertex_at(graph, vertices, surviving)?,
            facet_id,
            facet,
        )?;
        tracing::trace!(%vertex, "created intermediate vertex");
        let node = attach(graph, vertices, vertex, true);
        graph.add_edge(node, surviving);
        new_nodes.push(node);
        stats.new_vertices += 1;
    }

    // Vertices slide down their vertical edge; a ray cut is parallel to it
    let moves_vertical = facet.kind() == FacetKind::Point;
    let mut removed = NodeKeyBuffer::new();
    for &node in region.nodes() {
        let vertex_key = graph
            .vertex_of(node)
            .ok_or(LocateError::MissingVertex { node, vertex: None })?;
        let vertex = vertices
            .get_mut(vertex_key)
            .ok_or(LocateError::MissingVertex {
                node,
                vertex: Some(vertex_key),
            })?;
        if !(moves_vertical && vertex.has_vertical_edge(facets)) {
            removed.push(node);
            continue;
        }
        vertex.update_corner(facet_id, facet, facets)?;
        tracing::trace!(%vertex, "moved vertex down its vertical edge");

        graph.clear_edges(node);
        if graph.last_returned() != Some(node) && graph.mark_untested(node) {
            stats.new_vertices += 1;
        }
        new_nodes.push(node);
    }

    // Edges among the new and updated vertices
    let pairs = {
        let new_vertices: SmallBuffer<&WeightSpaceVertex, UPDATE_BUFFER_SIZE> = new_nodes
            .iter()
            .map(|&node| vertex_at(graph, vertices, node))
            .collect::<Result<_, _>>()?;
        adjacent_pairs(new_vertices.iter().copied())
    };
    for (i, j) in pairs {
        graph.add_edge(new_nodes[i], new_nodes[j]);
    }

    for node in removed {
        let Some(vertex_key) = graph.remove_node(node) else {
            continue;
        };
        match retention {
            VertexRetention::Deferred => {
                if let Some(vertex) = vertices.get_mut(vertex_key) {
                    vertex.node = None;
                    tracing::trace!(%vertex, "detached obsolete vertex");
                }
            }
            VertexRetention::Immediate => {
                if let Some(vertex) = vertices.remove(vertex_key) {
                    tracing::trace!(%vertex, "deleted obsolete vertex");
                }
            }
        }
    }

    tracing::debug!(
        new_vertices = stats.new_vertices,
        processed_vertices = stats.processed_vertices,
        nodes = graph.number_of_nodes(),
        edges = graph.number_of_edges(),
        "skeleton updated"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::adjacency::is_neighbour;
    use crate::core::facet::FacetStore;
    use approx::assert_relative_eq;

    struct Fixture {
        store: FacetStore,
        graph: SkeletonGraph,
        vertices: StorageMap<VertexKey, WeightSpaceVertex>,
        corners: Vec<NodeKey>,
    }

    /// Complete graph on the corners of the first point, all untested.
    fn fixture(point: &[f64]) -> Fixture {
        let p = point.len();
        let mut store = FacetStore::new(p);
        store.add_boundary_facets();
        let point_facet = store.add_facet_from_point(point).unwrap();

        let mut graph = SkeletonGraph::new();
        let mut vertices = StorageMap::with_key();
        let corners: Vec<NodeKey> = (0..p)
            .map(|i| {
                let corner = WeightSpaceVertex::corner(i, p, point[i], point_facet);
                attach(&mut graph, &mut vertices, corner, true)
            })
            .collect();
        for (j, &b) in corners.iter().enumerate() {
            for &a in &corners[..j] {
                graph.add_edge(a, b);
            }
        }
        Fixture {
            store,
            graph,
            vertices,
            corners,
        }
    }

    fn cut(fx: &mut Fixture, facet: Facet, seed: NodeKey) -> UpdateStats {
        let id = fx.store.push(facet.clone()).unwrap();
        apply_cut(
            &mut fx.graph,
            &mut fx.vertices,
            &fx.store,
            id,
            &facet,
            seed,
            VertexRetention::Deferred,
        )
        .unwrap()
    }

    fn assert_edges_adjacent(fx: &Fixture) {
        for edge in fx.graph.edges() {
            let (u, v) = edge.endpoints();
            let a = vertex_at(&fx.graph, &fx.vertices, u).unwrap();
            let b = vertex_at(&fx.graph, &fx.vertices, v).unwrap();
            assert!(is_neighbour(a, b), "{a} / {b}");
        }
    }

    #[test]
    fn test_point_cut_updates_both_corners() {
        let mut fx = fixture(&[3.0, 5.0]);
        let seed = fx.corners[0];
        let stats = cut(&mut fx, Facet::from_point(&[1.0, 1.0]).unwrap(), seed);

        // No node was handed out, so both moved corners are untested again
        assert_eq!(
            stats,
            UpdateStats {
                new_vertices: 2,
                processed_vertices: 2
            }
        );
        assert_eq!(fx.graph.number_of_nodes(), 2);
        assert!(fx.graph.contains_edge(fx.corners[0], fx.corners[1]));
        for &node in &fx.corners {
            let vertex = vertex_at(&fx.graph, &fx.vertices, node).unwrap();
            assert_relative_eq!(vertex.weighted_objective_value(), 1.0);
            assert!(vertex.defining_facets().contains(&FacetId(3)));
            assert!(fx.graph.is_untested(node));
        }
        assert_edges_adjacent(&fx);
    }

    #[test]
    fn test_point_cut_creates_intermediate_vertex() {
        let mut fx = fixture(&[3.0, 5.0]);
        let seed = fx.corners[1];
        let stats = cut(&mut fx, Facet::from_point(&[5.0, 1.0]).unwrap(), seed);

        assert_eq!(stats.processed_vertices, 1);
        assert_eq!(stats.new_vertices, 2);
        assert_eq!(fx.graph.number_of_nodes(), 3);
        assert_eq!(fx.graph.number_of_edges(), 2);
        assert!(!fx.graph.contains_edge(fx.corners[0], fx.corners[1]));

        let updated = vertex_at(&fx.graph, &fx.vertices, fx.corners[1]).unwrap();
        assert_relative_eq!(updated.weighted_objective_value(), 1.0);
        assert_edges_adjacent(&fx);
    }

    #[test]
    fn test_ray_cut_removes_corner() {
        let mut fx = fixture(&[3.0, 5.0]);
        let seed = fx.corners[0];
        let stats = cut(&mut fx, Facet::from_ray(&[-1.0, 2.0]).unwrap(), seed);

        assert_eq!(stats.processed_vertices, 1);
        assert_eq!(stats.new_vertices, 1);
        assert!(!fx.graph.contains_node(fx.corners[0]));
        assert_eq!(fx.graph.number_of_nodes(), 2);
        assert_eq!(fx.graph.number_of_edges(), 1);

        let (_, node) = fx
            .graph
            .nodes()
            .find(|(key, _)| *key != fx.corners[1])
            .unwrap();
        let middle = &fx.vertices[node.vertex()];
        assert_relative_eq!(middle.weight()[0], 2.0 / 3.0);
        assert_relative_eq!(middle.weight()[1], 1.0 / 3.0);
        assert_relative_eq!(middle.weighted_objective_value(), 11.0 / 3.0);

        // Deferred retention keeps the detached corner in the arena
        assert_eq!(fx.vertices.len(), 3);
        assert_edges_adjacent(&fx);
    }

    #[test]
    fn test_point_cut_moves_vertex_on_ray_facet() {
        let mut fx = fixture(&[3.0, 5.0]);
        let seed = fx.corners[0];
        cut(&mut fx, Facet::from_ray(&[-1.0, 2.0]).unwrap(), seed);
        let (on_ray, _) = fx
            .graph
            .nodes()
            .find(|(key, _)| *key != fx.corners[1])
            .unwrap();

        // (2, 6) beats the first point only at the vertex on the ray facet:
        // 2/3 * 2 + 1/3 * 6 = 10/3 < 11/3.
        let stats = cut(&mut fx, Facet::from_point(&[2.0, 6.0]).unwrap(), on_ray);
        assert_eq!(
            stats,
            UpdateStats {
                new_vertices: 2,
                processed_vertices: 1
            }
        );
        assert_eq!(fx.graph.number_of_nodes(), 3);
        assert_eq!(fx.graph.number_of_edges(), 2);

        let moved = vertex_at(&fx.graph, &fx.vertices, on_ray).unwrap();
        assert_relative_eq!(moved.weight()[0], 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(moved.weighted_objective_value(), 10.0 / 3.0, epsilon = 1e-12);
        assert_eq!(moved.defining_facets(), &[FacetId(3), FacetId(4)]);

        // The split of the remaining edge sits where (3, 5) and (2, 6) tie.
        let (_, split) = fx
            .graph
            .nodes()
            .find(|(key, _)| *key != fx.corners[1] && *key != on_ray)
            .unwrap();
        let split = &fx.vertices[split.vertex()];
        assert_relative_eq!(split.weight()[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(split.weighted_objective_value(), 4.0, epsilon = 1e-12);
        assert_edges_adjacent(&fx);
    }

    #[test]
    fn test_immediate_retention_frees_obsolete_vertices() {
        let mut fx = fixture(&[3.0, 5.0]);
        let facet = Facet::from_ray(&[-1.0, 2.0]).unwrap();
        let id = fx.store.push(facet.clone()).unwrap();
        apply_cut(
            &mut fx.graph,
            &mut fx.vertices,
            &fx.store,
            id,
            &facet,
            fx.corners[0],
            VertexRetention::Immediate,
        )
        .unwrap();
        assert_eq!(fx.vertices.len(), fx.graph.number_of_nodes());
    }

    #[test]
    fn test_three_objective_corner_cut() {
        let mut fx = fixture(&[2.0, 2.0, 2.0]);
        let seed = fx.corners[0];
        let stats = cut(&mut fx, Facet::from_point(&[1.0, 3.0, 3.0]).unwrap(), seed);

        assert_eq!(stats.processed_vertices, 1);
        assert_eq!(stats.new_vertices, 3);
        assert_eq!(fx.graph.number_of_nodes(), 5);
        assert_eq!(fx.graph.number_of_edges(), 6);
        assert_edges_adjacent(&fx);
    }

    #[test]
    fn test_missing_seed_is_reported() {
        let mut fx = fixture(&[3.0, 5.0]);
        let seed = fx.corners[0];
        fx.graph.remove_node(seed);
        let facet = Facet::from_point(&[1.0, 1.0]).unwrap();
        let err = apply_cut(
            &mut fx.graph,
            &mut fx.vertices,
            &fx.store,
            FacetId(3),
            &facet,
            seed,
            VertexRetention::Deferred,
        )
        .unwrap_err();
        assert_eq!(
            err,
            CutError::Locate(LocateError::MissingSeed { node: seed })
        );
    }
}
