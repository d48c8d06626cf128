//! The weight space skeleton: incremental 1-skeleton of the lifted weight
//! space polyhedron.
//!
//! For `p` objectives the weight space polyhedron lives in `(w, z)` space,
//! `w` in the unit simplex, and is the set of points satisfying
//!
//! - `w_i >= 0` for every objective (boundary facets),
//! - `z <= w · y` for every reported non-dominated point `y` (point facets),
//! - `w · r >= 0` for every reported unbounded ray `r` (ray facets).
//!
//! Each vertex of this polyhedron is a weight the surrounding solver should
//! test. [`Skeleton`] hands those weights out one at a time and cuts the
//! polyhedron whenever a report shows that a tested weight admits a better
//! weighted objective value than the polyhedron predicted.
//!
//! # Examples
//!
//! ```rust
//! use weight_space::prelude::*;
//!
//! // First point found with weight e_0.
//! let mut skeleton = SkeletonBuilder::new(&[3.0, 5.0])
//!     .originating_corner(0)
//!     .build()
//!     .unwrap();
//!
//! assert!(skeleton.has_next_weight());
//! assert_eq!(skeleton.next_weight().unwrap(), &[0.0, 1.0]);
//!
//! // At weight (0, 1) the solver finds (5, 1), which beats (3, 5) there.
//! assert!(skeleton.is_extremal(&[5.0, 1.0]).unwrap());
//! assert_eq!(skeleton.number_of_vertices(), 3);
//! assert!(skeleton.graph_is_valid());
//!
//! // Reporting the same point again changes nothing.
//! assert!(!skeleton.is_extremal_thorough(&[5.0, 1.0]).unwrap());
//! ```

use crate::core::algorithms::incremental_cut::{CutError, UpdateStats, apply_cut};
use crate::core::algorithms::locate::{self, LocateError, vertex_at};
use crate::core::collections::StorageMap;
use crate::core::config::SkeletonConfig;
use crate::core::edge::EdgeKey;
use crate::core::facet::{Facet, FacetError, FacetId, FacetStore};
use crate::core::skeleton_graph::{NodeKey, SkeletonGraph, VertexKey};
use crate::core::validation::{
    SkeletonValidationError, edges_are_adjacent, validate_completeness, validate_structure,
};
use crate::core::vertex::WeightSpaceVertex;
use crate::geometry::predicates::{Tolerance, is_obsolete};
use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors returned by [`Skeleton`] operations.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum SkeletonError {
    /// A skeleton needs at least one objective.
    #[error("A weight space skeleton needs at least one objective")]
    ZeroObjectives,

    /// An input vector has the wrong number of entries.
    #[error("Expected {expected} objective values, got {actual}")]
    DimensionMismatch {
        /// Number of objectives of the skeleton.
        expected: usize,
        /// Length of the offending input.
        actual: usize,
    },

    /// The originating corner does not exist.
    #[error("Originating corner {index} out of range for {objectives} objectives")]
    CornerOutOfRange {
        /// Requested corner index.
        index: usize,
        /// Number of objectives.
        objectives: usize,
    },

    /// A point or ray could not be turned into a facet.
    #[error("Invalid facet input: {0}")]
    Facet(#[from] FacetError),

    /// `next_weight` was called with no untested vertex left.
    #[error("No untested weight left")]
    NoUntestedWeight,

    /// The update seed is not part of the graph.
    #[error("Seed node {node:?} is not part of the skeleton graph")]
    MissingSeed {
        /// The missing seed.
        node: NodeKey,
    },

    /// The update algorithm failed for another reason.
    #[error("Skeleton update failed: {0}")]
    Cut(CutError),

    /// An invariant audit failed.
    #[error("Skeleton invariant violated: {0}")]
    Validation(#[from] SkeletonValidationError),
}

impl From<CutError> for SkeletonError {
    fn from(err: CutError) -> Self {
        match err {
            CutError::Locate(LocateError::MissingSeed { node }) => Self::MissingSeed { node },
            other => Self::Cut(other),
        }
    }
}

impl From<LocateError> for SkeletonError {
    fn from(err: LocateError) -> Self {
        CutError::from(err).into()
    }
}

// =============================================================================
// SKELETON
// =============================================================================

/// Incrementally maintained 1-skeleton of the weight space polyhedron.
///
/// Construct it with [`Skeleton::new`] or, for an originating corner,
/// initial rays or a custom [`SkeletonConfig`], with
/// [`SkeletonBuilder`](crate::core::builder::SkeletonBuilder).
#[derive(Clone, Debug)]
pub struct Skeleton {
    objectives: usize,
    facets: FacetStore,
    vertices: StorageMap<VertexKey, WeightSpaceVertex>,
    graph: SkeletonGraph,
    config: SkeletonConfig,
    stats: UpdateStats,
}

impl Skeleton {
    /// Creates the skeleton of the polyhedron cut out by a first non-dominated
    /// point, with every corner untested.
    ///
    /// # Errors
    ///
    /// Returns [`SkeletonError::ZeroObjectives`], [`SkeletonError::DimensionMismatch`]
    /// if `point` does not have `objectives` entries, or [`SkeletonError::Facet`]
    /// for non-finite entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use weight_space::core::skeleton::Skeleton;
    ///
    /// let skeleton = Skeleton::new(3, &[2.0, 2.0, 2.0]).unwrap();
    /// assert_eq!(skeleton.number_of_vertices(), 3);
    /// assert_eq!(skeleton.number_of_edges(), 3);
    /// assert_eq!(skeleton.untested_weights().count(), 3);
    /// ```
    pub fn new(objectives: usize, point: &[f64]) -> Result<Self, SkeletonError> {
        Self::with_config(objectives, point, None, SkeletonConfig::default())
    }

    /// Creates the initial skeleton: the `p` corners of the weight simplex,
    /// joined pairwise, all untested except `originating_corner`.
    pub(crate) fn with_config(
        objectives: usize,
        point: &[f64],
        originating_corner: Option<usize>,
        config: SkeletonConfig,
    ) -> Result<Self, SkeletonError> {
        if objectives == 0 {
            return Err(SkeletonError::ZeroObjectives);
        }
        check_dimension(objectives, point)?;
        if let Some(index) = originating_corner
            && index >= objectives
        {
            return Err(SkeletonError::CornerOutOfRange { index, objectives });
        }

        let mut facets = FacetStore::new(objectives);
        facets.add_boundary_facets();
        let point_facet = facets.add_facet_from_point(point)?;

        let mut vertices = StorageMap::with_capacity_and_key(objectives);
        let mut graph = SkeletonGraph::with_capacity(objectives);
        let mut corners = Vec::with_capacity(objectives);
        for (i, &value) in point.iter().enumerate() {
            let vertex_key =
                vertices.insert(WeightSpaceVertex::corner(i, objectives, value, point_facet));
            let node = graph.add_node(vertex_key, originating_corner != Some(i));
            if let Some(vertex) = vertices.get_mut(vertex_key) {
                vertex.node = Some(node);
                tracing::trace!(%vertex, "created corner");
            }
            for &other in &corners {
                graph.add_edge(other, node);
            }
            corners.push(node);
        }

        let skeleton = Self {
            objectives,
            facets,
            vertices,
            graph,
            config,
            stats: UpdateStats::default(),
        };
        tracing::debug!(
            objectives,
            ?originating_corner,
            untested = skeleton.graph.number_of_untested(),
            "initialized weight space skeleton"
        );
        skeleton.audit();
        Ok(skeleton)
    }

    // -------------------------------------------------------------------------
    // Query interface
    // -------------------------------------------------------------------------

    /// Returns `true` while some vertex weight has not been handed out yet.
    #[inline]
    #[must_use]
    pub fn has_next_weight(&self) -> bool {
        self.graph.has_untested()
    }

    /// Hands out an untested weight and remembers its vertex as the last
    /// returned one.
    ///
    /// Which untested weight is chosen is unspecified, but deterministic for a
    /// given sequence of operations.
    ///
    /// # Errors
    ///
    /// Returns [`SkeletonError::NoUntestedWeight`] if
    /// [`has_next_weight`](Self::has_next_weight) is `false`.
    pub fn next_weight(&mut self) -> Result<&[f64], SkeletonError> {
        let node = self
            .graph
            .take_untested()
            .ok_or(SkeletonError::NoUntestedWeight)?;
        let vertex = vertex_at(&self.graph, &self.vertices, node)?;
        tracing::debug!(weight = ?vertex.weight(), "handing out weight");
        Ok(vertex.weight())
    }

    /// Decides whether `point`, found at the last returned weight, is a new
    /// extreme supported point, and if so cuts the polyhedron with it.
    ///
    /// Only the last returned vertex is tested (tolerantly). If no weight has
    /// been handed out yet, or its vertex has since been cut away, the
    /// decision falls back to [`is_extremal_thorough`](Self::is_extremal_thorough).
    ///
    /// # Errors
    ///
    /// Returns [`SkeletonError::DimensionMismatch`] or [`SkeletonError::Facet`]
    /// for malformed input, and update errors from the cut.
    pub fn is_extremal(&mut self, point: &[f64]) -> Result<bool, SkeletonError> {
        let facet = self.point_facet(point)?;
        let Some(seed) = self.graph.last_returned() else {
            return self.cut_thorough(facet, Tolerance::Tolerant(self.config.epsilon));
        };
        let vertex = vertex_at(&self.graph, &self.vertices, seed)?;
        if !is_obsolete(&facet, vertex, Tolerance::Tolerant(self.config.epsilon)) {
            self.reject_candidate();
            return Ok(false);
        }
        self.cut(facet, seed)?;
        Ok(true)
    }

    /// Like [`is_extremal`](Self::is_extremal) but tests every vertex, using
    /// the first one `point` makes obsolete as the seed.
    ///
    /// The last returned vertex is left untouched.
    ///
    /// # Errors
    ///
    /// Same as [`is_extremal`](Self::is_extremal).
    pub fn is_extremal_thorough(&mut self, point: &[f64]) -> Result<bool, SkeletonError> {
        let facet = self.point_facet(point)?;
        self.cut_thorough(facet, Tolerance::Tolerant(self.config.epsilon))
    }

    /// Cuts the polyhedron with the facet of an unbounded ray found at the
    /// last returned weight.
    ///
    /// The last returned vertex is the seed if the ray strictly cuts it off;
    /// otherwise every vertex is scanned. A ray that cuts nothing off leaves
    /// the skeleton unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SkeletonError::DimensionMismatch`] or [`SkeletonError::Facet`]
    /// for malformed input, and update errors from the cut.
    pub fn add_ray(&mut self, ray: &[f64]) -> Result<(), SkeletonError> {
        let facet = self.ray_facet(ray)?;
        if let Some(seed) = self.graph.last_returned() {
            let vertex = vertex_at(&self.graph, &self.vertices, seed)?;
            if is_obsolete(&facet, vertex, Tolerance::Strict) {
                return self.cut(facet, seed);
            }
        }
        self.cut_thorough(facet, Tolerance::Strict).map(|_| ())
    }

    /// Cuts the polyhedron with the facet of `ray`, scanning every vertex for
    /// the seed. Returns `true` if the polyhedron changed.
    ///
    /// # Errors
    ///
    /// Same as [`add_ray`](Self::add_ray).
    pub fn add_ray_thorough(&mut self, ray: &[f64]) -> Result<bool, SkeletonError> {
        let facet = self.ray_facet(ray)?;
        self.cut_thorough(facet, Tolerance::Strict)
    }

    /// Feeds every ray through [`add_ray_thorough`](Self::add_ray_thorough) in
    /// order; [`stats`](Self::stats) afterwards holds the sum over the batch.
    ///
    /// Returns the number of rays that changed the polyhedron.
    ///
    /// # Errors
    ///
    /// Stops at the first failing ray; rays before it stay applied.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use weight_space::core::skeleton::Skeleton;
    ///
    /// let mut skeleton = Skeleton::new(2, &[3.0, 5.0]).unwrap();
    /// let applied = skeleton.add_rays(&[[1.0, 0.0], [-1.0, 2.0]]).unwrap();
    /// assert_eq!(applied, 1);
    /// // The rejected ray still counts as one processed vertex.
    /// assert_eq!(skeleton.stats().processed_vertices, 2);
    /// assert_eq!(skeleton.stats().new_vertices, 1);
    /// ```
    pub fn add_rays<R: AsRef<[f64]>>(&mut self, rays: &[R]) -> Result<usize, SkeletonError> {
        let mut total = UpdateStats::default();
        let mut applied = 0;
        for ray in rays {
            if self.add_ray_thorough(ray.as_ref())? {
                applied += 1;
            }
            total += self.stats;
        }
        self.stats = total;
        Ok(applied)
    }

    /// Returns the first node whose vertex `facet` makes obsolete under the
    /// tolerant test, or `None`.
    ///
    /// # Errors
    ///
    /// Returns [`SkeletonError::DimensionMismatch`] if `facet` has the wrong
    /// number of objectives.
    pub fn find_obsolete_node(&self, facet: &Facet) -> Result<Option<NodeKey>, SkeletonError> {
        check_dimension(self.objectives, facet.weight_coefficients())?;
        Ok(locate::find_obsolete_node(
            &self.graph,
            &self.vertices,
            facet,
            Tolerance::Tolerant(self.config.epsilon),
        ))
    }

    /// Statistics of the most recent update (or batch of ray updates).
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> UpdateStats {
        self.stats
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    /// Number of objectives `p`.
    #[inline]
    #[must_use]
    pub const fn number_of_objectives(&self) -> usize {
        self.objectives
    }

    /// Number of vertices currently in the graph.
    #[inline]
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.graph.number_of_nodes()
    }

    /// Number of vertices held in the arena, detached ones included.
    #[inline]
    #[must_use]
    pub fn number_of_allocated_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of graph edges.
    #[inline]
    #[must_use]
    pub fn number_of_edges(&self) -> usize {
        self.graph.number_of_edges()
    }

    /// Number of stored facets, boundary facets included.
    #[inline]
    #[must_use]
    pub fn number_of_facets(&self) -> usize {
        self.facets.len()
    }

    /// Iterates over the vertices currently in the graph.
    pub fn vertices(&self) -> impl Iterator<Item = (NodeKey, &WeightSpaceVertex)> {
        self.graph
            .nodes()
            .filter_map(|(node, entry)| self.vertices.get(entry.vertex()).map(|v| (node, v)))
    }

    /// Looks up the vertex of a graph node.
    #[must_use]
    pub fn vertex(&self, node: NodeKey) -> Option<&WeightSpaceVertex> {
        vertex_at(&self.graph, &self.vertices, node).ok()
    }

    /// Neighbours of a graph node.
    #[must_use]
    pub fn neighbors(&self, node: NodeKey) -> &[NodeKey] {
        self.graph.neighbors(node)
    }

    /// Iterates over the graph edges.
    pub fn edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.graph.edges()
    }

    /// Iterates over the stored facets in insertion order.
    pub fn facets(&self) -> impl Iterator<Item = (FacetId, &Facet)> {
        self.facets.iter()
    }

    /// Iterates over the weights not handed out yet.
    pub fn untested_weights(&self) -> impl Iterator<Item = &[f64]> {
        self.graph
            .untested()
            .filter_map(|node| self.vertex(node).map(WeightSpaceVertex::weight))
    }

    /// The node most recently handed out by [`next_weight`](Self::next_weight),
    /// unless it has been cut away since.
    #[inline]
    #[must_use]
    pub const fn last_returned(&self) -> Option<NodeKey> {
        self.graph.last_returned()
    }

    /// The active configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &SkeletonConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// Returns `true` if every graph edge joins combinatorially adjacent vertices.
    #[must_use]
    pub fn graph_is_valid(&self) -> bool {
        edges_are_adjacent(&self.graph, &self.vertices)
    }

    /// Runs the full invariant audit, including the quadratic check that every
    /// adjacent pair of vertices is joined by an edge.
    ///
    /// # Errors
    ///
    /// Returns the first [`SkeletonValidationError`] found.
    pub fn validate(&self) -> Result<(), SkeletonValidationError> {
        validate_structure(&self.graph, &self.vertices, self.objectives)?;
        validate_completeness(&self.graph, &self.vertices)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn point_facet(&self, point: &[f64]) -> Result<Facet, SkeletonError> {
        check_dimension(self.objectives, point)?;
        Ok(Facet::from_point(point)?)
    }

    fn ray_facet(&self, ray: &[f64]) -> Result<Facet, SkeletonError> {
        check_dimension(self.objectives, ray)?;
        Ok(Facet::from_ray(ray)?)
    }

    fn reject_candidate(&mut self) {
        self.stats = UpdateStats {
            new_vertices: 0,
            processed_vertices: 1,
        };
    }

    /// Scans every vertex for a seed and cuts if one is found.
    fn cut_thorough(&mut self, facet: Facet, tolerance: Tolerance) -> Result<bool, SkeletonError> {
        match locate::find_obsolete_node(&self.graph, &self.vertices, &facet, tolerance) {
            Some(seed) => {
                self.cut(facet, seed)?;
                Ok(true)
            }
            None => {
                tracing::trace!(%facet, "facet cuts nothing off");
                self.reject_candidate();
                Ok(false)
            }
        }
    }

    /// Stores `facet` and runs the update algorithm from `seed`.
    fn cut(&mut self, facet: Facet, seed: NodeKey) -> Result<(), SkeletonError> {
        let facet_id = self.facets.push(facet.clone())?;
        tracing::debug!(%facet, id = %facet_id, "adding facet");
        self.stats = apply_cut(
            &mut self.graph,
            &mut self.vertices,
            &self.facets,
            facet_id,
            &facet,
            seed,
            self.config.retention,
        )?;
        self.audit();
        Ok(())
    }

    /// Post-update invariant audit: a debug assertion in debug builds and a
    /// warning otherwise.
    fn audit(&self) {
        if !(self.config.check_invariants || cfg!(debug_assertions)) {
            return;
        }
        let result = validate_structure(&self.graph, &self.vertices, self.objectives);
        if let Err(err) = &result {
            tracing::warn!(%err, "weight space skeleton invariant violated");
        }
        debug_assert!(result.is_ok(), "weight space skeleton invariant violated: {result:?}");
    }
}

fn check_dimension(expected: usize, values: &[f64]) -> Result<(), SkeletonError> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(SkeletonError::DimensionMismatch {
            expected,
            actual: values.len(),
        })
    }
}
