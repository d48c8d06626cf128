//! Vertices of the weight space polyhedron.
//!
//! A [`WeightSpaceVertex`] is a 0-dimensional face of the lifted weight space
//! polyhedron: a weight `w` together with the weighted objective value `z`
//! attained there, pinned down by exactly `p` tight facets.
//!
//! Vertices come to life in three ways:
//!
//! 1. **Corners** – one per objective at initialization, with weight `e_i`
//!    ([`WeightSpaceVertex::corner`]).
//! 2. **Intermediate vertices** – on an edge cut by a new facet
//!    ([`WeightSpaceVertex::intermediate`]).
//! 3. **Updated corners** – an existing vertex moved down its vertical edge by a
//!    new point facet, mutated in place ([`WeightSpaceVertex::update_corner`]).
//!
//! A vertex has a vertical edge when `p - 1` of its defining facets are
//! vertical. The simplex corners are the first such vertices; a ray cut
//! creates more of them, each pinned by the ray and the remaining boundaries.

use crate::core::collections::{FacetIdBuffer, WeightBuffer, sorted_intersection_len};
use crate::core::facet::{Facet, FacetId, FacetStore};
use crate::core::skeleton_graph::NodeKey;
use std::fmt;
use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while deriving a vertex from a cut.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum VertexError {
    /// The facet values at the two endpoints do not bracket zero, so the cut
    /// does not cross the edge.
    #[error(
        "Facet does not separate edge endpoints: obsolete side {obsolete_value}, surviving side {surviving_value}"
    )]
    EdgeNotCut {
        /// Facet value at the obsolete endpoint (expected negative).
        obsolete_value: f64,
        /// Facet value at the surviving endpoint (expected non-negative).
        surviving_value: f64,
    },
    /// Only vertices on a vertical edge can be moved in place.
    #[error("Vertex at weight {weight:?} has no vertical edge")]
    NotACorner {
        /// Weight of the offending vertex.
        weight: Vec<f64>,
    },
    /// Facets with a zero objective coefficient never meet a corner's vertical edge.
    #[error("Facet {facet} has no objective coefficient; it cannot move a corner")]
    VerticalFacet {
        /// The offending facet.
        facet: FacetId,
    },
}

// =============================================================================
// VERTEX
// =============================================================================

/// A vertex of the weight space polyhedron.
///
/// # Invariants
///
/// - `weight.len() == p` and `defining_facets.len() == p`.
/// - `defining_facets` is sorted and duplicate free.
/// - Every defining facet is tight at `(weight, weighted_objective_value)`.
///
/// # Examples
///
/// ```rust
/// use weight_space::core::facet::FacetId;
/// use weight_space::core::vertex::WeightSpaceVertex;
///
/// // Corner (0, 1) of the 2-objective simplex after the first point (3, 5).
/// let corner = WeightSpaceVertex::corner(1, 2, 5.0, FacetId(2));
/// assert_eq!(corner.weight(), &[0.0, 1.0]);
/// assert_eq!(corner.defining_facets(), &[FacetId(0), FacetId(2)]);
/// assert!(corner.is_corner());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct WeightSpaceVertex {
    weight: WeightBuffer,
    weighted_objective_value: f64,
    defining_facets: FacetIdBuffer,
    /// Graph node currently representing this vertex, `None` once detached.
    pub(crate) node: Option<NodeKey>,
}

impl WeightSpaceVertex {
    /// Creates the corner with weight `e_index` of the simplex over `objectives`
    /// objectives.
    ///
    /// It is defined by every boundary facet except the `index`-th and by
    /// `point_facet`, the facet of the point that attains `weighted_objective_value`
    /// at `e_index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= objectives`.
    #[must_use]
    pub fn corner(
        index: usize,
        objectives: usize,
        weighted_objective_value: f64,
        point_facet: FacetId,
    ) -> Self {
        assert!(index < objectives, "corner index {index} out of range");
        let mut weight = WeightBuffer::from_elem(0.0, objectives);
        weight[index] = 1.0;

        let mut defining_facets: FacetIdBuffer =
            (0..objectives).filter(|&i| i != index).map(FacetId).collect();
        defining_facets.push(point_facet);
        defining_facets.sort_unstable();

        Self {
            weight,
            weighted_objective_value,
            defining_facets,
            node: None,
        }
    }

    /// Creates the vertex where `facet` cuts the edge between `obsolete` and
    /// `surviving`.
    ///
    /// The new vertex is defined by the facets the two endpoints share plus
    /// `facet_id`; its position is the point of the edge where `facet` is tight.
    ///
    /// # Errors
    ///
    /// Returns [`VertexError::EdgeNotCut`] unless `facet` is strictly violated
    /// at `obsolete` and satisfied at `surviving`.
    pub fn intermediate(
        obsolete: &Self,
        surviving: &Self,
        facet_id: FacetId,
        facet: &Facet,
    ) -> Result<Self, VertexError> {
        let obsolete_value = facet.evaluate(&obsolete.weight, obsolete.weighted_objective_value);
        let surviving_value =
            facet.evaluate(&surviving.weight, surviving.weighted_objective_value);
        if !(obsolete_value < 0.0 && surviving_value >= 0.0) {
            return Err(VertexError::EdgeNotCut {
                obsolete_value,
                surviving_value,
            });
        }

        // The facet value is affine along the edge, so this share of the
        // obsolete endpoint lands exactly on the facet.
        let lambda = surviving_value / (surviving_value - obsolete_value);
        let mu = 1.0 - lambda;

        let weight: WeightBuffer = obsolete
            .weight
            .iter()
            .zip(&surviving.weight)
            .map(|(o, s)| lambda.mul_add(*o, mu * s))
            .collect();
        let weighted_objective_value = lambda.mul_add(
            obsolete.weighted_objective_value,
            mu * surviving.weighted_objective_value,
        );

        let mut defining_facets: FacetIdBuffer = obsolete
            .defining_facets
            .iter()
            .filter(|f| surviving.defining_facets.binary_search(f).is_ok())
            .copied()
            .collect();
        defining_facets.push(facet_id);
        defining_facets.sort_unstable();

        Ok(Self {
            weight,
            weighted_objective_value,
            defining_facets,
            node: None,
        })
    }

    /// Moves a vertex down its vertical edge onto `facet`.
    ///
    /// The vertex's single point facet is replaced by `facet_id` and the
    /// weighted objective value is recomputed at the unchanged weight. `facets`
    /// tells vertical facets apart from point facets.
    ///
    /// # Errors
    ///
    /// Returns [`VertexError::NotACorner`] if this vertex has no vertical edge
    /// and [`VertexError::VerticalFacet`] if `facet` does not constrain the
    /// objective value.
    pub fn update_corner(
        &mut self,
        facet_id: FacetId,
        facet: &Facet,
        facets: &FacetStore,
    ) -> Result<(), VertexError> {
        let position = self
            .defining_facets
            .iter()
            .position(|&f| !facets.is_vertical(f))
            .filter(|_| self.has_vertical_edge(facets))
            .ok_or_else(|| VertexError::NotACorner {
                weight: self.weight.to_vec(),
            })?;
        let value = facet
            .tight_objective_value(&self.weight)
            .ok_or(VertexError::VerticalFacet { facet: facet_id })?;

        self.defining_facets[position] = facet_id;
        self.defining_facets.sort_unstable();
        self.weighted_objective_value = value;
        Ok(())
    }

    /// The weight vector.
    #[inline]
    #[must_use]
    pub fn weight(&self) -> &[f64] {
        &self.weight
    }

    /// Value of the weighted objective at [`weight`](Self::weight).
    #[inline]
    #[must_use]
    pub const fn weighted_objective_value(&self) -> f64 {
        self.weighted_objective_value
    }

    /// Sorted ids of the `p` facets tight at this vertex.
    #[inline]
    #[must_use]
    pub fn defining_facets(&self) -> &[FacetId] {
        &self.defining_facets
    }

    /// Number of objectives `p`.
    #[inline]
    #[must_use]
    pub fn number_of_objectives(&self) -> usize {
        self.weight.len()
    }

    /// Graph node representing this vertex, if it is still part of the skeleton.
    #[inline]
    #[must_use]
    pub const fn node(&self) -> Option<NodeKey> {
        self.node
    }

    /// Returns `true` if this vertex lies on a corner `e_i` of the weight simplex,
    /// i.e. `p - 1` of its defining facets are simplex boundaries.
    #[must_use]
    pub fn is_corner(&self) -> bool {
        let objectives = self.number_of_objectives();
        self.defining_facets
            .iter()
            .filter(|f| f.is_boundary_for(objectives))
            .count()
            + 1
            == objectives
    }

    /// Returns `true` if `p - 1` defining facets are boundary or ray facets,
    /// so that the vertex tops a vertical edge of the polyhedron.
    ///
    /// Every corner qualifies, and so does every vertex a ray cut leaves on
    /// a boundary edge of the weight simplex.
    #[must_use]
    pub fn has_vertical_edge(&self, facets: &FacetStore) -> bool {
        self.defining_facets
            .iter()
            .filter(|&&f| facets.is_vertical(f))
            .count()
            + 1
            == self.number_of_objectives()
    }

    /// Number of defining facets shared with `other`.
    #[inline]
    #[must_use]
    pub fn shared_facet_count(&self, other: &Self) -> usize {
        sorted_intersection_len(&self.defining_facets, &other.defining_facets)
    }
}

impl fmt::Display for WeightSpaceVertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "weight {:?}, value {}, facets [",
            self.weight.as_slice(),
            self.weighted_objective_value
        )?;
        for (i, facet) in self.defining_facets.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{facet}")?;
        }
        f.write_str("]")
    }
}
