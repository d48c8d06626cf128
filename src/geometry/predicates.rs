//! Obsolescence predicates for weight space vertices.
//!
//! A facet `(a, c)` makes a vertex `(w, z)` obsolete when the vertex lies on
//! the wrong side of it, i.e. when
//!
//! ```text
//! c * z + Σ_j a_j * w_j < 0
//! ```
//!
//! Two flavours of the comparison exist. The **strict** test compares against
//! exactly zero and is used inside the flood fill, so that two adjacent
//! decisions can never disagree because of a tolerance band. The **tolerant**
//! test requires the violation to exceed a small `epsilon` and decides whether
//! a reported point or ray changes the polyhedron at all.

use crate::core::facet::Facet;
use crate::core::vertex::WeightSpaceVertex;

/// Comparison used by [`is_obsolete`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tolerance {
    /// Violated iff the facet value is below zero.
    Strict,
    /// Violated iff the facet value is below `-epsilon`.
    Tolerant(f64),
}

impl std::fmt::Display for Tolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Tolerant(eps) => write!(f, "tolerant(eps = {eps:e})"),
        }
    }
}

/// Value of the facet's left-hand side at `vertex`.
///
/// # Examples
///
/// ```rust
/// use weight_space::core::facet::{Facet, FacetId};
/// use weight_space::core::vertex::WeightSpaceVertex;
/// use weight_space::geometry::predicates::facet_value;
///
/// let corner = WeightSpaceVertex::corner(0, 2, 3.0, FacetId(2));
/// let facet = Facet::from_point(&[1.0, 1.0]).unwrap();
/// assert_eq!(facet_value(&facet, &corner), -2.0);
/// ```
#[inline]
#[must_use]
pub fn facet_value(facet: &Facet, vertex: &WeightSpaceVertex) -> f64 {
    facet.evaluate(vertex.weight(), vertex.weighted_objective_value())
}

/// Returns `true` if `facet` cuts `vertex` off under the given comparison.
///
/// # Examples
///
/// ```rust
/// use weight_space::core::facet::{Facet, FacetId};
/// use weight_space::core::vertex::WeightSpaceVertex;
/// use weight_space::geometry::predicates::{Tolerance, is_obsolete};
///
/// let corner = WeightSpaceVertex::corner(0, 2, 3.0, FacetId(2));
/// let tight = Facet::from_point(&[3.0, 0.0]).unwrap();
/// assert!(!is_obsolete(&tight, &corner, Tolerance::Strict));
///
/// let barely = Facet::from_point(&[3.0 - 1e-12, 0.0]).unwrap();
/// assert!(is_obsolete(&barely, &corner, Tolerance::Strict));
/// assert!(!is_obsolete(&barely, &corner, Tolerance::Tolerant(1e-9)));
/// ```
#[inline]
#[must_use]
pub fn is_obsolete(facet: &Facet, vertex: &WeightSpaceVertex, tolerance: Tolerance) -> bool {
    let value = facet_value(facet, vertex);
    match tolerance {
        Tolerance::Strict => value < 0.0,
        Tolerance::Tolerant(epsilon) => value < -epsilon,
    }
}
