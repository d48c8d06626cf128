//! Facets of the weight space polyhedron and the append-only store that owns them.
//!
//! A facet over `p` objectives is an inequality with `p + 1` coefficients
//!
//! ```text
//! a_1 w_1 + ... + a_p w_p + c z >= 0
//! ```
//!
//! where `w` is a weight and `z` the weighted objective value attained at it.
//! The first `p` coefficients are the *weight coefficients*, the last one is
//! the *objective coefficient*.
//!
//! Three kinds of facets exist:
//!
//! | Kind | Coefficients | Meaning |
//! |---|---|---|
//! | [`FacetKind::Boundary`] | `(e_i, 0)` | `w_i >= 0`, a side of the weight simplex |
//! | [`FacetKind::Point`] | `(y, -1)` | `z <= w·y` for a non-dominated point `y` |
//! | [`FacetKind::Ray`] | `(r, 0)` | `w·r >= 0` for an unbounded cost ray `r` |
//!
//! # Store layout
//!
//! [`FacetStore::add_boundary_facets`] is called exactly once, first, so the
//! boundary facets always occupy ids `0..p`. Vertices rely on this to decide
//! whether they are corners without consulting the store.
//!
//! Boundary and ray facets are *vertical*: their objective coefficient is zero,
//! so they never bound the weighted objective value from above. Telling them
//! apart from point facets needs the store ([`FacetStore::is_vertical`]).

use crate::core::collections::{MAX_PRACTICAL_OBJECTIVES, SmallBuffer};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised while building a facet from solver output.
///
/// # Examples
///
/// ```rust
/// use weight_space::core::facet::{Facet, FacetError};
///
/// let err = Facet::from_point(&[1.0, f64::NAN]).unwrap_err();
/// assert!(matches!(err, FacetError::NonFiniteCoefficient { index: 1, .. }));
/// ```
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum FacetError {
    /// The vector has the wrong number of entries for the configured objective count.
    #[error("Expected {expected} objective values, got {actual}")]
    DimensionMismatch {
        /// Number of objectives of the store.
        expected: usize,
        /// Length of the offending vector.
        actual: usize,
    },
    /// An entry of the vector is NaN or infinite.
    #[error("Non-finite coefficient {value} at index {index}")]
    NonFiniteCoefficient {
        /// Position of the offending entry.
        index: usize,
        /// The offending value.
        value: f64,
    },
    /// A facet needs at least one objective.
    #[error("A facet needs at least one objective")]
    Empty,
}

// =============================================================================
// FACET TYPES
// =============================================================================

/// Stable identifier of a facet inside a [`FacetStore`].
///
/// Ids are assigned in insertion order and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FacetId(pub usize);

impl FacetId {
    /// Returns `true` if this id names one of the `objectives` simplex boundary facets.
    #[inline]
    #[must_use]
    pub const fn is_boundary_for(self, objectives: usize) -> bool {
        self.0 < objectives
    }
}

impl fmt::Display for FacetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// Origin of a facet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FacetKind {
    /// A side `w_i >= 0` of the initial weight simplex.
    Boundary,
    /// Induced by a non-dominated point.
    Point,
    /// Induced by an unbounded cost ray.
    Ray,
}

const FACET_BUFFER_SIZE: usize = MAX_PRACTICAL_OBJECTIVES + 1;

/// An inequality of the weight space polyhedron.
///
/// # Examples
///
/// ```rust
/// use weight_space::core::facet::{Facet, FacetKind};
///
/// let facet = Facet::from_point(&[3.0, 5.0]).unwrap();
/// assert_eq!(facet.kind(), FacetKind::Point);
/// assert_eq!(facet.weight_coefficients(), &[3.0, 5.0]);
/// assert_eq!(facet.objective_coefficient(), -1.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    coefficients: SmallBuffer<f64, FACET_BUFFER_SIZE>,
    kind: FacetKind,
}

impl Facet {
    /// The boundary facet `w_index >= 0` of the simplex over `objectives` objectives.
    ///
    /// # Panics
    ///
    /// Panics if `index >= objectives`.
    #[must_use]
    pub fn boundary(objectives: usize, index: usize) -> Self {
        assert!(
            index < objectives,
            "boundary index {index} out of range for {objectives} objectives"
        );
        let mut coefficients: SmallBuffer<f64, FACET_BUFFER_SIZE> =
            SmallBuffer::from_elem(0.0, objectives + 1);
        coefficients[index] = 1.0;
        Self {
            coefficients,
            kind: FacetKind::Boundary,
        }
    }

    /// The facet `(point, -1)` induced by a non-dominated point.
    ///
    /// # Errors
    ///
    /// Returns [`FacetError`] if `point` is empty or has a non-finite entry.
    pub fn from_point(point: &[f64]) -> Result<Self, FacetError> {
        Self::with_objective_coefficient(point, -1.0, FacetKind::Point)
    }

    /// The homogeneous facet `(ray, 0)` induced by an unbounded cost ray.
    ///
    /// # Errors
    ///
    /// Returns [`FacetError`] if `ray` is empty or has a non-finite entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use weight_space::core::facet::{Facet, FacetKind};
    ///
    /// let facet = Facet::from_ray(&[1.0, 0.0]).unwrap();
    /// assert_eq!(facet.kind(), FacetKind::Ray);
    /// assert_eq!(facet.objective_coefficient(), 0.0);
    /// ```
    pub fn from_ray(ray: &[f64]) -> Result<Self, FacetError> {
        Self::with_objective_coefficient(ray, 0.0, FacetKind::Ray)
    }

    fn with_objective_coefficient(
        values: &[f64],
        objective_coefficient: f64,
        kind: FacetKind,
    ) -> Result<Self, FacetError> {
        if values.is_empty() {
            return Err(FacetError::Empty);
        }
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(FacetError::NonFiniteCoefficient { index, value });
        }
        let mut coefficients: SmallBuffer<f64, FACET_BUFFER_SIZE> = SmallBuffer::from_slice(values);
        coefficients.push(objective_coefficient);
        Ok(Self { coefficients, kind })
    }

    /// Number of objectives `p` this facet is defined over.
    #[inline]
    #[must_use]
    pub fn number_of_objectives(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// The first `p` coefficients.
    #[inline]
    #[must_use]
    pub fn weight_coefficients(&self) -> &[f64] {
        &self.coefficients[..self.number_of_objectives()]
    }

    /// The coefficient applied to the weighted objective value.
    #[inline]
    #[must_use]
    pub fn objective_coefficient(&self) -> f64 {
        self.coefficients[self.number_of_objectives()]
    }

    /// All `p + 1` coefficients.
    #[inline]
    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Origin of the facet.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> FacetKind {
        self.kind
    }

    /// Returns `true` for boundary and ray facets, which leave the weighted
    /// objective value unconstrained.
    #[inline]
    #[must_use]
    pub fn is_vertical(&self) -> bool {
        self.kind != FacetKind::Point
    }

    /// Left hand side of the inequality at `(weight, weighted_objective_value)`.
    ///
    /// Negative values mean the inequality is violated.
    #[must_use]
    pub fn evaluate(&self, weight: &[f64], weighted_objective_value: f64) -> f64 {
        debug_assert_eq!(weight.len(), self.number_of_objectives());
        self.weight_coefficients()
            .iter()
            .zip(weight)
            .fold(
                self.objective_coefficient() * weighted_objective_value,
                |acc, (a, w)| a.mul_add(*w, acc),
            )
    }

    /// The weighted objective value at which this facet is tight for `weight`.
    ///
    /// Returns `None` for facets whose objective coefficient is zero
    /// (boundary and ray facets), which do not constrain `z`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use weight_space::core::facet::Facet;
    ///
    /// let facet = Facet::from_point(&[3.0, 5.0]).unwrap();
    /// assert_eq!(facet.tight_objective_value(&[0.5, 0.5]), Some(4.0));
    /// assert_eq!(Facet::from_ray(&[1.0, 2.0]).unwrap().tight_objective_value(&[1.0, 0.0]), None);
    /// ```
    #[must_use]
    pub fn tight_objective_value(&self, weight: &[f64]) -> Option<f64> {
        let c = self.objective_coefficient();
        if c == 0.0 {
            return None;
        }
        Some(-self.evaluate(weight, 0.0) / c)
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{:?}", self.kind, self.coefficients.as_slice())
    }
}

// =============================================================================
// FACET STORE
// =============================================================================

/// Append-only collection of the facets defining the polyhedron.
///
/// The store is uniquely owned by its [`Skeleton`](crate::core::skeleton::Skeleton);
/// facets are never removed, so [`FacetId`]s stay valid for the skeleton's lifetime.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FacetStore {
    objectives: usize,
    facets: Vec<Facet>,
}

impl FacetStore {
    /// Creates an empty store for `objectives` objectives.
    #[must_use]
    pub const fn new(objectives: usize) -> Self {
        Self {
            objectives,
            facets: Vec::new(),
        }
    }

    /// Appends the `p` boundary facets of the weight simplex.
    ///
    /// Must be called once, before any other facet is added.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use weight_space::core::facet::{FacetId, FacetKind, FacetStore};
    ///
    /// let mut store = FacetStore::new(3);
    /// store.add_boundary_facets();
    /// assert_eq!(store.len(), 3);
    /// assert_eq!(store.get(FacetId(1)).unwrap().kind(), FacetKind::Boundary);
    /// ```
    pub fn add_boundary_facets(&mut self) {
        debug_assert!(self.facets.is_empty(), "boundary facets must come first");
        self.facets
            .extend((0..self.objectives).map(|i| Facet::boundary(self.objectives, i)));
    }

    /// Builds and appends the facet induced by a non-dominated point.
    ///
    /// # Errors
    ///
    /// Returns [`FacetError`] on a dimension mismatch or non-finite entry.
    pub fn add_facet_from_point(&mut self, point: &[f64]) -> Result<FacetId, FacetError> {
        let facet = Facet::from_point(point)?;
        self.push(facet)
    }

    /// Builds and appends the facet induced by an unbounded cost ray.
    ///
    /// # Errors
    ///
    /// Returns [`FacetError`] on a dimension mismatch or non-finite entry.
    pub fn add_facet_from_ray(&mut self, ray: &[f64]) -> Result<FacetId, FacetError> {
        let facet = Facet::from_ray(ray)?;
        self.push(facet)
    }

    /// Appends an already built facet.
    ///
    /// # Errors
    ///
    /// Returns [`FacetError::DimensionMismatch`] if the facet is defined over a
    /// different number of objectives.
    pub fn push(&mut self, facet: Facet) -> Result<FacetId, FacetError> {
        if facet.number_of_objectives() != self.objectives {
            return Err(FacetError::DimensionMismatch {
                expected: self.objectives,
                actual: facet.number_of_objectives(),
            });
        }
        let id = FacetId(self.facets.len());
        self.facets.push(facet);
        Ok(id)
    }

    /// Looks up a facet.
    #[inline]
    #[must_use]
    pub fn get(&self, id: FacetId) -> Option<&Facet> {
        self.facets.get(id.0)
    }

    /// Returns `true` if `id` names a stored boundary or ray facet.
    #[inline]
    #[must_use]
    pub fn is_vertical(&self, id: FacetId) -> bool {
        self.get(id).is_some_and(Facet::is_vertical)
    }

    /// Number of stored facets.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.facets.len()
    }

    /// Returns `true` if no facet has been stored yet.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    /// Number of objectives `p`.
    #[inline]
    #[must_use]
    pub const fn number_of_objectives(&self) -> usize {
        self.objectives
    }

    /// Iterates over all facets in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (FacetId, &Facet)> {
        self.facets.iter().enumerate().map(|(i, f)| (FacetId(i), f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_boundary_facets_occupy_leading_ids() {
        let mut store = FacetStore::new(3);
        store.add_boundary_facets();
        let id = store.add_facet_from_point(&[2.0, 2.0, 2.0]).unwrap();

        assert_eq!(id, FacetId(3));
        for (id, facet) in store.iter().take(3) {
            assert!(id.is_boundary_for(3));
            assert_eq!(facet.kind(), FacetKind::Boundary);
            assert_eq!(facet.weight_coefficients()[id.0], 1.0);
            assert_eq!(facet.objective_coefficient(), 0.0);
        }
        assert!(!id.is_boundary_for(3));
    }

    #[test]
    fn test_point_and_ray_coefficients() {
        let mut store = FacetStore::new(2);
        store.add_boundary_facets();
        let p = store.add_facet_from_point(&[3.0, 5.0]).unwrap();
        let r = store.add_facet_from_ray(&[-1.0, 2.0]).unwrap();

        assert_eq!(store.get(p).unwrap().coefficients(), &[3.0, 5.0, -1.0]);
        assert_eq!(store.get(r).unwrap().coefficients(), &[-1.0, 2.0, 0.0]);
        assert_eq!(store.get(r).unwrap().kind(), FacetKind::Ray);
        assert_eq!(store.len(), 4);

        assert!(store.is_vertical(FacetId(0)));
        assert!(store.is_vertical(r));
        assert!(!store.is_vertical(p));
        assert!(!store.is_vertical(FacetId(9)));
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let mut store = FacetStore::new(2);
        store.add_boundary_facets();
        let err = store.add_facet_from_point(&[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            err,
            FacetError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        );
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_non_finite_and_empty_input() {
        assert!(matches!(
            Facet::from_ray(&[f64::INFINITY, 0.0]),
            Err(FacetError::NonFiniteCoefficient { index: 0, .. })
        ));
        assert_eq!(Facet::from_point(&[]), Err(FacetError::Empty));
    }

    #[test]
    fn test_evaluate_and_tight_value() {
        let facet = Facet::from_point(&[1.0, 1.0]).unwrap();
        // w·y - z at corner (1, 0) with z = 3
        assert_relative_eq!(facet.evaluate(&[1.0, 0.0], 3.0), -2.0);
        assert_relative_eq!(facet.tight_objective_value(&[0.25, 0.75]).unwrap(), 1.0);

        let boundary = Facet::boundary(2, 1);
        assert_relative_eq!(boundary.evaluate(&[0.3, 0.7], 100.0), 0.7);
        assert!(boundary.tight_objective_value(&[0.3, 0.7]).is_none());
    }

    #[test]
    fn test_facet_serde_roundtrip() {
        let facet = Facet::from_ray(&[1.0, -2.0]).unwrap();
        let json = serde_json::to_string(&facet).unwrap();
        let back: Facet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, facet);
    }
}
