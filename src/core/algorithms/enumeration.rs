//! Outer weighted-sum loop: enumerating extreme supported non-dominated points.
//!
//! The skeleton itself never solves anything. This module closes the loop
//! behind the [`WeightedSumOracle`] trait: an oracle minimizes `w · f(x)` for a
//! given weight `w` and reports either an optimal outcome vector or an
//! unbounded direction. [`enumerate_supported_points`] then
//!
//! 1. probes the unit weights until the oracle returns a bounded point,
//!    collecting any rays found on the way;
//! 2. builds the initial skeleton from that point and those rays;
//! 3. keeps handing untested weights to the oracle and feeding its answers
//!    back, until no untested weight is left or the iteration budget runs out.
//!
//! # Examples
//!
//! ```rust
//! use std::convert::Infallible;
//! use weight_space::core::algorithms::enumeration::{
//!     OracleOutcome, WeightedSumOracle, enumerate_supported_points,
//! };
//! use weight_space::core::config::SkeletonConfig;
//!
//! struct Finite(Vec<[f64; 2]>);
//!
//! impl WeightedSumOracle for Finite {
//!     type Error = Infallible;
//!     fn solve(&mut self, weight: &[f64]) -> Result<OracleOutcome, Infallible> {
//!         let value = |y: &[f64; 2]| weight[0] * y[0] + weight[1] * y[1];
//!         let best = self
//!             .0
//!             .iter()
//!             .min_by(|a, b| value(a).total_cmp(&value(b)))
//!             .unwrap();
//!         Ok(OracleOutcome::Point(best.to_vec()))
//!     }
//! }
//!
//! let mut oracle = Finite(vec![[0.0, 4.0], [1.0, 1.0], [4.0, 0.0], [3.0, 3.0]]);
//! let result = enumerate_supported_points(&mut oracle, 2, SkeletonConfig::default(), 100).unwrap();
//! assert!(result.complete);
//! assert_eq!(result.points.len(), 3);
//! ```

use crate::core::algorithms::incremental_cut::UpdateStats;
use crate::core::builder::SkeletonBuilder;
use crate::core::config::SkeletonConfig;
use crate::core::skeleton::{Skeleton, SkeletonError};
use thiserror::Error;

/// Answer of a weighted-sum oracle.
#[derive(Clone, Debug, PartialEq)]
pub enum OracleOutcome {
    /// An optimal outcome vector for the weight.
    Point(Vec<f64>),
    /// An outcome direction along which the weighted sum decreases without bound.
    Ray(Vec<f64>),
}

/// Single-objective solver minimizing a weighted sum of the objectives.
pub trait WeightedSumOracle {
    /// Failure type of the underlying solver.
    type Error: std::error::Error + 'static;

    /// Minimizes `weight · f(x)`.
    ///
    /// # Errors
    ///
    /// Returns the solver's error if the problem could not be solved.
    fn solve(&mut self, weight: &[f64]) -> Result<OracleOutcome, Self::Error>;
}

/// Errors of [`enumerate_supported_points`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EnumerationError<E>
where
    E: std::error::Error + 'static,
{
    /// The oracle failed.
    #[error("Weighted-sum oracle failed: {0}")]
    Oracle(#[source] E),

    /// The skeleton rejected an oracle answer or failed to update.
    #[error("Skeleton error: {0}")]
    Skeleton(#[from] SkeletonError),

    /// Every unit weight produced an unbounded ray.
    #[error("No unit weight among {objectives} yields a bounded point")]
    NoBoundedPoint {
        /// Number of objectives probed.
        objectives: usize,
    },
}

/// Everything found by [`enumerate_supported_points`].
#[derive(Clone, Debug)]
pub struct Enumeration {
    /// Extreme supported non-dominated points, in discovery order.
    pub points: Vec<Vec<f64>>,
    /// Unbounded rays reported by the oracle, in discovery order.
    pub rays: Vec<Vec<f64>>,
    /// Statistics of each skeleton query after initialization.
    pub history: Vec<UpdateStats>,
    /// Oracle calls made, unit weight probes included.
    pub oracle_calls: usize,
    /// `true` if the loop ended because no untested weight was left.
    pub complete: bool,
    /// The final skeleton.
    pub skeleton: Skeleton,
}

/// Runs the weighted-sum loop for `objectives` objectives.
///
/// At most `max_iterations` weights are taken from the skeleton after
/// initialization; [`Enumeration::complete`] tells whether the skeleton was
/// exhausted.
///
/// # Errors
///
/// Returns [`EnumerationError::Oracle`] on solver failure,
/// [`EnumerationError::NoBoundedPoint`] if no unit weight is bounded and
/// [`EnumerationError::Skeleton`] if an oracle answer is malformed.
pub fn enumerate_supported_points<O>(
    oracle: &mut O,
    objectives: usize,
    config: SkeletonConfig,
    max_iterations: usize,
) -> Result<Enumeration, EnumerationError<O::Error>>
where
    O: WeightedSumOracle,
{
    if objectives == 0 {
        return Err(SkeletonError::ZeroObjectives.into());
    }

    let mut rays = Vec::new();
    let mut oracle_calls = 0;
    let mut first = None;
    for index in 0..objectives {
        let mut weight = vec![0.0; objectives];
        weight[index] = 1.0;
        oracle_calls += 1;
        match oracle.solve(&weight).map_err(EnumerationError::Oracle)? {
            OracleOutcome::Point(point) => {
                first = Some((index, point));
                break;
            }
            OracleOutcome::Ray(ray) => rays.push(ray),
        }
    }
    let Some((corner, point)) = first else {
        return Err(EnumerationError::NoBoundedPoint { objectives });
    };
    tracing::debug!(corner, ?point, rays = rays.len(), "found first bounded point");

    let mut skeleton = SkeletonBuilder::new(&point)
        .objectives(objectives)
        .originating_corner(corner)
        .rays(&rays)
        .config(config)
        .build()?;
    let mut points = vec![point];
    let mut history = Vec::new();

    while skeleton.has_next_weight() && history.len() < max_iterations {
        let weight = skeleton.next_weight()?.to_vec();
        oracle_calls += 1;
        match oracle.solve(&weight).map_err(EnumerationError::Oracle)? {
            OracleOutcome::Point(point) => {
                if skeleton.is_extremal(&point)? {
                    tracing::debug!(?weight, ?point, "new extreme supported point");
                    points.push(point);
                }
            }
            OracleOutcome::Ray(ray) => {
                skeleton.add_ray(&ray)?;
                rays.push(ray);
            }
        }
        history.push(skeleton.stats());
    }

    let complete = !skeleton.has_next_weight();
    tracing::debug!(
        points = points.len(),
        rays = rays.len(),
        oracle_calls,
        complete,
        "weighted-sum enumeration finished"
    );
    Ok(Enumeration {
        points,
        rays,
        history,
        oracle_calls,
        complete,
        skeleton,
    })
}
