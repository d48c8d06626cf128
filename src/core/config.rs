//! Runtime configuration of a [`Skeleton`](crate::core::skeleton::Skeleton).
//!
//! [`SkeletonConfig`] is plain data: it can be built fluently with
//! [`SkeletonConfigBuilder`] (generated by `derive_builder`) and round-trips
//! through `serde`.
//!
//! # Examples
//!
//! ```rust
//! use weight_space::core::config::{SkeletonConfigBuilder, VertexRetention};
//!
//! let config = SkeletonConfigBuilder::default()
//!     .epsilon(1e-7)
//!     .retention(VertexRetention::Immediate)
//!     .build()
//!     .unwrap();
//! assert!(config.check_invariants);
//!
//! assert!(SkeletonConfigBuilder::default().epsilon(-1.0).build().is_err());
//! ```

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Default tolerance of the tolerant obsolescence test.
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// What happens to a vertex once its node leaves the skeleton graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexRetention {
    /// The vertex stays in the arena, detached, until the skeleton is dropped.
    #[default]
    Deferred,
    /// The vertex is freed as soon as its node is removed.
    Immediate,
}

/// Tunables of the skeleton update.
#[derive(Builder, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct SkeletonConfig {
    /// Tolerance of the tolerant obsolescence test: a facet only changes the
    /// polyhedron if some vertex violates it by more than `epsilon`.
    #[builder(default = "DEFAULT_EPSILON")]
    pub epsilon: f64,

    /// Audit the graph after every update. Violations trip a debug assertion
    /// in debug builds and are logged as warnings otherwise.
    #[builder(default = "true")]
    pub check_invariants: bool,

    /// Fate of obsolete vertices.
    #[builder(default)]
    pub retention: VertexRetention,
}

impl SkeletonConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(epsilon) = self.epsilon
            && !(epsilon.is_finite() && epsilon >= 0.0)
        {
            return Err(format!(
                "epsilon must be finite and non-negative, got {epsilon}"
            ));
        }
        Ok(())
    }
}

impl Default for SkeletonConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            check_invariants: true,
            retention: VertexRetention::Deferred,
        }
    }
}
