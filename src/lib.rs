//! # `weight_space`
//!
//! This is a library for maintaining the weight space polyhedron of a
//! multi-objective minimization problem solved by the
//! [weighted-sum method](https://en.wikipedia.org/wiki/Multi-objective_optimization#Scalarizing).
//!
//! For `p` objectives the weight space is the simplex `{ w ≥ 0, Σ w = 1 }`.
//! Every non-dominated point `y` found so far contributes the inequality
//! `w · y ≥ a`, every unbounded outcome direction `r` contributes `w · r ≥ 0`,
//! and the polyhedron
//!
//! ```text
//! P = { (w, a) : w ∈ simplex, w · y ≥ a for every point y, w · r ≥ 0 for every ray r }
//! ```
//!
//! has one vertex for every weight that might still reveal a new extreme
//! supported point. The crate keeps the vertices and edges of `P` (its
//! 1-skeleton) up to date as points and rays arrive, and hands out untested
//! vertex weights one at a time.
//!
//! # Features
//!
//! - Any number of objectives
//! - Local updates: a new facet only touches the connected region of vertices it cuts off
//! - Strict and tolerant obsolescence tests
//! - Structural invariant audits after every update
//! - A weighted-sum driver over a user supplied single-objective oracle
//! - Serialization of configuration and statistics with [serde](https://serde.rs)
//!
//! # Basic Usage
//!
//! ```rust
//! use weight_space::prelude::*;
//!
//! // First non-dominated point, found by minimizing objective 0 alone.
//! let mut skeleton = SkeletonBuilder::new(&[3.0, 5.0])
//!     .originating_corner(0)
//!     .build()
//!     .unwrap();
//!
//! // Minimizing objective 1 alone is the only open question.
//! let weight = skeleton.next_weight().unwrap().to_vec();
//! assert_eq!(weight, vec![0.0, 1.0]);
//!
//! // The solver answers (5, 1): a new extreme point that splits the edge.
//! assert!(skeleton.is_extremal(&[5.0, 1.0]).unwrap());
//! assert_eq!(skeleton.number_of_vertices(), 3);
//!
//! // The vertex in the middle of the weight segment is next.
//! let weight = skeleton.next_weight().unwrap().to_vec();
//! assert!((weight[0] - 2.0 / 3.0).abs() < 1e-12);
//! assert!(!skeleton.has_next_weight());
//! ```
//!
//! # Invariants
//!
//! After construction and after every update the skeleton satisfies:
//!
//! | Invariant | Checked by |
//! |---|---|
//! | Every node maps to a vertex that points back at it | [`validate_structure`](core::validation::validate_structure) |
//! | Every vertex is defined by exactly `p` facets | [`validate_structure`](core::validation::validate_structure) |
//! | Adjacency lists are symmetric | [`validate_structure`](core::validation::validate_structure) |
//! | Every untested node is in the graph | [`validate_structure`](core::validation::validate_structure) |
//! | Edges join vertices sharing `p - 1` facets | [`Skeleton::graph_is_valid`](core::skeleton::Skeleton::graph_is_valid) |
//! | Vertices sharing `p - 1` facets are joined | [`validate_completeness`](core::validation::validate_completeness) |
//!
//! The audit after each update runs when
//! [`SkeletonConfig::check_invariants`](core::config::SkeletonConfig::check_invariants)
//! is set or in debug builds.

#![forbid(unsafe_code)]

/// The `core` module contains the weight space skeleton and its building blocks.
pub mod core {
    /// Update and driver algorithms.
    pub mod algorithms {
        /// Outer weighted-sum loop driven by a user supplied oracle
        pub mod enumeration;
        /// Local update of the skeleton by a single facet
        pub mod incremental_cut;
        /// Seed search and connected obsolete region discovery
        pub mod locate;
    }
    pub mod adjacency;
    pub mod builder;
    pub mod collections;
    pub mod config;
    /// Canonical undirected edges of the skeleton graph
    pub mod edge;
    pub mod facet;
    pub mod skeleton;
    pub mod skeleton_graph;
    pub mod validation;
    pub mod vertex;
}

/// Geometric predicates on facets and vertices.
pub mod geometry {
    pub mod predicates;

    pub use predicates::*;
}

/// Commonly used items, re-exported for `use weight_space::prelude::*`.
pub mod prelude {
    pub use crate::core::{
        algorithms::{
            enumeration::{
                Enumeration, EnumerationError, OracleOutcome, WeightedSumOracle,
                enumerate_supported_points,
            },
            incremental_cut::{CutError, UpdateStats},
            locate::LocateError,
        },
        builder::SkeletonBuilder,
        config::{DEFAULT_EPSILON, SkeletonConfig, SkeletonConfigBuilder, VertexRetention},
        edge::EdgeKey,
        facet::{Facet, FacetError, FacetId, FacetKind, FacetStore},
        skeleton::{Skeleton, SkeletonError},
        skeleton_graph::{NodeKey, VertexKey},
        validation::SkeletonValidationError,
        vertex::{VertexError, WeightSpaceVertex},
    };

    pub use crate::core::collections::{FastHashSet, SmallBuffer, fast_hash_set_with_capacity};

    pub use crate::geometry::predicates::{Tolerance, facet_value, is_obsolete};
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================
