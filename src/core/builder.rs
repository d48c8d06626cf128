//! Fluent builder for [`Skeleton`].
//!
//! [`SkeletonBuilder`] gathers everything the initial polyhedron depends on:
//!
//! | Input | Setter | Default |
//! |---|---|---|
//! | First non-dominated point | [`SkeletonBuilder::new`] | required |
//! | Objective count | [`objectives`](SkeletonBuilder::objectives) | length of the point |
//! | Corner whose weight produced the point | [`originating_corner`](SkeletonBuilder::originating_corner) | none, every corner untested |
//! | Unbounded rays known up front | [`rays`](SkeletonBuilder::rays) | none |
//! | Tunables | [`config`](SkeletonBuilder::config) | [`SkeletonConfig::default`] |
//!
//! # Examples
//!
//! ```rust
//! use weight_space::core::builder::SkeletonBuilder;
//! use weight_space::core::config::SkeletonConfigBuilder;
//!
//! let config = SkeletonConfigBuilder::default().epsilon(1e-6).build().unwrap();
//! let skeleton = SkeletonBuilder::new(&[3.0, 5.0])
//!     .originating_corner(0)
//!     .rays([[-1.0, 2.0]])
//!     .config(config)
//!     .build()
//!     .unwrap();
//!
//! // The ray cut the originating corner away and produced one new vertex.
//! assert_eq!(skeleton.number_of_vertices(), 2);
//! assert_eq!(skeleton.stats().new_vertices, 1);
//! ```

use crate::core::config::SkeletonConfig;
use crate::core::skeleton::{Skeleton, SkeletonError};

/// Builder for the initial weight space skeleton.
#[derive(Clone, Debug)]
pub struct SkeletonBuilder<'p> {
    point: &'p [f64],
    objectives: Option<usize>,
    originating_corner: Option<usize>,
    rays: Vec<Vec<f64>>,
    config: SkeletonConfig,
}

impl<'p> SkeletonBuilder<'p> {
    /// Starts a builder from the first non-dominated point.
    #[must_use]
    pub fn new(point: &'p [f64]) -> Self {
        Self {
            point,
            objectives: None,
            originating_corner: None,
            rays: Vec::new(),
            config: SkeletonConfig::default(),
        }
    }

    /// Sets the number of objectives explicitly; the point must match it.
    #[must_use]
    pub fn objectives(mut self, objectives: usize) -> Self {
        self.objectives = Some(objectives);
        self
    }

    /// Marks the corner `e_index` as already tested: the first point was
    /// found by optimizing objective `index` alone.
    #[must_use]
    pub fn originating_corner(mut self, index: usize) -> Self {
        self.originating_corner = Some(index);
        self
    }

    /// Adds unbounded rays, applied in order after the corners are built.
    #[must_use]
    pub fn rays<I, R>(mut self, rays: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[f64]>,
    {
        self.rays
            .extend(rays.into_iter().map(|ray| ray.as_ref().to_vec()));
        self
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn config(mut self, config: SkeletonConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the skeleton.
    ///
    /// Rays are fed through the thorough ray path; [`Skeleton::stats`] then
    /// holds the statistics accumulated over all of them.
    ///
    /// # Errors
    ///
    /// Returns [`SkeletonError`] if the point or a ray is malformed, the
    /// originating corner is out of range, or a ray update fails.
    pub fn build(self) -> Result<Skeleton, SkeletonError> {
        let objectives = self.objectives.unwrap_or(self.point.len());
        let mut skeleton =
            Skeleton::with_config(objectives, self.point, self.originating_corner, self.config)?;
        if !self.rays.is_empty() {
            skeleton.add_rays(&self.rays)?;
        }
        Ok(skeleton)
    }
}
