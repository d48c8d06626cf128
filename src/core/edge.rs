//! Canonical edge identifiers for skeleton traversal.
//!
//! The skeleton graph stores adjacency lists per node, so an edge appears twice
//! internally. `EdgeKey` gives downstream code a single identifier per edge that:
//!
//! - names an edge purely by its two endpoint [`NodeKey`]s
//! - canonicalizes endpoint ordering so `(a, b)` and `(b, a)` map to the same edge
//! - is `Copy`/`Hash`/`Ord` for fast use in sets and maps
//!
//! ## Determinism
//!
//! `EdgeKey` ordering follows internal slotmap key order and is **not** stable across
//! processes. Sort by vertex weights if a reproducible order is needed.

use crate::core::skeleton_graph::NodeKey;
use slotmap::Key;

/// Canonical identifier for an (undirected) skeleton edge.
///
/// # Examples
///
/// ```rust
/// use weight_space::core::edge::EdgeKey;
/// use weight_space::core::skeleton_graph::NodeKey;
/// use slotmap::KeyData;
///
/// let a = NodeKey::from(KeyData::from_ffi(1));
/// let b = NodeKey::from(KeyData::from_ffi(2));
/// let edge = EdgeKey::new(b, a);
/// assert_eq!(edge, EdgeKey::new(a, b));
/// assert_eq!(edge.endpoints(), (edge.v0(), edge.v1()));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    v0: NodeKey,
    v1: NodeKey,
}

impl EdgeKey {
    /// Creates a new canonical edge key.
    ///
    /// The endpoints are reordered so that `v0 <= v1` under the raw key order.
    #[must_use]
    pub fn new(a: NodeKey, b: NodeKey) -> Self {
        if a.data().as_ffi() <= b.data().as_ffi() {
            Self { v0: a, v1: b }
        } else {
            Self { v0: b, v1: a }
        }
    }

    /// Returns the first (canonical) endpoint.
    #[inline]
    #[must_use]
    pub const fn v0(self) -> NodeKey {
        self.v0
    }

    /// Returns the second (canonical) endpoint.
    #[inline]
    #[must_use]
    pub const fn v1(self) -> NodeKey {
        self.v1
    }

    /// Returns the two endpoints as a tuple.
    #[inline]
    #[must_use]
    pub const fn endpoints(self) -> (NodeKey, NodeKey) {
        (self.v0, self.v1)
    }

    /// Returns `true` if `node` is one of the endpoints.
    #[inline]
    #[must_use]
    pub fn contains(self, node: NodeKey) -> bool {
        self.v0 == node || self.v1 == node
    }
}

impl From<(NodeKey, NodeKey)> for EdgeKey {
    #[inline]
    fn from((a, b): (NodeKey, NodeKey)) -> Self {
        Self::new(a, b)
    }
}
